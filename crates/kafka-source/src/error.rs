use thiserror::Error;

/// Source errors; rdkafka failures are wrapped with what was being attempted.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Consumer error: {0}")]
    Consumer(String),

    #[error("Commit error: {0}")]
    Commit(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
