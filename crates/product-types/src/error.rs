//! Error types for product-types crate.

use thiserror::Error;

/// Errors that can occur while decoding a message payload.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Message has an empty payload")]
    EmptyPayload,

    #[error("Invalid product JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for product-types operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
