//! Credential loading.
//!
//! Secrets never go on the command line. They are read from the process
//! environment after the local env file has been loaded into it.

mod duration;

pub use duration::parse_duration;

use anyhow::Context;
use product_ingest_kafka_source::SaslCredentials;
use std::fmt;
use std::path::Path;

pub const KAFKA_USERNAME: &str = "KAFKA_USERNAME";
pub const KAFKA_PASSWORD: &str = "KAFKA_PASSWORD";
pub const BOOTSTRAP_SERVER: &str = "BOOTSTRAP_SERVER";
pub const CASSANDRA_CLIENT_TOKEN: &str = "CASSANDRA_CLIENT_TOKEN";
pub const MONGODB_URL: &str = "MONGODB_URL";
pub const DATABASE_URL: &str = "DATABASE_URL";

/// Load `KEY=value` pairs from an env file into the process environment.
///
/// Variables already set in the environment win over the file.
pub fn load_env_file(path: &Path) -> anyhow::Result<()> {
    dotenvy::from_path(path).with_context(|| format!("Error loading env file {path:?}"))?;
    tracing::debug!("Loaded environment from {:?}", path);
    Ok(())
}

/// Connection secrets gathered from the environment
#[derive(Clone, Default)]
pub struct Credentials {
    pub bootstrap_server: String,
    pub kafka_sasl: Option<SaslCredentials>,
    pub cassandra_client_token: Option<String>,
    pub mongodb_url: Option<String>,
    pub database_url: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("bootstrap_server", &self.bootstrap_server)
            .field("kafka_sasl", &self.kafka_sasl)
            .field("cassandra_client_token", &redacted(&self.cassandra_client_token))
            .field("mongodb_url", &redacted(&self.mongodb_url))
            .field("database_url", &redacted(&self.database_url))
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary variable lookup; empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bootstrap_server =
            get(BOOTSTRAP_SERVER).with_context(|| format!("{BOOTSTRAP_SERVER} is not set"))?;

        let kafka_sasl = match (get(KAFKA_USERNAME), get(KAFKA_PASSWORD)) {
            (Some(username), Some(password)) => Some(SaslCredentials { username, password }),
            (None, None) => None,
            (Some(_), None) => anyhow::bail!("{KAFKA_USERNAME} is set but {KAFKA_PASSWORD} is not"),
            (None, Some(_)) => anyhow::bail!("{KAFKA_PASSWORD} is set but {KAFKA_USERNAME} is not"),
        };

        Ok(Self {
            bootstrap_server,
            kafka_sasl,
            cassandra_client_token: get(CASSANDRA_CLIENT_TOKEN),
            mongodb_url: get(MONGODB_URL),
            database_url: get(DATABASE_URL),
        })
    }
}
