use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BUNDLE_PATH: &str = "./secure-connect.zip";
pub const DEFAULT_KEYSPACE: &str = "chatsandra";
pub const DEFAULT_TABLE: &str = "products";
/// Hosted clusters authenticate a token with this fixed username.
pub const TOKEN_USERNAME: &str = "token";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection and target-table settings for the Cassandra sink
#[derive(Clone)]
pub struct CassandraConfig {
    /// Path to the secure connect bundle zip
    pub bundle_path: PathBuf,
    pub username: String,
    /// Access token, sent as the password
    pub client_token: String,
    pub keyspace: String,
    pub table: String,
    pub connect_timeout: Duration,
}

impl fmt::Debug for CassandraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CassandraConfig")
            .field("bundle_path", &self.bundle_path)
            .field("username", &self.username)
            .field("client_token", &"<redacted>")
            .field("keyspace", &self.keyspace)
            .field("table", &self.table)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl CassandraConfig {
    pub fn new(client_token: impl Into<String>) -> Self {
        Self {
            bundle_path: PathBuf::from(DEFAULT_BUNDLE_PATH),
            username: TOKEN_USERNAME.to_string(),
            client_token: client_token.into(),
            keyspace: DEFAULT_KEYSPACE.to_string(),
            table: DEFAULT_TABLE.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.client_token.is_empty() {
            anyhow::bail!("Cassandra client token must not be empty");
        }
        if !is_cql_identifier(&self.keyspace) {
            anyhow::bail!("Invalid keyspace name: '{}'", self.keyspace);
        }
        if !is_cql_identifier(&self.table) {
            anyhow::bail!("Invalid table name: '{}'", self.table);
        }
        Ok(())
    }

    /// The single statement the sink executes, keyed on `product_id`.
    pub fn insert_statement(&self) -> String {
        format!(
            "INSERT INTO {}.{} (product_id, name, description, price, quantity) VALUES (?, ?, ?, ?, ?)",
            self.keyspace, self.table
        )
    }
}

/// Unquoted CQL identifier: letters, digits and underscores.
pub fn is_cql_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
