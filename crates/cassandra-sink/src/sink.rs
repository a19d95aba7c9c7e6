use anyhow::{Context, Result};
use product_sink::ProductSink;
use product_types::ProductRecord;
use scylla::prepared_statement::PreparedStatement;
use scylla::{Session, SessionBuilder};
use tracing::{info, trace, warn};

use crate::bundle::SecureBundle;
use crate::config::CassandraConfig;

/// Writes products to the wide-column product table.
///
/// The insert is prepared once at connect time. CQL `INSERT` replaces any row
/// with the same primary key, so redelivered messages are idempotent.
pub struct CassandraSink {
    session: Session,
    insert: PreparedStatement,
}

impl CassandraSink {
    pub async fn connect(config: &CassandraConfig) -> Result<Self> {
        config.validate()?;

        let bundle = SecureBundle::from_file(&config.bundle_path).with_context(|| {
            format!("Unable to load the secure connect bundle {:?}", config.bundle_path)
        })?;
        let ssl_context = bundle.ssl_context()?;
        let contact_point = bundle.contact_point();
        if let Some(metadata_url) = bundle.metadata_url() {
            warn!(
                "Bundle advertises a metadata service at {metadata_url}; SNI-routed clusters \
                 are not supported, connecting directly to {contact_point}"
            );
        }

        info!(
            "Connecting to Cassandra at {} (keyspace {}, table {})",
            contact_point, config.keyspace, config.table
        );

        let session = SessionBuilder::new()
            .known_node(&contact_point)
            .user(&config.username, &config.client_token)
            .ssl_context(Some(ssl_context))
            .connection_timeout(config.connect_timeout)
            .build()
            .await
            .with_context(|| format!("Unable to create Cassandra session at {contact_point}"))?;

        Self::from_session(session, config).await
    }

    /// Wrap an already established session.
    pub async fn from_session(session: Session, config: &CassandraConfig) -> Result<Self> {
        let insert = session
            .prepare(config.insert_statement())
            .await
            .with_context(|| {
                format!(
                    "Failed to prepare insert into {}.{}",
                    config.keyspace, config.table
                )
            })?;

        Ok(Self { session, insert })
    }
}

#[async_trait::async_trait]
impl ProductSink for CassandraSink {
    fn name(&self) -> &str {
        "cassandra"
    }

    async fn write_product(&self, record: &ProductRecord) -> Result<()> {
        self.session
            .execute_unpaged(
                &self.insert,
                (
                    record.id,
                    &record.name,
                    &record.description,
                    record.price,
                    record.quantity,
                ),
            )
            .await
            .context("Error inserting product into cassandra")?;

        trace!("Inserted product {} into cassandra", record.id);
        Ok(())
    }
}
