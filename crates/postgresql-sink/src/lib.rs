//! PostgreSQL sink for product-ingest.
//!
//! Mirrors products into a relational table. The table is created on connect
//! if it does not exist, and writes use `ON CONFLICT (product_id) DO UPDATE`
//! so redeliveries overwrite instead of failing on the primary key.

use anyhow::{Context, Result};
use product_sink::ProductSink;
use product_types::ProductRecord;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, Statement};
use tracing::{debug, error, info};

pub const DEFAULT_TABLE: &str = "products";

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub table: String,
}

impl PostgresConfig {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_sql_identifier(&self.table) {
            anyhow::bail!("Invalid table name: '{}'", self.table);
        }
        Ok(())
    }

    pub fn create_table_statement(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                product_id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                quantity INTEGER NOT NULL
            )",
            self.table
        )
    }

    pub fn upsert_statement(&self) -> String {
        format!(
            "INSERT INTO {} (product_id, name, description, price, quantity) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (product_id) DO UPDATE SET \
             name = EXCLUDED.name, description = EXCLUDED.description, \
             price = EXCLUDED.price, quantity = EXCLUDED.quantity",
            self.table
        )
    }
}

/// Unquoted SQL identifier: starts with a letter or underscore.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub struct PostgresSink {
    client: Client,
    upsert: Statement,
    connection: JoinHandle<()>,
}

impl PostgresSink {
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        config.validate()?;

        let (client, connection) = tokio_postgres::connect(&config.connection_string, NoTls)
            .await
            .context("Error opening PostgreSQL connection")?;

        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {e}");
            }
        });

        client
            .batch_execute(&config.create_table_statement())
            .await
            .with_context(|| format!("Failed to create table {}", config.table))?;
        let upsert = client
            .prepare(&config.upsert_statement())
            .await
            .context("Failed to prepare product upsert")?;

        info!("Connected to PostgreSQL (table {})", config.table);
        Ok(Self {
            client,
            upsert,
            connection,
        })
    }
}

#[async_trait::async_trait]
impl ProductSink for PostgresSink {
    fn name(&self) -> &str {
        "postgresql"
    }

    async fn write_product(&self, record: &ProductRecord) -> Result<()> {
        self.client
            .execute(
                &self.upsert,
                &[
                    &record.id,
                    &record.name,
                    &record.description,
                    &record.price,
                    &record.quantity,
                ],
            )
            .await
            .context("Error upserting product into postgresql")?;

        debug!("Upserted product {} into postgresql", record.id);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.connection.abort();
        info!("Closed PostgreSQL connection");
        Ok(())
    }
}
