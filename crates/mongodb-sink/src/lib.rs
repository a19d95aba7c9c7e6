//! MongoDB sink for product-ingest.
//!
//! Mirrors each product into a collection as one document per product, using
//! the product id as `_id` so redeliveries replace the earlier document.

use anyhow::{Context, Result};
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection};
use product_sink::ProductSink;
use product_types::ProductRecord;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_DATABASE: &str = "products";
pub const DEFAULT_COLLECTION: &str = "products";

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
    pub collection: String,
}

impl MongoConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

pub struct MongoSink {
    client: Client,
    collection: Collection<Document>,
}

impl MongoSink {
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.url)
            .await
            .context("Failed to parse MongoDB connection options")?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        // Fail fast at startup instead of hanging on an unreachable server
        options.connect_timeout = Some(Duration::from_secs(10));
        options.server_selection_timeout = Some(Duration::from_secs(10));

        let client = Client::with_options(options).context("Error connecting to MongoDB")?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB did not answer ping")?;

        info!(
            "Connected to MongoDB (database {}, collection {})",
            config.database, config.collection
        );

        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);
        Ok(Self { client, collection })
    }
}

/// Document stored for a product; `_id` is the hyphenated product id.
pub fn product_document(record: &ProductRecord) -> Document {
    doc! {
        "_id": record.id.to_string(),
        "name": record.name.as_str(),
        "description": record.description.as_str(),
        "price": record.price,
        "quantity": record.quantity,
    }
}

#[async_trait::async_trait]
impl ProductSink for MongoSink {
    fn name(&self) -> &str {
        "mongodb"
    }

    async fn write_product(&self, record: &ProductRecord) -> Result<()> {
        let document = product_document(record);
        self.collection
            .replace_one(doc! { "_id": record.id.to_string() }, document)
            .upsert(true)
            .await
            .context("Error upserting product into mongodb")?;

        debug!("Upserted product {} into mongodb", record.id);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        info!("Disconnected from MongoDB");
        Ok(())
    }
}
