//! Kafka producer library for testing product-ingest
//!
//! Publishes JSON-encoded product records (and, for negative tests, arbitrary
//! raw payloads) to a Kafka topic.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use product_ingest_kafka_producer::{sample_products, ProductTestProducer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let producer = ProductTestProducer::new("localhost:9092").await?;
//!     producer.create_topic_if_not_exists("products", 1).await?;
//!
//!     for product in sample_products() {
//!         producer.publish_product("products", &product).await?;
//!     }
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use product_types::ProductRecord;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::time::Duration;

pub mod testdata;

pub use testdata::{publish_sample_products, sample_products};

/// Kafka producer wrapper for testing
pub struct ProductTestProducer {
    producer: FutureProducer,
    broker: String,
}

impl ProductTestProducer {
    /// Create a new Kafka test producer
    pub async fn new(broker: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", broker)
            .set("message.timeout.ms", "5000")
            .create()
            .context("Failed to create Kafka producer")?;

        Ok(Self {
            producer,
            broker: broker.to_string(),
        })
    }

    /// Create Kafka topic if it doesn't exist
    pub async fn create_topic_if_not_exists(&self, topic: &str, partitions: i32) -> Result<()> {
        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.broker)
            .create()
            .context("Failed to create admin client")?;

        let new_topic = NewTopic::new(topic, partitions, TopicReplication::Fixed(1));
        let opts = AdminOptions::new().operation_timeout(Some(Duration::from_secs(5)));

        let results = admin_client
            .create_topics(&[new_topic], &opts)
            .await
            .context("Failed to create topics")?;

        for result in results {
            match result {
                Ok(topic_name) => tracing::info!("Topic '{topic_name}' created"),
                Err((topic_name, err)) if err.to_string().contains("already exists") => {
                    tracing::info!("Topic '{topic_name}' already exists");
                }
                Err((_, err)) => return Err(anyhow::anyhow!("Failed to create topic: {err}")),
            }
        }

        Ok(())
    }

    /// Publish a product as JSON, keyed by its product id
    pub async fn publish_product(&self, topic: &str, product: &ProductRecord) -> Result<()> {
        let payload = product.to_json().context("Failed to encode product")?;
        self.publish_raw(topic, &product.id.to_string(), &payload)
            .await?;
        tracing::debug!("Published product: {}", product.id);
        Ok(())
    }

    /// Publish arbitrary bytes, e.g. a payload that is not a product
    pub async fn publish_raw(&self, topic: &str, key: &str, payload: &[u8]) -> Result<()> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(err, _)| err)
            .context("Failed to send message to Kafka")?;
        Ok(())
    }
}
