use crate::error::{Error, Result};
use crate::{Message, MessageSource};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{
    CommitMode, Consumer as RdkafkaConsumer, StreamConsumer as RdkafkaStreamConsumer,
};
use rdkafka::{Offset, TopicPartitionList};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// SASL mechanism used whenever credentials are configured.
pub const SASL_MECHANISM: &str = "SCRAM-SHA-512";

/// Group session timeout used unless overridden.
pub const DEFAULT_SESSION_TIMEOUT_MS: &str = "30000";

/// SASL/SCRAM credential pair
#[derive(Clone, PartialEq, Eq)]
pub struct SaslCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SaslCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaslCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for Kafka consumer
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// Consumer group ID
    pub group_id: String,
    /// Topic to consume from
    ///
    /// Every payload on the topic must be a JSON-encoded product record.
    pub topic: String,
    /// Auto offset reset strategy ("earliest" or "latest")
    ///
    /// "earliest" means the consumer starts from the beginning of the topic
    /// if no committed offsets are found for the consumer group, so products
    /// published before the first deployment are not lost.
    pub auto_offset_reset: String,
    /// Session timeout in milliseconds
    pub session_timeout_ms: String,
    /// SASL/SCRAM credentials
    ///
    /// When set, the connection uses SASL over TLS. When unset, plaintext is
    /// used, which is only suitable for local brokers.
    pub sasl: Option<SaslCredentials>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "products".to_string(),
            topic: "products".to_string(),
            auto_offset_reset: "earliest".to_string(),
            session_timeout_ms: DEFAULT_SESSION_TIMEOUT_MS.to_string(),
            sasl: None,
        }
    }
}

impl ConsumerConfig {
    /// Build the librdkafka client configuration.
    ///
    /// Auto commit is always disabled: offsets only advance through
    /// [`Consumer::commit`] after a record has been persisted.
    pub fn client_config(&self) -> Result<ClientConfig> {
        if self.brokers.trim().is_empty() {
            return Err(Error::InvalidConfig("No bootstrap server configured".to_string()));
        }
        if self.topic.is_empty() {
            return Err(Error::InvalidConfig("Topic must not be empty".to_string()));
        }
        if self.group_id.is_empty() {
            return Err(Error::InvalidConfig("Group ID must not be empty".to_string()));
        }

        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", &self.auto_offset_reset)
            .set("session.timeout.ms", &self.session_timeout_ms)
            .set("enable.partition.eof", "false");

        match &self.sasl {
            Some(sasl) => {
                client_config
                    .set("security.protocol", "SASL_SSL")
                    .set("sasl.mechanisms", SASL_MECHANISM)
                    .set("sasl.username", &sasl.username)
                    .set("sasl.password", &sasl.password);
            }
            None => {
                client_config.set("security.protocol", "PLAINTEXT");
            }
        }

        Ok(client_config)
    }
}

/// Kafka consumer with manual offset management
pub struct Consumer {
    consumer: RdkafkaStreamConsumer,
    config: ConsumerConfig,
}

impl Consumer {
    /// Create a new Kafka consumer and subscribe to the configured topic
    pub fn new(config: ConsumerConfig) -> Result<Self> {
        let consumer: RdkafkaStreamConsumer = config
            .client_config()?
            .create()
            .map_err(|e| Error::Consumer(format!("Failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[&config.topic])
            .map_err(|e| Error::Consumer(format!("Failed to subscribe to topic: {e}")))?;

        Ok(Self { consumer, config })
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Get the underlying consumer (for advanced use cases)
    pub fn inner(&self) -> &RdkafkaStreamConsumer {
        &self.consumer
    }
}

#[async_trait::async_trait]
impl MessageSource for Consumer {
    async fn fetch(&self, cancel: &CancellationToken) -> Result<Option<Message>> {
        tokio::select! {
            received = self.consumer.recv() => {
                let msg = received
                    .map_err(|e| Error::Consumer(format!("Error receiving message: {e}")))?;
                Ok(Some(Message::from(&msg)))
            }
            _ = cancel.cancelled() => Ok(None),
        }
    }

    async fn commit(&self, message: &Message) -> Result<()> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &message.topic,
            message.partition,
            Offset::Offset(message.next_offset()),
        )
        .map_err(|e| Error::Commit(format!("Failed to add partition offset: {e}")))?;

        self.consumer
            .commit(&tpl, CommitMode::Sync)
            .map_err(|e| Error::Commit(format!("Failed to commit offset: {e}")))?;

        debug!(
            "Committed {}:{} at offset {}",
            message.topic,
            message.partition,
            message.next_offset()
        );
        Ok(())
    }
}
