//! Kafka message type.

use rdkafka::message::{BorrowedMessage, Message as RdkafkaMessage};

/// An owned Kafka message with its delivery coordinates.
///
/// The consumer group keeps the real delivery state; the ingest loop holds
/// this copy for a single iteration and hands it back to
/// [`MessageSource::commit`](crate::MessageSource::commit) when done.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Kafka topic name
    pub topic: String,
    /// Kafka partition number
    pub partition: i32,
    /// Kafka offset within the partition
    pub offset: i64,
    /// Message key (if any)
    pub key: Option<Vec<u8>>,
    /// Raw payload bytes, empty for tombstones
    pub payload: Vec<u8>,
    /// Message timestamp in milliseconds since epoch (if available)
    pub timestamp: Option<i64>,
}

impl Message {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            key: None,
            payload,
            timestamp: None,
        }
    }

    /// Offset to commit once this message has been processed.
    pub fn next_offset(&self) -> i64 {
        self.offset + 1
    }
}

impl From<&BorrowedMessage<'_>> for Message {
    fn from(msg: &BorrowedMessage<'_>) -> Self {
        Self {
            topic: msg.topic().to_string(),
            partition: msg.partition(),
            offset: msg.offset(),
            key: msg.key().map(|k| k.to_vec()),
            payload: msg.payload().map(|p| p.to_vec()).unwrap_or_default(),
            timestamp: msg.timestamp().to_millis(),
        }
    }
}
