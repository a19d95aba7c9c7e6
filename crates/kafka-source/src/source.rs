//! MessageSource trait definition.

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::Message;

/// A subscription that yields messages one at a time and accepts explicit
/// offset commits.
///
/// The ingest loop is generic over this trait so it can run against the
/// Kafka [`Consumer`](crate::Consumer) in production and an in-memory log in
/// tests.
#[async_trait::async_trait]
pub trait MessageSource: Send + Sync {
    /// Wait for the next message.
    ///
    /// Returns `Ok(None)` only when `cancel` fires while waiting.
    async fn fetch(&self, cancel: &CancellationToken) -> Result<Option<Message>>;

    /// Commit the consumer group's offset past `message`.
    async fn commit(&self, message: &Message) -> Result<()>;
}
