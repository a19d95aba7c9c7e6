//! Kafka to product-table ingest loop.
//!
//! Consumes JSON-encoded product records one message at a time and writes
//! each to the configured sinks before committing its offset. Offsets only
//! advance after a successful write, which gives at-least-once delivery for
//! persist and commit failures.

use clap::ValueEnum;
use product_sink::ProductSink;
use product_types::ProductRecord;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backoff::{Backoff, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY};
use crate::{Message, MessageSource};

/// What to do with a message whose payload is not a valid product record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MalformedPolicy {
    /// Log and move on without committing; a restarted consumer sees it again
    #[default]
    Skip,
    /// Log and commit past it so it is never redelivered
    Commit,
}

/// Settings for [`run_ingest_loop`].
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub malformed_policy: MalformedPolicy,
    /// First delay after a failed fetch
    pub fetch_backoff_initial: Duration,
    /// Upper bound for the fetch retry delay
    pub fetch_backoff_max: Duration,
    /// Stop after handling this many messages, whatever their outcome.
    pub max_messages: Option<u64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            malformed_policy: MalformedPolicy::default(),
            fetch_backoff_initial: DEFAULT_INITIAL_DELAY,
            fetch_backoff_max: DEFAULT_MAX_DELAY,
            max_messages: None,
        }
    }
}

/// Result of handling one fetched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Persisted and offset committed
    Committed,
    /// Payload failed to decode; nothing was written
    Malformed,
    /// Payload failed to decode and committing past it failed too
    MalformedCommitFailed,
    /// A sink rejected the record; offset left uncommitted
    PersistFailed,
    /// Record written but the commit failed; it will be redelivered
    CommitFailed,
}

/// Counters accumulated over the life of the loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub fetched: u64,
    pub committed: u64,
    pub malformed: u64,
    pub persist_failures: u64,
    pub commit_failures: u64,
    pub fetch_errors: u64,
}

impl IngestStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Committed => self.committed += 1,
            Outcome::Malformed => self.malformed += 1,
            Outcome::MalformedCommitFailed => {
                self.malformed += 1;
                self.commit_failures += 1;
            }
            Outcome::PersistFailed => self.persist_failures += 1,
            Outcome::CommitFailed => self.commit_failures += 1,
        }
    }
}

/// Run the fetch, decode, persist, commit loop until `cancel` fires or
/// `max_messages` have been handled.
///
/// Errors never stop the loop. Fetch failures are retried after a capped
/// exponential backoff; every other failure is logged and the loop moves on
/// to the next message.
pub async fn run_ingest_loop<S, K>(
    source: &S,
    sink: &K,
    config: &IngestConfig,
    cancel: &CancellationToken,
) -> IngestStats
where
    S: MessageSource + ?Sized,
    K: ProductSink + ?Sized,
{
    let mut stats = IngestStats::default();
    let mut backoff = Backoff::new(config.fetch_backoff_initial, config.fetch_backoff_max);

    info!(
        "Starting ingest loop into {} (on malformed: {:?})",
        sink.name(),
        config.malformed_policy
    );
    if let Some(max) = config.max_messages {
        info!("Will exit early after handling {max} messages");
    }

    loop {
        if let Some(max) = config.max_messages {
            if stats.fetched >= max {
                info!("Reached max_messages limit ({max})");
                break;
            }
        }

        let message = match source.fetch(cancel).await {
            Ok(Some(message)) => {
                backoff.reset();
                message
            }
            Ok(None) => {
                info!("Ingest loop cancelled while waiting for messages");
                break;
            }
            Err(e) => {
                stats.fetch_errors += 1;
                let delay = backoff.next_delay();
                error!(
                    "Error consuming message: {e} (attempt {}, retrying in {delay:?})",
                    backoff.attempts()
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => continue,
                    _ = cancel.cancelled() => {
                        info!("Ingest loop cancelled during fetch backoff");
                        break;
                    }
                }
            }
        };

        stats.fetched += 1;
        let outcome = process_message(source, sink, config.malformed_policy, &message).await;
        stats.record(outcome);

        if stats.fetched % 100 == 0 {
            info!("Handled {} messages total ({} committed)", stats.fetched, stats.committed);
        }
    }

    info!("Ingest loop stopped: {stats:?}");
    stats
}

/// Decode, persist and commit a single message.
pub async fn process_message<S, K>(
    source: &S,
    sink: &K,
    policy: MalformedPolicy,
    message: &Message,
) -> Outcome
where
    S: MessageSource + ?Sized,
    K: ProductSink + ?Sized,
{
    let record = match ProductRecord::from_json(&message.payload) {
        Ok(record) => record,
        Err(e) => {
            warn!(
                "Error decoding message at {}:{} offset {}: {e}",
                message.topic, message.partition, message.offset
            );
            if policy == MalformedPolicy::Commit {
                if let Err(e) = source.commit(message).await {
                    error!(
                        "Error committing past malformed message {}:{} offset {}: {e}",
                        message.topic, message.partition, message.offset
                    );
                    return Outcome::MalformedCommitFailed;
                }
                debug!(
                    "Committed past malformed message at {}:{} offset {}",
                    message.topic, message.partition, message.offset
                );
            }
            return Outcome::Malformed;
        }
    };

    if let Err(e) = sink.write_product(&record).await {
        error!(
            "Error writing product {} from {}:{} offset {}: {e:#}",
            record.id, message.topic, message.partition, message.offset
        );
        return Outcome::PersistFailed;
    }
    debug!("Wrote product to {}: {record:?}", sink.name());

    if let Err(e) = source.commit(message).await {
        error!(
            "Error committing message offset {}:{} offset {}: {e}",
            message.topic, message.partition, message.offset
        );
        return Outcome::CommitFailed;
    }

    info!(
        "Message offset committed: {}:{} (offset {})",
        message.topic, message.partition, message.offset
    );
    Outcome::Committed
}
