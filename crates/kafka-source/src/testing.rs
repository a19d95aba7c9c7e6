//! In-memory stand-ins for the broker and the storage backends.
//!
//! `InMemorySource` models a single partition: an append-only log, a read
//! position and a committed offset. `restart` moves the read position back to
//! the committed offset, which is what a fresh consumer in the same group
//! would do.

use product_sink::ProductSink;
use product_types::ProductRecord;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::{Message, MessageSource};

#[derive(Default)]
struct PartitionLog {
    payloads: Vec<Vec<u8>>,
    position: usize,
    committed: i64,
    fetch_failures: usize,
    commit_failures: usize,
}

/// Single-partition message log.
pub struct InMemorySource {
    topic: String,
    partition: i32,
    log: Mutex<PartitionLog>,
}

impl InMemorySource {
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
            log: Mutex::new(PartitionLog::default()),
        }
    }

    /// Append a payload to the log.
    pub async fn push(&self, payload: impl Into<Vec<u8>>) {
        self.log.lock().await.payloads.push(payload.into());
    }

    /// Make the next `count` fetches fail.
    pub async fn fail_next_fetches(&self, count: usize) {
        self.log.lock().await.fetch_failures = count;
    }

    /// Make the next `count` commits fail.
    pub async fn fail_next_commits(&self, count: usize) {
        self.log.lock().await.commit_failures = count;
    }

    /// Rewind the read position to the committed offset.
    pub async fn restart(&self) {
        let mut log = self.log.lock().await;
        log.position = log.committed as usize;
    }

    /// Next offset the consumer group would resume from.
    pub async fn committed_offset(&self) -> i64 {
        self.log.lock().await.committed
    }

    /// Messages not yet handed out since the last restart.
    pub async fn remaining(&self) -> usize {
        let log = self.log.lock().await;
        log.payloads.len().saturating_sub(log.position)
    }
}

#[async_trait::async_trait]
impl MessageSource for InMemorySource {
    async fn fetch(&self, cancel: &CancellationToken) -> Result<Option<Message>> {
        {
            let mut log = self.log.lock().await;
            if log.fetch_failures > 0 {
                log.fetch_failures -= 1;
                return Err(Error::Consumer("Broker transport failure".to_string()));
            }
            if log.position < log.payloads.len() {
                let offset = log.position;
                log.position += 1;
                return Ok(Some(Message::new(
                    self.topic.clone(),
                    self.partition,
                    offset as i64,
                    log.payloads[offset].clone(),
                )));
            }
        }

        // Nothing left: block like a real consumer until cancelled.
        cancel.cancelled().await;
        Ok(None)
    }

    async fn commit(&self, message: &Message) -> Result<()> {
        let mut log = self.log.lock().await;
        if log.commit_failures > 0 {
            log.commit_failures -= 1;
            return Err(Error::Commit("Coordinator not available".to_string()));
        }
        log.committed = log.committed.max(message.next_offset());
        Ok(())
    }
}

/// Sink that keeps records in a map keyed by product id.
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<HashMap<Uuid, ProductRecord>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a storage outage.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successful writes, counting overwrites.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn get(&self, id: &Uuid) -> Option<ProductRecord> {
        self.records.lock().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ProductSink for RecordingSink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn write_product(&self, record: &ProductRecord) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("Storage unavailable");
        }
        self.records.lock().await.insert(record.id, record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
