use anyhow::{Context, Result};
use product_types::ProductRecord;
use tracing::{debug, warn};

use crate::ProductSink;

/// Ordered collection of sinks written as one.
///
/// Writes go to each sink in insertion order and stop at the first failure,
/// so the caller can treat the whole set as a single persist step.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn ProductSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn ProductSink>) {
        self.sinks.push(sink);
    }

    pub fn with_sink(mut self, sink: Box<dyn ProductSink>) -> Self {
        self.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }
}

#[async_trait::async_trait]
impl ProductSink for SinkSet {
    fn name(&self) -> &str {
        "sink-set"
    }

    async fn write_product(&self, record: &ProductRecord) -> Result<()> {
        if self.sinks.is_empty() {
            anyhow::bail!("No sinks configured");
        }
        for sink in &self.sinks {
            sink.write_product(record)
                .await
                .with_context(|| format!("Failed to write product {} to {}", record.id, sink.name()))?;
            debug!("Wrote product {} to {}", record.id, sink.name());
        }
        Ok(())
    }

    /// Closes every sink, reporting the last failure after trying all of them.
    async fn close(&self) -> Result<()> {
        let mut result = Ok(());
        for sink in &self.sinks {
            if let Err(e) = sink.close().await {
                warn!("Error closing {} sink: {e:#}", sink.name());
                result = Err(e);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink {
        name: &'static str,
        writes: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl ProductSink for CountingSink {
        fn name(&self) -> &str {
            self.name
        }

        async fn write_product(&self, _record: &ProductRecord) -> Result<()> {
            if self.fail {
                anyhow::bail!("{} is down", self.name);
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn sink(name: &'static str, writes: &Arc<AtomicUsize>, fail: bool) -> Box<dyn ProductSink> {
        Box::new(CountingSink {
            name,
            writes: Arc::clone(writes),
            fail,
        })
    }

    #[tokio::test]
    async fn test_writes_to_every_sink() {
        let writes = Arc::new(AtomicUsize::new(0));
        let set = SinkSet::new()
            .with_sink(sink("a", &writes, false))
            .with_sink(sink("b", &writes, false));

        set.write_product(&ProductRecord::default()).await.unwrap();
        assert_eq!(writes.load(Ordering::SeqCst), 2);
        assert_eq!(set.names(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let writes = Arc::new(AtomicUsize::new(0));
        let set = SinkSet::new()
            .with_sink(sink("primary", &writes, true))
            .with_sink(sink("mirror", &writes, false));

        let err = set.write_product(&ProductRecord::default()).await.unwrap_err();
        assert!(format!("{err:#}").contains("primary is down"));
        assert_eq!(writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_set_rejects_writes() {
        let set = SinkSet::new();
        assert!(set.is_empty());
        assert!(set.write_product(&ProductRecord::default()).await.is_err());
    }
}
