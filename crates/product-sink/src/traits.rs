//! ProductSink trait definition.

use anyhow::Result;
use product_types::ProductRecord;

/// Trait for writing product records to a storage backend.
///
/// Every implementation writes with replace-by-primary-key semantics keyed on
/// the record's `product_id`, so a redelivered message overwrites the row it
/// produced the first time instead of duplicating it.
///
/// # Usage Pattern
///
/// ```ignore
/// pub async fn persist<S: ProductSink>(sink: &S, record: &ProductRecord) -> Result<()> {
///     sink.write_product(record).await
/// }
/// ```
#[async_trait::async_trait]
pub trait ProductSink: Send + Sync {
    /// Short backend name used in log lines.
    fn name(&self) -> &str;

    /// Upsert a single product record.
    async fn write_product(&self, record: &ProductRecord) -> Result<()>;

    /// Release the backend connection on shutdown.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
