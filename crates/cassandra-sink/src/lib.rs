//! Cassandra sink for product-ingest.
//!
//! Connects through a secure connect bundle with token authentication and
//! writes each product with a single prepared `INSERT`.

pub mod bundle;
pub mod config;
mod sink;

pub use bundle::{BundleConfig, BundleError, SecureBundle};
pub use config::CassandraConfig;
pub use sink::CassandraSink;
