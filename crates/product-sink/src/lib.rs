//! Product sink trait abstraction.
//!
//! This crate defines the `ProductSink` trait that abstracts over the storage
//! backends a product record can be written to. The Cassandra sink is the
//! primary target; document-store and relational sinks are optional and only
//! connected when selected.

mod kind;
mod set;
mod traits;

pub use kind::SinkKind;
pub use set::SinkSet;
pub use traits::ProductSink;
