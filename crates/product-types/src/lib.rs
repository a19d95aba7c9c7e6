//! Product record types for product-ingest.
//!
//! The only domain entity flowing through the ingest pipeline is
//! [`ProductRecord`]. Producers publish it as a JSON object on the products
//! topic; this crate owns the wire shape and the decoding rules so that the
//! consumer and every sink agree on them.

mod error;
mod record;

pub use error::{DecodeError, Result};
pub use record::ProductRecord;
