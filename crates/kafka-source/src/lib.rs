//! Kafka consumer and ingest loop for product-ingest.
//!
//! This crate provides:
//! - A Kafka consumer with SASL/SCRAM support and manual offset commits
//! - The `MessageSource` seam the ingest loop is written against
//! - The fetch, decode, persist, commit loop itself
//! - In-memory sources and sinks for tests
//!
//! # Delivery
//!
//! Offsets are committed one message at a time and only after every sink has
//! accepted the record. A persist or commit failure leaves the offset where it
//! was, so the message is redelivered to the next consumer that resumes from
//! the committed position. Malformed payloads are handled per
//! [`MalformedPolicy`].

pub mod backoff;

/// Low-level consumer with manual offsets
pub mod consumer;
pub mod error;
pub mod message;
pub mod source;
pub mod sync;
pub mod testing;

pub use backoff::Backoff;
pub use consumer::{Consumer, ConsumerConfig, SaslCredentials};
pub use error::{Error, Result};
pub use message::Message;
pub use source::MessageSource;
pub use sync::{
    process_message, run_ingest_loop, IngestConfig, IngestStats, MalformedPolicy, Outcome,
};
