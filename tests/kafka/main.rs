//! Kafka ingest E2E tests
//!
//! Run the real consumer against a broker, with the in-memory sink standing
//! in for Cassandra. These need a broker at `kafka:9092` and are ignored by
//! default; run them with `cargo test -- --ignored` inside the dev container.

mod ingest_e2e;
