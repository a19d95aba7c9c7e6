pub mod ingest;

pub use ingest::{
    process_message, run_ingest_loop, IngestConfig, IngestStats, MalformedPolicy, Outcome,
};
