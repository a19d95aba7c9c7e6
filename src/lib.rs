//! product-ingest library
//!
//! Consumes JSON product records from a Kafka topic and writes them to a
//! Cassandra product table, committing each offset only after the write
//! succeeds. MongoDB and PostgreSQL can be selected as additional sinks.
//!
//! # CLI Usage
//!
//! ```bash
//! # Credentials come from .env (KAFKA_USERNAME, KAFKA_PASSWORD,
//! # BOOTSTRAP_SERVER, CASSANDRA_CLIENT_TOKEN, MONGODB_URL, DATABASE_URL)
//! product-ingest --bundle-path ./secure-connect.zip
//!
//! # Mirror every product into MongoDB as well
//! product-ingest --sinks cassandra,mongodb
//!
//! # Commit past payloads that are not products instead of leaving them
//! product-ingest --on-malformed commit
//! ```

use clap::Parser;
use product_ingest_kafka_source::consumer::DEFAULT_SESSION_TIMEOUT_MS;
use product_ingest_kafka_source::{ConsumerConfig, IngestConfig, MalformedPolicy};
use product_sink::SinkKind;
use std::path::PathBuf;
use std::time::Duration;

pub mod config;
pub mod connect;

pub use config::{load_env_file, parse_duration, Credentials};
pub use connect::{connect_sinks, resolve_sinks};

#[derive(Parser, Clone, Debug)]
pub struct KafkaOpts {
    /// Consumer group ID
    #[arg(long, default_value = "products")]
    pub group_id: String,

    /// Topic to consume product records from
    #[arg(long, default_value = "products")]
    pub topic: String,

    /// Where to start when the group has no committed offset ("earliest" or "latest")
    #[arg(long, default_value = "earliest")]
    pub auto_offset_reset: String,

    /// Session timeout in milliseconds
    #[arg(long, default_value = DEFAULT_SESSION_TIMEOUT_MS)]
    pub session_timeout_ms: String,
}

impl KafkaOpts {
    pub fn consumer_config(&self, credentials: &Credentials) -> ConsumerConfig {
        ConsumerConfig {
            brokers: credentials.bootstrap_server.clone(),
            group_id: self.group_id.clone(),
            topic: self.topic.clone(),
            auto_offset_reset: self.auto_offset_reset.clone(),
            session_timeout_ms: self.session_timeout_ms.clone(),
            sasl: credentials.kafka_sasl.clone(),
        }
    }
}

#[derive(Parser, Clone, Debug)]
pub struct CassandraOpts {
    /// Secure connect bundle zip
    #[arg(long, default_value = "./secure-connect.zip")]
    pub bundle_path: PathBuf,

    /// Keyspace holding the product table
    #[arg(long, default_value = "chatsandra")]
    pub keyspace: String,

    /// Product table name
    #[arg(long, default_value = "products")]
    pub table: String,

    /// Timeout for establishing the Cassandra session
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    pub connect_timeout: Duration,
}

#[derive(Parser, Clone, Debug)]
pub struct MongoOpts {
    /// MongoDB database (used with --sinks mongodb)
    #[arg(long, default_value = "products")]
    pub mongodb_database: String,

    /// MongoDB collection (used with --sinks mongodb)
    #[arg(long, default_value = "products")]
    pub mongodb_collection: String,
}

#[derive(Parser, Clone, Debug)]
pub struct PostgresOpts {
    /// PostgreSQL table (used with --sinks postgresql)
    #[arg(long, default_value = "products")]
    pub postgres_table: String,
}

#[derive(Parser, Clone, Debug)]
pub struct IngestOpts {
    /// Sinks every product is written to, in order (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "cassandra")]
    pub sinks: Vec<SinkKind>,

    /// What to do with payloads that are not valid product records
    #[arg(long, value_enum, default_value_t = MalformedPolicy::Skip)]
    pub on_malformed: MalformedPolicy,

    /// First retry delay after a failed fetch
    #[arg(long, default_value = "100ms", value_parser = parse_duration)]
    pub fetch_backoff_initial: Duration,

    /// Maximum retry delay after repeated failed fetches
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub fetch_backoff_max: Duration,

    /// Exit after handling this many messages
    #[arg(long)]
    pub max_messages: Option<u64>,

    /// How long to wait for the in-flight message after a shutdown signal
    #[arg(long, default_value = "5s", value_parser = parse_duration)]
    pub shutdown_timeout: Duration,
}

impl From<&IngestOpts> for IngestConfig {
    fn from(opts: &IngestOpts) -> Self {
        Self {
            malformed_policy: opts.on_malformed,
            fetch_backoff_initial: opts.fetch_backoff_initial,
            fetch_backoff_max: opts.fetch_backoff_max,
            max_messages: opts.max_messages,
        }
    }
}
