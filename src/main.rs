//! Command-line interface for product-ingest
//!
//! # Usage Examples
//!
//! ```bash
//! # Consume from the products topic into chatsandra.products
//! product-ingest --env-file .env --bundle-path ./secure-connect.zip
//!
//! # Also mirror into PostgreSQL, exit after 1000 messages
//! product-ingest --sinks cassandra,postgresql --max-messages 1000
//! ```

use anyhow::Context;
use clap::Parser;
use product_ingest::{
    connect_sinks, load_env_file, CassandraOpts, Credentials, IngestOpts, KafkaOpts, MongoOpts,
    PostgresOpts,
};
use product_ingest_kafka_source::{run_ingest_loop, Consumer, IngestConfig, IngestStats};
use product_sink::ProductSink;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "product-ingest")]
#[command(about = "Consume product records from Kafka and write them to Cassandra")]
#[command(long_about = None)]
struct Cli {
    /// Env file holding connection credentials
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Read credentials from the process environment only
    #[arg(long)]
    no_env_file: bool,

    #[command(flatten)]
    kafka: KafkaOpts,

    #[command(flatten)]
    cassandra: CassandraOpts,

    #[command(flatten)]
    mongodb: MongoOpts,

    #[command(flatten)]
    postgres: PostgresOpts,

    #[command(flatten)]
    ingest: IngestOpts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if !cli.no_env_file {
        load_env_file(&cli.env_file)?;
    }
    let credentials = Credentials::from_env()?;
    tracing::debug!("Credentials: {credentials:?}");

    let consumer_config = cli.kafka.consumer_config(&credentials);
    info!(
        "Subscribing to topic '{}' as group '{}' via {}",
        consumer_config.topic, consumer_config.group_id, consumer_config.brokers
    );
    let consumer = Consumer::new(consumer_config).context("Failed to create Kafka consumer")?;

    let sinks = connect_sinks(
        &cli.ingest.sinks,
        &cli.cassandra,
        &cli.mongodb,
        &cli.postgres,
        &credentials,
    )
    .await?;
    info!("Writing products to: {}", sinks.names().join(", "));

    let source = Arc::new(consumer);
    let sinks = Arc::new(sinks);
    let ingest_config = IngestConfig::from(&cli.ingest);
    let cancel = CancellationToken::new();

    let mut handle = {
        let source = Arc::clone(&source);
        let sinks = Arc::clone(&sinks);
        let cancel = cancel.clone();
        tokio::spawn(async move { run_ingest_loop(&*source, &*sinks, &ingest_config, &cancel).await })
    };

    let stats: Option<IngestStats> = tokio::select! {
        _ = shutdown_signal() => {
            cancel.cancel();
            match tokio::time::timeout(cli.ingest.shutdown_timeout, &mut handle).await {
                Ok(joined) => Some(joined.context("Ingest task failed")?),
                Err(_) => {
                    warn!(
                        "Ingest loop did not stop within {:?}, aborting it",
                        cli.ingest.shutdown_timeout
                    );
                    handle.abort();
                    None
                }
            }
        }
        joined = &mut handle => Some(joined.context("Ingest task failed")?),
    };

    if let Err(e) = sinks.close().await {
        warn!("Error closing sinks: {e:#}");
    }

    match stats {
        Some(stats) => info!(
            "Shut down cleanly: {} fetched, {} committed, {} malformed, {} persist failures, {} commit failures, {} fetch errors",
            stats.fetched,
            stats.committed,
            stats.malformed,
            stats.persist_failures,
            stats.commit_failures,
            stats.fetch_errors
        ),
        None => info!("Shut down"),
    }
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
