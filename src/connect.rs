use anyhow::Context;
use product_ingest_cassandra::{CassandraConfig, CassandraSink};
use product_ingest_mongodb::{MongoConfig, MongoSink};
use product_ingest_postgresql::{PostgresConfig, PostgresSink};
use product_sink::{SinkKind, SinkSet};

use crate::{CassandraOpts, Credentials, MongoOpts, PostgresOpts};

/// Deduplicate the requested sinks and put Cassandra first.
///
/// Cassandra is the table of record, so it must be selected; it is written
/// before any mirror so a mirror never holds a product the table lacks.
pub fn resolve_sinks(requested: &[SinkKind]) -> anyhow::Result<Vec<SinkKind>> {
    if !requested.contains(&SinkKind::Cassandra) {
        anyhow::bail!("The cassandra sink is required (got: {requested:?})");
    }

    let mut resolved = vec![SinkKind::Cassandra];
    for kind in requested {
        if !resolved.contains(kind) {
            resolved.push(*kind);
        }
    }
    Ok(resolved)
}

/// Open a connection for every selected sink.
///
/// Any failure here is a startup error; nothing is opened for sinks that were
/// not selected.
pub async fn connect_sinks(
    requested: &[SinkKind],
    cassandra: &CassandraOpts,
    mongodb: &MongoOpts,
    postgres: &PostgresOpts,
    credentials: &Credentials,
) -> anyhow::Result<SinkSet> {
    let mut sinks = SinkSet::new();

    for kind in resolve_sinks(requested)? {
        match kind {
            SinkKind::Cassandra => {
                let token = credentials
                    .cassandra_client_token
                    .clone()
                    .context("CASSANDRA_CLIENT_TOKEN is not set")?;
                let config = CassandraConfig {
                    bundle_path: cassandra.bundle_path.clone(),
                    keyspace: cassandra.keyspace.clone(),
                    table: cassandra.table.clone(),
                    connect_timeout: cassandra.connect_timeout,
                    ..CassandraConfig::new(token)
                };
                let sink = CassandraSink::connect(&config)
                    .await
                    .context("Failed to connect to Cassandra")?;
                sinks.push(Box::new(sink));
            }
            SinkKind::MongoDB => {
                let url = credentials
                    .mongodb_url
                    .clone()
                    .context("MONGODB_URL is not set but the mongodb sink was selected")?;
                let config = MongoConfig {
                    database: mongodb.mongodb_database.clone(),
                    collection: mongodb.mongodb_collection.clone(),
                    ..MongoConfig::new(url)
                };
                let sink = MongoSink::connect(&config)
                    .await
                    .context("Error connecting to MongoDB")?;
                sinks.push(Box::new(sink));
            }
            SinkKind::PostgreSQL => {
                let url = credentials
                    .database_url
                    .clone()
                    .context("DATABASE_URL is not set but the postgresql sink was selected")?;
                let config = PostgresConfig {
                    table: postgres.postgres_table.clone(),
                    ..PostgresConfig::new(url)
                };
                let sink = PostgresSink::connect(&config)
                    .await
                    .context("Error opening PostgreSQL database")?;
                sinks.push(Box::new(sink));
            }
        }
        tracing::info!("Connected {kind} sink");
    }

    Ok(sinks)
}
