//! Test flow:
//! 1. Create a fresh topic and publish sample products plus one malformed payload
//! 2. Run the ingest loop and verify every product was stored and committed
//! 3. Publish another product, fail the sink, and verify a new consumer in the
//!    same group gets it redelivered

use product_ingest_kafka_producer::{publish_sample_products, sample_products, ProductTestProducer};
use product_ingest_kafka_source::testing::RecordingSink;
use product_ingest_kafka_source::{run_ingest_loop, Consumer, ConsumerConfig, IngestConfig, IngestStats};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Kafka broker address for testing
const KAFKA_BROKER: &str = "kafka:9092";

fn consumer(topic: &str, group_id: &str) -> anyhow::Result<Consumer> {
    Ok(Consumer::new(ConsumerConfig {
        brokers: KAFKA_BROKER.to_string(),
        group_id: group_id.to_string(),
        topic: topic.to_string(),
        ..Default::default()
    })?)
}

async fn ingest(consumer: &Consumer, sink: &RecordingSink, max_messages: u64) -> anyhow::Result<IngestStats> {
    let config = IngestConfig {
        max_messages: Some(max_messages),
        ..Default::default()
    };
    let stats = tokio::time::timeout(
        Duration::from_secs(60),
        run_ingest_loop(consumer, sink, &config, &CancellationToken::new()),
    )
    .await?;
    Ok(stats)
}

#[tokio::test]
#[ignore = "requires a Kafka broker at kafka:9092"]
async fn test_kafka_ingest_commits_and_redelivers() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("product_ingest=debug,product_ingest_kafka_source=debug")
        .try_init()
        .ok();

    let test_id = Uuid::new_v4();
    let topic = format!("test-products-{test_id}");
    let group_id = format!("test-group-{test_id}");

    let producer = ProductTestProducer::new(KAFKA_BROKER).await?;
    producer.create_topic_if_not_exists(&topic, 1).await?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    let products = publish_sample_products(&producer, &topic).await?;
    producer.publish_raw(&topic, "malformed", b"not-json").await?;

    // Step 1: every product stored, the malformed payload skipped
    let sink = RecordingSink::new();
    let first = consumer(&topic, &group_id)?;
    let stats = ingest(&first, &sink, products.len() as u64 + 1).await?;

    assert_eq!(stats.committed, products.len() as u64);
    assert_eq!(stats.malformed, 1);
    for product in &products {
        assert_eq!(sink.get(&product.id).await.as_ref(), Some(product));
    }

    // Step 2: storage outage leaves the next product uncommitted
    let late = sample_products().remove(0);
    producer.publish_product(&topic, &late).await?;

    sink.set_failing(true);
    let stats = ingest(&first, &sink, 1).await?;
    assert_eq!(stats.persist_failures, 1);
    assert!(sink.get(&late.id).await.is_none());
    drop(first);

    // Step 3: a new consumer resumes from the committed offset, which still
    // precedes the skipped malformed payload
    sink.set_failing(false);
    let second = consumer(&topic, &group_id)?;
    let stats = ingest(&second, &sink, 2).await?;

    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.committed, 1);
    assert_eq!(sink.get(&late.id).await, Some(late));

    Ok(())
}
