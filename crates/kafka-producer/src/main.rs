use clap::Parser;
use product_ingest_kafka_producer::{publish_sample_products, ProductTestProducer};

/// Publish sample product records to a Kafka topic
///
/// To try the consumer locally:
/// 1. Start Kafka with Docker:
///    docker run -d --name kafka -p 9092:9092 apache/kafka:latest
/// 2. Publish products:
///    cargo run -p product-ingest-kafka-producer -- --count 10
/// 3. Run product-ingest against the same broker in another terminal.
#[derive(Parser)]
#[command(name = "product-producer")]
struct Args {
    /// Kafka bootstrap server
    #[arg(long, default_value = "localhost:9092", env = "BOOTSTRAP_SERVER")]
    broker: String,

    /// Topic to publish to
    #[arg(long, default_value = "products")]
    topic: String,

    /// Partitions to create the topic with if it does not exist
    #[arg(long, default_value_t = 1)]
    partitions: i32,

    /// Number of times to publish the sample catalogue
    #[arg(long, default_value_t = 1)]
    count: usize,

    /// Also publish one payload that is not a product
    #[arg(long)]
    with_malformed: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run_main(Args::parse()).await {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

async fn run_main(args: Args) -> anyhow::Result<()> {
    let producer = ProductTestProducer::new(&args.broker).await?;
    producer
        .create_topic_if_not_exists(&args.topic, args.partitions)
        .await?;

    let mut published = 0;
    for _ in 0..args.count {
        published += publish_sample_products(&producer, &args.topic).await?.len();
    }

    if args.with_malformed {
        producer.publish_raw(&args.topic, "malformed", b"not-json").await?;
        tracing::info!("Published one malformed payload");
    }

    tracing::info!("Published {published} products to '{}'", args.topic);
    Ok(())
}
