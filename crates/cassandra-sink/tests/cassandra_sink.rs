//! Cassandra sink tests against a plain node
//!
//! The sink is built with `CassandraSink::from_session` on an unauthenticated
//! session, so only the prepared insert and its parameter binding are under
//! test here, not bundle loading.

use product_ingest_cassandra::{CassandraConfig, CassandraSink};
use product_sink::ProductSink;
use product_types::ProductRecord;
use scylla::{Session, SessionBuilder};
use uuid::Uuid;

const CASSANDRA_NODE: &str = "cassandra:9042";
const KEYSPACE: &str = "product_ingest_test";

async fn connect() -> anyhow::Result<Session> {
    Ok(SessionBuilder::new().known_node(CASSANDRA_NODE).build().await?)
}

/// Create a fresh product table and return its name.
async fn create_table(session: &Session) -> anyhow::Result<String> {
    let table = format!("products_{}", Uuid::new_v4().simple());
    session
        .query_unpaged(
            format!(
                "CREATE KEYSPACE IF NOT EXISTS {KEYSPACE} \
                 WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': 1}}"
            ),
            (),
        )
        .await?;
    session
        .query_unpaged(
            format!(
                "CREATE TABLE {KEYSPACE}.{table} (\
                 product_id uuid PRIMARY KEY, name text, description text, price double, quantity int)"
            ),
            (),
        )
        .await?;
    Ok(table)
}

async fn read_product(
    session: &Session,
    table: &str,
    id: Uuid,
) -> anyhow::Result<Option<ProductRecord>> {
    let rows = session
        .query_unpaged(
            format!(
                "SELECT product_id, name, description, price, quantity FROM {KEYSPACE}.{table} \
                 WHERE product_id = ?"
            ),
            (id,),
        )
        .await?
        .into_rows_result()?;

    let row = rows.maybe_first_row::<(Uuid, String, String, f64, i32)>()?;
    Ok(row.map(|(id, name, description, price, quantity)| ProductRecord {
        id,
        name,
        description,
        price,
        quantity,
    }))
}

async fn count_rows(session: &Session, table: &str) -> anyhow::Result<i64> {
    let rows = session
        .query_unpaged(format!("SELECT COUNT(*) FROM {KEYSPACE}.{table}"), ())
        .await?
        .into_rows_result()?;
    let (count,) = rows.single_row::<(i64,)>()?;
    Ok(count)
}

#[tokio::test]
#[ignore = "requires a Cassandra node at cassandra:9042"]
async fn test_cassandra_write_product_round_trip() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("product_ingest_cassandra=debug")
        .try_init()
        .ok();

    let admin = connect().await?;
    let table = create_table(&admin).await?;
    let config = CassandraConfig {
        keyspace: KEYSPACE.to_string(),
        table: table.clone(),
        ..CassandraConfig::new("unused")
    };
    let sink = CassandraSink::from_session(connect().await?, &config).await?;

    let widget = ProductRecord {
        id: Uuid::new_v4(),
        name: "Widget".to_string(),
        description: "A widget".to_string(),
        price: 9.99,
        quantity: 5,
    };
    sink.write_product(&widget).await?;
    assert_eq!(read_product(&admin, &table, widget.id).await?, Some(widget.clone()));

    // Redelivery of the same id overwrites the row
    let restocked = ProductRecord {
        quantity: 7,
        price: 8.5,
        ..widget.clone()
    };
    sink.write_product(&restocked).await?;
    assert_eq!(read_product(&admin, &table, widget.id).await?, Some(restocked));
    assert_eq!(count_rows(&admin, &table).await?, 1);

    sink.close().await?;
    admin
        .query_unpaged(format!("DROP TABLE {KEYSPACE}.{table}"), ())
        .await?;
    Ok(())
}
