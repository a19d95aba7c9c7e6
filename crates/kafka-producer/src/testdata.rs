//! Sample products for integration tests and local demos

use crate::ProductTestProducer;
use product_types::ProductRecord;
use uuid::Uuid;

/// A small fixed catalogue with fresh ids on every call
pub fn sample_products() -> Vec<ProductRecord> {
    vec![
        ProductRecord {
            id: Uuid::new_v4(),
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price: 9.99,
            quantity: 5,
        },
        ProductRecord {
            id: Uuid::new_v4(),
            name: "Gadget".to_string(),
            description: "Pocket-sized gadget with a very long description".repeat(4),
            price: 124.5,
            quantity: 0,
        },
        ProductRecord {
            id: Uuid::new_v4(),
            name: "Refund adjustment".to_string(),
            description: String::new(),
            price: -3.25,
            quantity: -1,
        },
    ]
}

/// Publish the sample catalogue and return what was sent
pub async fn publish_sample_products(
    producer: &ProductTestProducer,
    topic: &str,
) -> anyhow::Result<Vec<ProductRecord>> {
    let products = sample_products();
    for product in &products {
        producer.publish_product(topic, product).await?;
    }
    tracing::info!("Published {} sample products to '{topic}'", products.len());
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_products_have_unique_ids() {
        let products = sample_products();
        assert_eq!(products.len(), 3);
        assert_ne!(products[0].id, products[1].id);
        assert_ne!(products[1].id, products[2].id);
    }
}
