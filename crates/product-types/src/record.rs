use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{DecodeError, Result};

/// A product as published by the upstream producer.
///
/// Decoding is lenient: absent or `null` fields take their zero value and
/// unknown fields are ignored. Values of the wrong type are still rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    /// Primary key in every sink
    #[serde(rename = "product_id", deserialize_with = "null_as_default")]
    pub id: Uuid,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price: f64,
    /// Stored as CQL `int`, so anything outside `i32` fails to decode
    #[serde(deserialize_with = "null_as_default")]
    pub quantity: i32,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProductRecord {
    /// Decode a product from raw message payload bytes.
    pub fn from_json(payload: &[u8]) -> Result<Self> {
        if payload.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        // A bare `null` document decodes to the zero record.
        let record: Option<Self> = serde_json::from_slice(payload)?;
        Ok(record.unwrap_or_default())
    }

    /// Encode as the JSON object producers publish.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGET_ID: &str = "5b6f7c2e-3f1a-4c8e-9d2b-1a2b3c4d5e6f";

    #[test]
    fn test_decode_widget() {
        let payload = format!(
            r#"{{"product_id":"{WIDGET_ID}","name":"Widget","description":"A widget","price":9.99,"quantity":5}}"#
        );
        let record = ProductRecord::from_json(payload.as_bytes()).unwrap();

        assert_eq!(record.id, Uuid::parse_str(WIDGET_ID).unwrap());
        assert_eq!(record.name, "Widget");
        assert_eq!(record.description, "A widget");
        assert_eq!(record.price, 9.99);
        assert_eq!(record.quantity, 5);
    }

    #[test]
    fn test_decode_not_json() {
        let err = ProductRecord::from_json(b"not-json").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_decode_empty_payload() {
        let err = ProductRecord::from_json(b"").unwrap_err();
        assert!(matches!(err, DecodeError::EmptyPayload));
    }

    #[test]
    fn test_missing_fields_default_to_zero_values() {
        let record = ProductRecord::from_json(br#"{"name":"Bare"}"#).unwrap();

        assert_eq!(record.id, Uuid::nil());
        assert_eq!(record.name, "Bare");
        assert_eq!(record.description, "");
        assert_eq!(record.price, 0.0);
        assert_eq!(record.quantity, 0);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let payload = format!(r#"{{"product_id":"{WIDGET_ID}","color":"red","quantity":-3}}"#);
        let record = ProductRecord::from_json(payload.as_bytes()).unwrap();
        assert_eq!(record.quantity, -3);
    }

    #[test]
    fn test_null_fields_decode_as_zero_values() {
        let payload = format!(
            r#"{{"product_id":"{WIDGET_ID}","name":"Widget","description":null,"price":9.99,"quantity":5}}"#
        );
        let record = ProductRecord::from_json(payload.as_bytes()).unwrap();
        assert_eq!(record.description, "");
        assert_eq!(record.name, "Widget");
        assert_eq!(record.quantity, 5);

        let record = ProductRecord::from_json(
            br#"{"product_id":null,"name":null,"description":null,"price":null,"quantity":null}"#,
        )
        .unwrap();
        assert_eq!(record, ProductRecord::default());
    }

    #[test]
    fn test_null_document_decodes_as_zero_record() {
        let record = ProductRecord::from_json(b"null").unwrap();
        assert_eq!(record, ProductRecord::default());

        assert!(ProductRecord::from_json(b"42").is_err());
        assert!(ProductRecord::from_json(br#""widget""#).is_err());
    }

    #[test]
    fn test_invalid_uuid_is_rejected() {
        let err = ProductRecord::from_json(br#"{"product_id":"not-a-uuid"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(ProductRecord::from_json(br#"{"price":"cheap"}"#).is_err());
        assert!(ProductRecord::from_json(br#"{"quantity":1.5}"#).is_err());
        assert!(ProductRecord::from_json(br#"{"quantity":3000000000}"#).is_err());
    }

    #[test]
    fn test_json_uses_product_id_key() {
        let record = ProductRecord {
            id: Uuid::parse_str(WIDGET_ID).unwrap(),
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price: 9.99,
            quantity: 5,
        };
        let value: serde_json::Value = serde_json::from_slice(&record.to_json().unwrap()).unwrap();

        assert_eq!(value["product_id"], WIDGET_ID);
        assert!(value.get("id").is_none());
        assert_eq!(ProductRecord::from_json(&record.to_json().unwrap()).unwrap(), record);
    }
}
