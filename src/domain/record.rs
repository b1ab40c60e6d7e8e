use serde::{Deserialize, Serialize};

use super::brand::BrandKey;
use super::naming;

/// One uploaded image as stored in the record file
///
/// Serialized as `{"brand": ..., "model": ..., "imageUrl": ...}`; any other
/// shape is rejected when the record file is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishedRecord {
    pub brand: String,
    pub model: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

impl PublishedRecord {
    /// Record for an image uploaded under `brand` with the given publish identifier.
    pub fn from_upload(brand: &BrandKey, identifier: &str, image_url: impl Into<String>) -> Self {
        Self {
            brand: brand.to_string(),
            model: naming::model_name(identifier),
            image_url: image_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_upload() {
        let record = PublishedRecord::from_upload(
            &BrandKey::from_directory("Brandx"),
            "galaxy-s24-ultra",
            "https://res.example.com/Brandx/galaxy-s24-ultra.png",
        );
        assert_eq!(record.brand, "Brandx");
        assert_eq!(record.model, "Galaxy S24 Ultra");
    }

    #[test]
    fn test_record_json_shape() {
        let record = PublishedRecord {
            brand: "Apple".into(),
            model: "Iphone 15".into(),
            image_url: "https://res.example.com/a.png".into(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "brand": "Apple",
                "model": "Iphone 15",
                "imageUrl": "https://res.example.com/a.png"
            })
        );
    }

    #[test]
    fn test_record_rejects_unknown_fields() {
        let raw = r#"{"brand":"A","model":"B","imageUrl":"u","extra":1}"#;
        assert!(serde_json::from_str::<PublishedRecord>(raw).is_err());

        let raw = r#"{"brand":"A","model":"B"}"#;
        assert!(serde_json::from_str::<PublishedRecord>(raw).is_err());
    }
}
