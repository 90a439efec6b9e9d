//! Dynamically typed custom attributes

use std::collections::BTreeMap;

use serde::Deserialize;

/// Custom attribute bag of an object or collection
pub type PropertyBag = BTreeMap<String, PropertyValue>;

/// A custom attribute value as stored by the host
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Integer vectors, kept integral
    IntArray(Vec<i64>),
    /// Vectors and colors
    Array(Vec<f64>),
    /// Nested property group
    Group(BTreeMap<String, PropertyValue>),
    /// Host-specific value that only offers best-effort conversions
    #[serde(skip)]
    Opaque {
        number: Option<f64>,
        text: Option<String>,
    },
    /// Anything else the dump contains (null, mixed or non-numeric lists)
    Other(serde_json::Value),
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<Vec<i64>> for PropertyValue {
    fn from(value: Vec<i64>) -> Self {
        PropertyValue::IntArray(value)
    }
}

impl From<Vec<f64>> for PropertyValue {
    fn from(value: Vec<f64>) -> Self {
        PropertyValue::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_deserialize() {
        let bag: PropertyBag = serde_json::from_str(
            r#"{ "health": 100, "speed": 2.5, "boss": true, "tag": "orc",
                 "tint": [1.0, 0.5, 0.0, 1.0], "loot": { "gold": 3 } }"#,
        )
        .unwrap();

        assert_eq!(bag["health"], PropertyValue::Int(100));
        assert_eq!(bag["speed"], PropertyValue::Float(2.5));
        assert_eq!(bag["boss"], PropertyValue::Bool(true));
        assert_eq!(bag["tag"], PropertyValue::String("orc".into()));
        assert_eq!(bag["tint"], PropertyValue::Array(vec![1.0, 0.5, 0.0, 1.0]));
        assert!(matches!(&bag["loot"], PropertyValue::Group(g) if g["gold"] == PropertyValue::Int(3)));
    }

    #[test]
    fn test_integer_lists_stay_integral() {
        let bag: PropertyBag =
            serde_json::from_str(r#"{ "grid": [1, 2, 3], "mixed": [1, 2.5] }"#).unwrap();
        assert_eq!(bag["grid"], PropertyValue::IntArray(vec![1, 2, 3]));
        assert_eq!(bag["mixed"], PropertyValue::Array(vec![1.0, 2.5]));
    }

    #[test]
    fn test_unusual_values_fall_through() {
        let bag: PropertyBag = serde_json::from_str(
            r#"{ "flags": [true, false], "tags": ["a", "b"], "none": null,
                 "nested": [[1.0, 2.0]], "health": 100 }"#,
        )
        .unwrap();

        assert_eq!(bag["health"], PropertyValue::Int(100));
        assert!(matches!(bag["flags"], PropertyValue::Other(_)));
        assert!(matches!(bag["tags"], PropertyValue::Other(_)));
        assert_eq!(bag["none"], PropertyValue::Other(serde_json::Value::Null));
        assert!(matches!(bag["nested"], PropertyValue::Other(_)));
    }
}
