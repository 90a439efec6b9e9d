//! Custom attribute serialization
//!
//! Converts host attribute bags into JSON-safe values. Nothing here fails:
//! values that cannot be represented are dropped.

use serde_json::{Map, Number, Value};

use crate::scene::{CameraData, ObjectKind, Projection, PropertyBag, PropertyValue, SceneObject};

/// Keys starting with this are host-internal
const RESERVED_PREFIX: char = '_';

/// Property carrying an orthographic camera's visible width
pub const CAMERA_ZOOM_PROPERTY: &str = "zoom";

/// Serialize an attribute bag into a JSON object
pub fn serialize_properties(properties: &PropertyBag) -> Map<String, Value> {
    properties
        .iter()
        .filter(|(key, _)| !key.starts_with(RESERVED_PREFIX))
        .filter_map(|(key, value)| to_json(value).map(|v| (key.clone(), v)))
        .collect()
}

/// Custom properties of an object, including derived camera zoom
pub fn object_properties(object: &SceneObject) -> Map<String, Value> {
    let mut properties = serialize_properties(&object.properties);

    if object.kind == ObjectKind::Camera
        && let Some(CameraData {
            projection: Projection::Orthographic,
            ortho_scale,
        }) = object.camera
        && !properties.contains_key(CAMERA_ZOOM_PROPERTY)
        && let Some(zoom) = float(ortho_scale as f64)
    {
        properties.insert(CAMERA_ZOOM_PROPERTY.to_string(), zoom);
    }

    properties
}

/// Convert one value, `None` when it has no JSON-safe form
fn to_json(value: &PropertyValue) -> Option<Value> {
    match value {
        PropertyValue::Bool(b) => Some(Value::Bool(*b)),
        PropertyValue::Int(i) => Some(Value::Number((*i).into())),
        PropertyValue::Float(f) => float(*f),
        PropertyValue::String(s) => Some(Value::String(s.clone())),
        PropertyValue::IntArray(items) => Some(Value::Array(
            items.iter().map(|i| Value::Number((*i).into())).collect(),
        )),
        PropertyValue::Array(items) => items
            .iter()
            .map(|f| float(*f))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        // Groups have no numeric form; fall back to their text form
        PropertyValue::Group(group) => {
            let nested = Value::Object(serialize_properties(group));
            serde_json::to_string(&nested).ok().map(Value::String)
        }
        PropertyValue::Opaque { number, text } => number
            .and_then(float)
            .or_else(|| text.clone().map(Value::String)),
        PropertyValue::Other(value) => match value {
            Value::Null => None,
            Value::Number(_) | Value::String(_) => Some(value.clone()),
            // No numeric form; fall back to the compact JSON text
            other => serde_json::to_string(other).ok().map(Value::String),
        },
    }
}

/// Finite floats only
fn float(value: f64) -> Option<Value> {
    Number::from_f64(value).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_primitives_kept() {
        let mut bag = PropertyBag::new();
        bag.insert("health".into(), PropertyValue::Int(100));
        bag.insert("speed".into(), PropertyValue::Float(1.5));
        bag.insert("boss".into(), PropertyValue::Bool(false));
        bag.insert("label".into(), "gate".into());
        bag.insert("tint".into(), vec![1.0, 0.25, 0.0].into());

        let json = Value::Object(serialize_properties(&bag));
        assert_eq!(
            json,
            json!({
                "health": 100,
                "speed": 1.5,
                "boss": false,
                "label": "gate",
                "tint": [1.0, 0.25, 0.0]
            })
        );
        assert!(json["health"].is_i64());
    }

    #[test]
    fn test_reserved_keys_skipped() {
        let mut bag = PropertyBag::new();
        bag.insert("_RNA_UI".into(), PropertyValue::Int(1));
        bag.insert("_private".into(), "x".into());
        bag.insert("visible".into(), PropertyValue::Bool(true));

        let props = serialize_properties(&bag);
        assert_eq!(props.len(), 1);
        assert!(props.contains_key("visible"));
    }

    #[test]
    fn test_coercion_fallbacks() {
        let mut bag = PropertyBag::new();
        bag.insert(
            "weight".into(),
            PropertyValue::Opaque {
                number: Some(2.0),
                text: Some("2 kg".into()),
            },
        );
        bag.insert(
            "ref".into(),
            PropertyValue::Opaque {
                number: None,
                text: Some("<object Door>".into()),
            },
        );
        bag.insert(
            "blob".into(),
            PropertyValue::Opaque {
                number: None,
                text: None,
            },
        );
        bag.insert("nan".into(), PropertyValue::Float(f64::NAN));
        bag.insert("bad_vector".into(), vec![1.0, f64::INFINITY].into());

        let mut group = PropertyBag::new();
        group.insert("gold".into(), PropertyValue::Int(3));
        group.insert("_hidden".into(), PropertyValue::Int(4));
        bag.insert("loot".into(), PropertyValue::Group(group));

        let props = serialize_properties(&bag);
        assert_eq!(props["weight"], json!(2.0));
        assert_eq!(props["ref"], json!("<object Door>"));
        assert_eq!(props["loot"], json!(r#"{"gold":3}"#));
        assert!(!props.contains_key("blob"));
        assert!(!props.contains_key("nan"));
        assert!(!props.contains_key("bad_vector"));
    }

    #[test]
    fn test_integer_list_kept() {
        let mut bag = PropertyBag::new();
        bag.insert("grid".into(), vec![1_i64, 2, 3].into());
        bag.insert("big".into(), vec![i64::MAX].into());

        let props = serialize_properties(&bag);
        assert_eq!(props["grid"], json!([1, 2, 3]));
        assert!(props["grid"][0].is_i64());
        assert_eq!(props["big"], json!([i64::MAX]));
    }

    #[test]
    fn test_other_values() {
        let mut bag = PropertyBag::new();
        bag.insert("flags".into(), PropertyValue::Other(json!([true, false])));
        bag.insert("tags".into(), PropertyValue::Other(json!(["a", "b"])));
        bag.insert("none".into(), PropertyValue::Other(Value::Null));

        let props = serialize_properties(&bag);
        assert_eq!(props["flags"], json!("[true,false]"));
        assert_eq!(props["tags"], json!(r#"["a","b"]"#));
        assert!(!props.contains_key("none"));
    }

    #[test]
    fn test_orthographic_camera_zoom() {
        let mut camera = SceneObject::new("Camera", ObjectKind::Camera);
        camera.camera = Some(CameraData {
            projection: Projection::Orthographic,
            ortho_scale: 12.5,
        });
        assert_eq!(object_properties(&camera)["zoom"], json!(12.5));

        // Authored zoom wins
        camera.properties.insert("zoom".into(), PropertyValue::Int(3));
        assert_eq!(object_properties(&camera)["zoom"], json!(3));

        let mut perspective = SceneObject::new("Persp", ObjectKind::Camera);
        perspective.camera = Some(CameraData {
            projection: Projection::Perspective,
            ortho_scale: 6.0,
        });
        assert!(object_properties(&perspective).is_empty());
    }
}
