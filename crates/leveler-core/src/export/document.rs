//! Level file layout

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::hierarchy::CollectionHierarchy;
use crate::mapping::Point2;
use crate::surface::UvMapping;

/// Level format version
pub const FORMAT_VERSION: &str = "1.0";

/// Root of the level JSON
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub exported_from: String,
    pub scale_factor: f64,
    pub collection_hierarchy: CollectionHierarchy,
    /// Sorted by name
    pub objects: Vec<ExportedObject>,
}

/// One exported scene object
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedObject {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub collections: Vec<String>,
    pub collection_properties: BTreeMap<String, Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_type: Option<String>,
    pub position: Point2,
    pub dimensions: Point2,
    pub scale: Point2,
    pub rotation: f64,
    pub origin_offset: Point2,
    pub custom_properties: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertices: Option<Vec<Point2>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_mapping: Option<UvMapping>,
}

impl ExportDocument {
    /// Pretty JSON with a trailing newline
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
