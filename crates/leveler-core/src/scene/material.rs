//! Materials and their shader node graphs

use serde::Deserialize;

/// An image datablock referenced by a texture node
#[derive(Debug, Clone, Deserialize)]
pub struct ImageRef {
    pub name: String,
    /// External file path as stored by the host (may be `//`-relative)
    #[serde(default)]
    pub filepath: Option<String>,
    /// Image data is embedded in the authoring file
    #[serde(default)]
    pub packed: bool,
}

/// A shader graph node; only image textures matter to the exporter
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ShaderNode {
    #[serde(rename = "TEX_IMAGE")]
    ImageTexture {
        #[serde(default)]
        image: Option<ImageRef>,
    },
    #[serde(other)]
    Other,
}

/// A material in one of the object's slots
#[derive(Debug, Clone, Deserialize)]
pub struct Material {
    pub name: String,
    /// Material is defined by a node graph
    #[serde(default)]
    pub use_nodes: bool,
    #[serde(default)]
    pub nodes: Vec<ShaderNode>,
}

impl Material {
    /// Node-based material with the given nodes
    pub fn with_nodes(name: impl Into<String>, nodes: Vec<ShaderNode>) -> Self {
        Self {
            name: name.into(),
            use_nodes: true,
            nodes,
        }
    }
}
