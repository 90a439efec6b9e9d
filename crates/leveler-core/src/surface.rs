//! Texture and UV resolution

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::mapping::round_to;
use crate::scene::{Material, MeshData, ShaderNode};

/// Decimal places for UV coordinates
pub const UV_PRECISION: i32 = 6;

/// Marks an image embedded in the authoring file instead of a path on disk
pub const PACKED_PREFIX: &str = "[packed]";

/// Prefix of paths relative to the authoring file
const BLEND_RELATIVE_PREFIX: &str = "//";

/// UV coordinate of one vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UvCoordinate {
    pub vertex_index: u32,
    pub u: f64,
    pub v: f64,
}

/// One exported UV layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UvLayerData {
    pub name: String,
    pub uv_coordinates: Vec<UvCoordinate>,
}

/// Texture reference plus per-vertex UVs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UvMapping {
    pub texture_path: Option<String>,
    pub uv_layers: Vec<UvLayerData>,
}

/// Find the first image texture bound in the object's node materials
///
/// Returns an absolute path for file-backed images, or `[packed]<name>` for
/// embedded ones. Images with neither are skipped.
pub fn texture_path(materials: &[Option<Material>], blend_dir: Option<&Path>) -> Option<String> {
    materials
        .iter()
        .flatten()
        .filter(|material| material.use_nodes)
        .flat_map(|material| material.nodes.iter())
        .find_map(|node| {
            let ShaderNode::ImageTexture { image: Some(image) } = node else {
                return None;
            };
            if let Some(filepath) = image.filepath.as_deref().filter(|p| !p.is_empty()) {
                let path = resolve_image_path(filepath, blend_dir);
                Some(path.to_string_lossy().to_string())
            } else if image.packed {
                Some(format!("{PACKED_PREFIX}{}", image.name))
            } else {
                None
            }
        })
}

/// Resolve a host image path to an absolute path without touching the filesystem
pub fn resolve_image_path(filepath: &str, blend_dir: Option<&Path>) -> PathBuf {
    let current_dir = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let joined = if let Some(relative) = filepath.strip_prefix(BLEND_RELATIVE_PREFIX) {
        let base = blend_dir.map(Path::to_path_buf).unwrap_or_else(current_dir);
        base.join(relative)
    } else {
        let path = Path::new(filepath);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            current_dir().join(path)
        }
    };

    normalize_lexically(&joined)
}

/// Collapse `.` and `..` components
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Collapse per-corner UVs to one coordinate per vertex
///
/// The first corner seen for a vertex wins; seam vertices with several UVs
/// report only that one. Returns `None` when the mesh has no UV layers.
pub fn uv_mapping(mesh: &MeshData, texture_path: Option<String>) -> Option<UvMapping> {
    if mesh.uv_layers.is_empty() {
        return None;
    }

    let uv_layers = mesh
        .uv_layers
        .iter()
        .map(|layer| {
            let mut per_vertex: BTreeMap<u32, UvCoordinate> = BTreeMap::new();
            for (loop_index, vertex_index) in mesh.loop_vertices().enumerate() {
                let Some(uv) = layer.uvs.get(loop_index) else {
                    break;
                };
                per_vertex.entry(vertex_index).or_insert(UvCoordinate {
                    vertex_index,
                    u: round_to(uv.x as f64, UV_PRECISION),
                    v: round_to(uv.y as f64, UV_PRECISION),
                });
            }
            UvLayerData {
                name: layer.name.clone(),
                uv_coordinates: per_vertex.into_values().collect(),
            }
        })
        .collect();

    Some(UvMapping {
        texture_path,
        uv_layers,
    })
}

/// Full-coverage quad mapping for a rasterized stroke drawing
pub fn stroke_uv_mapping(texture_path: String) -> UvMapping {
    let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
    UvMapping {
        texture_path: Some(texture_path),
        uv_layers: vec![UvLayerData {
            name: "UVMap".to_string(),
            uv_coordinates: corners
                .iter()
                .enumerate()
                .map(|(i, &(u, v))| UvCoordinate {
                    vertex_index: i as u32,
                    u,
                    v,
                })
                .collect(),
        }],
    }
}
