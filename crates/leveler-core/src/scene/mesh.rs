//! Mesh data: vertices, faces and per-corner UV layers

use glam::{Vec2, Vec3};
use serde::Deserialize;

/// A UV layer; one coordinate per face corner (loop)
#[derive(Debug, Clone, Deserialize)]
pub struct UvLayer {
    pub name: String,
    pub uvs: Vec<Vec2>,
}

/// Mesh datablock of a mesh object
#[derive(Debug, Clone, Deserialize)]
pub struct MeshData {
    /// Datablock name (shared by linked duplicates)
    pub name: String,
    /// Local-space vertex positions
    pub vertices: Vec<Vec3>,
    /// Faces as vertex indices in corner order
    #[serde(default)]
    pub faces: Vec<Vec<u32>>,
    #[serde(default)]
    pub uv_layers: Vec<UvLayer>,
}

impl MeshData {
    /// Create a mesh without UV layers
    pub fn new(name: impl Into<String>, vertices: Vec<Vec3>, faces: Vec<Vec<u32>>) -> Self {
        Self {
            name: name.into(),
            vertices,
            faces,
            uv_layers: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Vertex index of every face corner, in loop order
    pub fn loop_vertices(&self) -> impl Iterator<Item = u32> + '_ {
        self.faces.iter().flat_map(|face| face.iter().copied())
    }
}
