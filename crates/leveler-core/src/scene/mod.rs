//! Read-only scene model
//!
//! Mirrors the parts of the authoring tool's object model the exporter reads:
//! objects with transforms, mesh/material/stroke data, and the collection tree.
//! Scenes are loaded from a JSON dump produced on the host side.

mod bounds;
mod collection;
mod material;
mod mesh;
mod property;
mod transforms;

pub use bounds::*;
pub use collection::*;
pub use material::*;
pub use mesh::*;
pub use property::*;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use serde::Deserialize;
use thiserror::Error;

use crate::raster::RenderSettings;

/// Object category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectKind {
    Mesh,
    Camera,
    Light,
    Empty,
    #[serde(alias = "GPENCIL", alias = "GREASE_PENCIL")]
    GreasePencil,
    /// Armatures, curves, text and anything else the exporter ignores
    #[serde(other)]
    Unsupported,
}

impl ObjectKind {
    /// Type string written to the level file
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::Mesh => "MESH",
            ObjectKind::Camera => "CAMERA",
            ObjectKind::Light => "LIGHT",
            ObjectKind::Empty => "EMPTY",
            ObjectKind::GreasePencil => "GREASEPENCIL",
            ObjectKind::Unsupported => "UNSUPPORTED",
        }
    }

    /// Objects handled by direct extraction (no rendering)
    pub fn is_regular(&self) -> bool {
        matches!(
            self,
            ObjectKind::Mesh | ObjectKind::Camera | ObjectKind::Light | ObjectKind::Empty
        )
    }

    /// Stroke drawings that must be rasterized before export
    pub fn is_stroke(&self) -> bool {
        matches!(self, ObjectKind::GreasePencil)
    }
}

/// Camera projection type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Projection {
    #[default]
    #[serde(alias = "PERSP")]
    Perspective,
    #[serde(alias = "ORTHO")]
    Orthographic,
}

/// Camera data attached to a camera object
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CameraData {
    #[serde(default)]
    pub projection: Projection,
    /// Visible width in scene units for orthographic cameras
    #[serde(default = "default_ortho_scale")]
    pub ortho_scale: f32,
}

fn default_ortho_scale() -> f32 {
    6.0
}

/// A single freehand stroke of a grease-pencil drawing
#[derive(Debug, Clone, Deserialize)]
pub struct Stroke {
    /// Points in object-local space
    pub points: Vec<Vec3>,
    /// Stroke radius in scene units
    #[serde(default = "default_stroke_radius")]
    pub radius: f32,
    /// RGBA color in 0..1
    #[serde(default = "default_stroke_color")]
    pub color: [f32; 4],
}

fn default_stroke_radius() -> f32 {
    0.02
}

fn default_stroke_color() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

/// An object in the authoring scene
#[derive(Debug, Clone, Deserialize)]
pub struct SceneObject {
    /// Name, unique within the scene
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    #[serde(default)]
    pub location: Vec3,
    /// XYZ Euler rotation in radians
    #[serde(default)]
    pub rotation_euler: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    /// Bounding box size including scale; derived from the local box when absent
    #[serde(default)]
    pub dimensions: Option<Vec3>,
    /// Inverse of the parent's world matrix at parenting time
    #[serde(default)]
    pub parent_inverse: Mat4,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub hide_render: bool,
    /// Eight local-space bounding box corners
    #[serde(default)]
    pub bound_box: Option<[Vec3; 8]>,
    #[serde(default)]
    pub mesh: Option<MeshData>,
    /// Material slots; empty slots are `None`
    #[serde(default)]
    pub materials: Vec<Option<Material>>,
    #[serde(default)]
    pub camera: Option<CameraData>,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    #[serde(default)]
    pub properties: PropertyBag,
}

impl SceneObject {
    /// Create an object with identity transform and no data
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            location: Vec3::ZERO,
            rotation_euler: Vec3::ZERO,
            scale: Vec3::ONE,
            dimensions: None,
            parent_inverse: Mat4::IDENTITY,
            parent: None,
            selected: false,
            hide_render: false,
            bound_box: None,
            mesh: None,
            materials: Vec::new(),
            camera: None,
            strokes: Vec::new(),
            properties: PropertyBag::new(),
        }
    }

    /// Local bounding box, from the host's corners or derived from geometry
    pub fn local_bounds(&self) -> BoundingBox {
        if let Some(corners) = &self.bound_box {
            return BoundingBox::from_points(corners.iter().copied()).unwrap_or_default();
        }
        if let Some(mesh) = &self.mesh
            && let Some(bounds) = BoundingBox::from_points(mesh.vertices.iter().copied())
        {
            return bounds;
        }
        BoundingBox::from_points(self.strokes.iter().flat_map(|s| s.points.iter().copied()))
            .unwrap_or_default()
    }

    /// Bounding box size with the object's scale applied
    pub fn dimensions(&self) -> Vec3 {
        self.dimensions
            .unwrap_or_else(|| self.local_bounds().size() * self.scale.abs())
    }
}

/// Scene loading errors
#[derive(Debug, Clone, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Duplicate object name: {0}")]
    DuplicateObject(String),
}

/// On-disk scene dump layout
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneFile {
    #[serde(default)]
    application: Option<String>,
    #[serde(default)]
    blend_path: Option<PathBuf>,
    #[serde(default)]
    objects: Vec<SceneObject>,
    #[serde(default)]
    collections: Vec<Collection>,
    #[serde(default)]
    render: RenderSettings,
}

/// The authoring scene: objects plus the collection tree under the implicit root
#[derive(Debug, Clone)]
pub struct Scene {
    /// Host identification written as `exportedFrom`
    pub application: String,
    /// Authoring file, anchors `//`-relative image paths
    pub blend_path: Option<PathBuf>,
    /// Direct children of the implicit root collection
    pub collections: Vec<Collection>,
    /// Render settings stored with the scene
    pub render: RenderSettings,
    objects: Vec<SceneObject>,
    name_index: HashMap<String, usize>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(default_application())
    }
}

fn default_application() -> String {
    format!("leveler {}", crate::VERSION)
}

impl Scene {
    /// Create an empty scene
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            blend_path: None,
            collections: Vec::new(),
            render: RenderSettings::default(),
            objects: Vec::new(),
            name_index: HashMap::new(),
        }
    }

    /// Load a scene dump from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SceneError::Io(e.to_string()))?;
        let scene = Self::from_json_str(&content)?;
        tracing::debug!("Loaded {} objects from {:?}", scene.objects.len(), path);
        Ok(scene)
    }

    /// Parse a scene dump from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, SceneError> {
        let file: SceneFile =
            serde_json::from_str(content).map_err(|e| SceneError::Parse(e.to_string()))?;

        let mut scene = Self::new(file.application.unwrap_or_else(default_application));
        scene.blend_path = file.blend_path;
        scene.collections = file.collections;
        scene.render = file.render;
        for object in file.objects {
            scene.add_object(object)?;
        }
        Ok(scene)
    }

    /// Add an object; names must be unique
    pub fn add_object(&mut self, object: SceneObject) -> Result<(), SceneError> {
        if self.name_index.contains_key(&object.name) {
            return Err(SceneError::DuplicateObject(object.name));
        }
        self.name_index
            .insert(object.name.clone(), self.objects.len());
        self.objects.push(object);
        Ok(())
    }

    /// Look up an object by name
    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.name_index.get(name).map(|&i| &self.objects[i])
    }

    /// All objects in authoring order
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the scene has no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_scene() {
        let json = r#"{
            "application": "Blender 5.0.0",
            "objects": [
                { "name": "Floor", "type": "MESH", "location": [1.0, 0.0, 2.0] },
                { "name": "Sketch", "type": "GPENCIL" },
                { "name": "Rig", "type": "ARMATURE" }
            ]
        }"#;

        let scene = Scene::from_json_str(json).unwrap();
        assert_eq!(scene.application, "Blender 5.0.0");
        assert_eq!(scene.len(), 3);

        let floor = scene.object("Floor").unwrap();
        assert_eq!(floor.kind, ObjectKind::Mesh);
        assert_eq!(floor.location, Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(floor.scale, Vec3::ONE);
        assert_eq!(floor.parent_inverse, Mat4::IDENTITY);

        assert_eq!(scene.object("Sketch").unwrap().kind, ObjectKind::GreasePencil);
        assert_eq!(scene.object("Rig").unwrap().kind, ObjectKind::Unsupported);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut scene = Scene::default();
        scene.add_object(SceneObject::new("A", ObjectKind::Empty)).unwrap();
        let result = scene.add_object(SceneObject::new("A", ObjectKind::Mesh));
        assert!(matches!(result, Err(SceneError::DuplicateObject(name)) if name == "A"));
    }

    #[test]
    fn test_dimensions_derived_from_mesh() {
        let mut object = SceneObject::new("Quad", ObjectKind::Mesh);
        object.mesh = Some(MeshData::new(
            "Plane",
            vec![
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(-1.0, 0.0, 1.0),
            ],
            vec![vec![0, 1, 2, 3]],
        ));
        object.scale = Vec3::new(-2.0, 1.0, 0.5);

        assert_eq!(object.dimensions(), Vec3::new(4.0, 0.0, 1.0));
    }

    #[test]
    fn test_unusual_properties_do_not_reject_scene() {
        for odd in ["[true, false]", r#"["a", "b"]"#, "null", "[[1.0, 2.0]]"] {
            let json = format!(
                r#"{{ "objects": [ {{ "name": "Goblin", "type": "EMPTY",
                     "properties": {{ "odd": {odd}, "health": 100 }} }} ] }}"#
            );
            let scene = Scene::from_json_str(&json).unwrap();
            let exported = crate::properties::object_properties(scene.object("Goblin").unwrap());
            assert_eq!(exported["health"], serde_json::json!(100), "{odd}");
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Scene::from_json_str("{ not json"),
            Err(SceneError::Parse(_))
        ));
    }
}
