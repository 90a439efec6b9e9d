//! Level export assembly
//!
//! Runs every exportable object through the coordinate, geometry, surface,
//! property and hierarchy stages, renders grease-pencil drawings through a
//! [`RenderHost`], and writes the sorted document in one atomic step.
//!
//! A drawing that fails to render is left out with a warning; only option
//! validation and the final write fail the run.

mod document;

pub use document::*;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{ConfigError, ExportOptions};
use crate::geometry::{collider_polygon, mesh_type};
use crate::hierarchy::{collection_hierarchy, memberships};
use crate::mapping::{map_object, origin_offset};
use crate::properties::object_properties;
use crate::raster::{RasterOptions, RenderHost, rasterize};
use crate::scene::{ObjectKind, Scene, SceneObject};
use crate::surface::{resolve_image_path, stroke_uv_mapping, texture_path, uv_mapping};

/// Run-level export failures
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error(transparent)]
    InvalidOptions(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub output_path: PathBuf,
    pub object_count: usize,
    /// PNG files written for grease-pencil drawings
    pub rasterized: Vec<PathBuf>,
    /// Per-object problems that did not stop the run
    pub warnings: Vec<String>,
}

/// Export the scene to `options.output_path`
pub fn export_level<H: RenderHost + ?Sized>(
    scene: &Scene,
    host: &mut H,
    options: &ExportOptions,
) -> Result<ExportReport, ExportError> {
    options.validate()?;

    let output_dir = match options.output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let raster_dir = output_dir.join(&options.raster_subfolder);
    let blend_dir = scene.blend_path.as_deref().and_then(Path::parent);
    let raster_options = RasterOptions {
        scale_factor: options.scale_factor,
        resolution_multiplier: options.raster_resolution,
        mode: options.raster_mode,
    };

    let mut report = ExportReport {
        output_path: options.output_path.clone(),
        ..Default::default()
    };
    let mut objects = Vec::new();
    let mut slugs = SlugSet::default();

    for object in scene.objects() {
        if options.selected_only && !object.selected {
            continue;
        }
        if object.kind.is_regular() {
            tracing::debug!("Exporting {} '{}'", object.kind.type_name(), object.name);
            objects.push(build_object(scene, object, options.scale_factor, blend_dir));
            continue;
        }
        if !object.kind.is_stroke() {
            tracing::debug!("Skipping unsupported object '{}'", object.name);
            continue;
        }
        if !options.rasterize_strokes {
            tracing::debug!("Rasterization disabled, skipping '{}'", object.name);
            continue;
        }

        let png_path = raster_dir.join(format!("{}.png", slugs.claim(&object.name)));
        let rendered = match std::fs::create_dir_all(&raster_dir) {
            Ok(()) => rasterize(&mut *host, scene, object, &png_path, &raster_options)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match rendered {
            Ok(output) => {
                tracing::debug!(
                    "Rasterized '{}' to {:?} ({}x{})",
                    object.name,
                    output.path,
                    output.width,
                    output.height
                );
                let absolute = resolve_image_path(&output.path.to_string_lossy(), None);
                let mut record = build_object(scene, object, options.scale_factor, blend_dir);
                record.mesh_type = Some("plane".to_string());
                record.uv_mapping = Some(stroke_uv_mapping(absolute.to_string_lossy().to_string()));
                objects.push(record);
                report.rasterized.push(output.path);
            }
            Err(e) => {
                tracing::warn!("Failed to rasterize '{}': {}", object.name, e);
                report
                    .warnings
                    .push(format!("Failed to rasterize '{}': {}", object.name, e));
            }
        }
    }

    // Stable: equal names keep scene order
    objects.sort_by(|a, b| a.name.cmp(&b.name));
    report.object_count = objects.len();

    let document = ExportDocument {
        version: FORMAT_VERSION.to_string(),
        exported_from: scene.application.clone(),
        scale_factor: options.scale_factor,
        collection_hierarchy: collection_hierarchy(&scene.collections),
        objects,
    };
    let json = document
        .to_json_string()
        .map_err(|e| ExportError::Serialize(e.to_string()))?;
    write_atomic(&options.output_path, json.as_bytes())?;

    tracing::info!(
        "Exported {} objects to {:?} ({} rasterized, {} warnings)",
        report.object_count,
        report.output_path,
        report.rasterized.len(),
        report.warnings.len()
    );
    Ok(report)
}

/// Per-object record shared by regular objects and rendered drawings
fn build_object(
    scene: &Scene,
    object: &SceneObject,
    scale_factor: f64,
    blend_dir: Option<&Path>,
) -> ExportedObject {
    let transform = map_object(object, scale_factor);
    let membership = memberships(&scene.collections, &object.name);
    let mesh = object
        .mesh
        .as_ref()
        .filter(|_| object.kind == ObjectKind::Mesh);

    ExportedObject {
        name: object.name.clone(),
        kind: object.kind.type_name().to_string(),
        parent: scene.parent_of(object).map(|p| p.name.clone()),
        collections: membership.names,
        collection_properties: membership.properties,
        mesh_type: mesh.map(mesh_type),
        position: transform.position,
        dimensions: transform.dimensions,
        scale: transform.scale,
        rotation: transform.rotation,
        origin_offset: origin_offset(&object.local_bounds()),
        custom_properties: object_properties(object),
        vertices: mesh.and_then(|m| {
            collider_polygon(&m.vertices, &object.matrix_local(), scale_factor)
        }),
        uv_mapping: mesh.and_then(|m| {
            uv_mapping(m, texture_path(&object.materials, blend_dir))
        }),
    }
}

/// File name stem for an object: `[A-Za-z0-9._-]` kept, anything else `_`
pub fn sanitize_name(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if slug.is_empty() || slug.chars().all(|c| c == '.') {
        "object".to_string()
    } else {
        slug
    }
}

/// Hands out unique slugs within one run
#[derive(Default)]
struct SlugSet {
    used: HashSet<String>,
}

impl SlugSet {
    fn claim(&mut self, name: &str) -> String {
        let base = sanitize_name(name);
        let mut slug = base.clone();
        let mut n = 2;
        while !self.used.insert(slug.clone()) {
            slug = format!("{base}_{n}");
            n += 1;
        }
        slug
    }
}

/// Write through a sibling temp file and rename over the target
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::Io(e.to_string()))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| ExportError::Io(format!("{:?} is not a file path", path)))?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    std::fs::write(&temp_path, contents).map_err(|e| ExportError::Io(e.to_string()))?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        std::fs::remove_file(&temp_path).ok();
        return Err(ExportError::Io(e.to_string()));
    }
    Ok(())
}
