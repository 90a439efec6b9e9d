//! Grease-pencil rasterization
//!
//! Stroke drawings have no surface the engine can texture, so each one is
//! rendered once to a transparent PNG:
//!
//! 1. compute the drawing's world-space bounding box
//! 2. inside a [`RenderTransaction`], add an orthographic [`CaptureCamera`],
//!    hide everything else and configure a transparent RGBA PNG output
//! 3. render one still
//!
//! The transaction restores the host's configuration whether or not the render
//! succeeded.

mod camera;
mod host;
mod settings;
mod software;
mod transaction;

pub use camera::*;
pub use host::*;
pub use settings::*;
pub use software::SoftwareRenderer;
pub use transaction::RenderTransaction;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::{BoundingBox, Scene, SceneObject};

/// Rendering quality mode for stroke drawings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterMode {
    /// Unlit workbench render, no lighting or post-processing
    Flat,
    /// Default engine with a single AA sample and no temporal reprojection
    #[default]
    Standard,
}

/// Parameters for one capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub scale_factor: f64,
    pub resolution_multiplier: f64,
    pub mode: RasterMode,
}

/// Per-object rasterization failure
#[derive(Debug, Clone, Error)]
pub enum RasterError {
    #[error("Bounding box of '{0}' is not finite")]
    InvalidBounds(String),
    #[error("Nothing to render: '{0}' has no extent")]
    EmptyBounds(String),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A rendered drawing
#[derive(Debug, Clone)]
pub struct RasterOutput {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// World-space axis-aligned box around an object's local bounding box
pub fn world_bounds(scene: &Scene, object: &SceneObject) -> Result<BoundingBox, RasterError> {
    let bounds = object.local_bounds().transform(&scene.world_matrix(object));
    if !bounds.is_finite() {
        return Err(RasterError::InvalidBounds(object.name.clone()));
    }
    let size = bounds.size();
    if size.x <= 0.0 && size.z <= 0.0 {
        return Err(RasterError::EmptyBounds(object.name.clone()));
    }
    Ok(bounds)
}

/// Render a stroke object to a transparent PNG at `output`
pub fn rasterize<H: RenderHost + ?Sized>(
    host: &mut H,
    scene: &Scene,
    object: &SceneObject,
    output: &Path,
    options: &RasterOptions,
) -> Result<RasterOutput, RasterError> {
    let bounds = world_bounds(scene, object)?;
    let camera = CaptureCamera::framing(&bounds);
    let (width, height) =
        capture_resolution(&bounds, options.scale_factor, options.resolution_multiplier);

    tracing::debug!(
        "Rasterizing '{}' at {}x{} ({:?})",
        object.name,
        width,
        height,
        options.mode
    );

    let mut transaction = RenderTransaction::begin(host);
    transaction.add_camera(&camera)?;
    transaction.isolate(&[object.name.as_str(), camera.name.as_str()]);
    transaction.configure(|settings| {
        settings.camera = Some(camera.name.clone());
        settings.filepath = output.to_path_buf();
        settings.file_format = ImageFormat::Png;
        settings.color_mode = ColorMode::Rgba;
        settings.film_transparent = true;
        settings.resolution_x = width;
        settings.resolution_y = height;
        settings.resolution_percentage = 100;
        match options.mode {
            RasterMode::Flat => {
                settings.engine = RenderEngine::Workbench;
                settings.shading.light = Lighting::Flat;
                settings.shading.color_type = ShadingColor::Material;
            }
            RasterMode::Standard => {
                settings.engine = RenderEngine::Eevee;
                settings.taa_render_samples = 1;
                settings.use_taa_reprojection = false;
            }
        }
    });
    transaction.render()?;

    Ok(RasterOutput {
        path: output.to_path_buf(),
        width,
        height,
    })
}
