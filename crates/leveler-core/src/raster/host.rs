//! Render invocation capability of the host application

use thiserror::Error;

use super::{CaptureCamera, RenderSettings};

/// Errors raised by a render host
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("No active camera")]
    NoCamera,
    #[error("Camera not found: {0}")]
    CameraNotFound(String),
    #[error("Object name already in use: {0}")]
    NameInUse(String),
    #[error("Unsupported output: {0}")]
    Unsupported(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Render failed: {0}")]
    Failed(String),
}

/// Global render state and the still-render call
///
/// Implementations mutate process-wide host state; callers must hold the host
/// exclusively for the whole configure/render/restore sequence, which `&mut`
/// access enforces.
pub trait RenderHost {
    /// Current values of every field in [`RenderSettings`]
    fn render_settings(&self) -> RenderSettings;

    /// Overwrite every field in [`RenderSettings`]
    fn apply_render_settings(&mut self, settings: &RenderSettings);

    /// `(object name, hidden from render)` for every object, cameras included
    fn render_visibility(&self) -> Vec<(String, bool)>;

    /// Set an object's render visibility flag; unknown names are ignored
    fn set_hide_render(&mut self, object: &str, hidden: bool);

    /// Create a camera object with its own camera data
    fn add_camera(&mut self, camera: &CaptureCamera) -> Result<(), RenderError>;

    /// Delete a camera object created by [`RenderHost::add_camera`] and its data
    fn remove_camera(&mut self, name: &str);

    /// Render one still image synchronously to `render_settings().filepath`
    fn render_still(&mut self) -> Result<(), RenderError>;
}
