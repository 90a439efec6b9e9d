//! Scoped render configuration changes
//!
//! [`RenderTransaction`] snapshots the host's render settings and every
//! object's render visibility when it begins, and puts them back when it is
//! dropped. Dropping covers early returns, `?` propagation and unwinding, so
//! teardown cannot be skipped.

use super::{CaptureCamera, RenderError, RenderHost, RenderSettings};

/// Exclusive, self-restoring access to a host's render configuration
pub struct RenderTransaction<'h, H: RenderHost + ?Sized> {
    host: &'h mut H,
    saved_settings: RenderSettings,
    saved_visibility: Vec<(String, bool)>,
    camera: Option<String>,
}

impl<'h, H: RenderHost + ?Sized> RenderTransaction<'h, H> {
    /// Snapshot the current configuration
    pub fn begin(host: &'h mut H) -> Self {
        let saved_settings = host.render_settings();
        let saved_visibility = host.render_visibility();
        tracing::trace!(
            "Render snapshot taken ({} visibility flags)",
            saved_visibility.len()
        );
        Self {
            host,
            saved_settings,
            saved_visibility,
            camera: None,
        }
    }

    /// Create the capture camera; it is deleted again on teardown
    pub fn add_camera(&mut self, camera: &CaptureCamera) -> Result<(), RenderError> {
        self.host.add_camera(camera)?;
        self.camera = Some(camera.name.clone());
        Ok(())
    }

    /// Hide every object from render except the named ones
    pub fn isolate(&mut self, visible: &[&str]) {
        for (name, _) in self.host.render_visibility() {
            let hidden = !visible.contains(&name.as_str());
            self.host.set_hide_render(&name, hidden);
        }
    }

    /// Edit the live render settings
    pub fn configure(&mut self, edit: impl FnOnce(&mut RenderSettings)) {
        let mut settings = self.host.render_settings();
        edit(&mut settings);
        self.host.apply_render_settings(&settings);
    }

    /// Render one still with the current configuration
    pub fn render(&mut self) -> Result<(), RenderError> {
        self.host.render_still()
    }
}

impl<H: RenderHost + ?Sized> Drop for RenderTransaction<'_, H> {
    fn drop(&mut self) {
        if let Some(camera) = self.camera.take() {
            self.host.remove_camera(&camera);
        }
        self.host.apply_render_settings(&self.saved_settings);
        for (name, hidden) in &self.saved_visibility {
            self.host.set_hide_render(name, *hidden);
        }
        tracing::trace!("Render configuration restored");
    }
}
