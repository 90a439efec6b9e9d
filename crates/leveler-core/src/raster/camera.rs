//! Temporary orthographic capture camera

use glam::{EulerRot, Mat4, Quat, Vec3};
use uuid::Uuid;

use crate::scene::BoundingBox;

/// Frame padding around the drawing
pub const FRAME_PADDING: f32 = 1.1;

/// Largest output edge in pixels
pub const MAX_RESOLUTION: u32 = 65_536;

/// Orthographic camera created for a single capture
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureCamera {
    pub name: String,
    pub location: Vec3,
    /// XYZ Euler rotation in radians
    pub rotation_euler: Vec3,
    /// Visible extent along the larger image edge, in scene units
    pub ortho_scale: f32,
    pub clip_start: f32,
    pub clip_end: f32,
}

impl CaptureCamera {
    /// Camera looking along +Y at a world-space box, framing X and Z with padding
    pub fn framing(bounds: &BoundingBox) -> Self {
        let size = bounds.size();
        let center = bounds.center();
        let extent = size.x.max(size.z);
        let margin = extent + 1.0;

        Self {
            name: format!("__leveler_capture_{}", Uuid::new_v4().simple()),
            location: Vec3::new(center.x, bounds.min.y - margin, center.z),
            // Cameras look down local -Z; +90 degrees about X turns that to +Y
            rotation_euler: Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0),
            ortho_scale: extent * FRAME_PADDING,
            clip_start: 0.01,
            clip_end: margin + size.y + 1.0,
        }
    }

    /// Camera-to-world transform
    pub fn matrix_world(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation_euler.x,
            self.rotation_euler.y,
            self.rotation_euler.z,
        );
        Mat4::from_rotation_translation(rotation, self.location)
    }

    /// World-to-camera transform
    pub fn view_matrix(&self) -> Mat4 {
        self.matrix_world().inverse()
    }
}

/// Output size for a drawing: box extent x scale factor x multiplier, at least 1x1
pub fn capture_resolution(
    bounds: &BoundingBox,
    scale_factor: f64,
    resolution_multiplier: f64,
) -> (u32, u32) {
    let size = bounds.size();
    let pixels = |extent: f32| {
        let value = (extent as f64 * scale_factor * resolution_multiplier).round();
        if value.is_finite() {
            (value.max(1.0) as u64).min(MAX_RESOLUTION as u64) as u32
        } else {
            1
        }
    };
    (pixels(size.x), pixels(size.z))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_framing_looks_along_y() {
        let bounds = BoundingBox::new(Vec3::new(-2.0, -0.1, 0.0), Vec3::new(2.0, 0.1, 1.0));
        let camera = CaptureCamera::framing(&bounds);

        assert_relative_eq!(camera.ortho_scale, 4.4, epsilon = 1e-5);
        assert!(camera.location.y < bounds.min.y);
        assert_relative_eq!(camera.location.x, 0.0);
        assert_relative_eq!(camera.location.z, 0.5);

        let forward = camera.matrix_world().transform_vector3(Vec3::NEG_Z);
        assert!((forward - Vec3::Y).length() < 1e-5);
        let up = camera.matrix_world().transform_vector3(Vec3::Y);
        assert!((up - Vec3::Z).length() < 1e-5);

        // The far side of the box is inside the clip range
        let far = camera.view_matrix().transform_point3(Vec3::new(0.0, bounds.max.y, 0.5));
        assert!(-far.z > camera.clip_start && -far.z < camera.clip_end);
    }

    #[test]
    fn test_capture_names_are_unique() {
        let bounds = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        assert_ne!(
            CaptureCamera::framing(&bounds).name,
            CaptureCamera::framing(&bounds).name
        );
    }

    #[test]
    fn test_capture_resolution() {
        let bounds = BoundingBox::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.5));
        assert_eq!(capture_resolution(&bounds, 16.0, 10.0), (320, 80));

        let flat = BoundingBox::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(capture_resolution(&flat, 16.0, 10.0), (160, 1));

        let huge = BoundingBox::new(Vec3::ZERO, Vec3::new(1.0e6, 0.0, 1.0));
        assert_eq!(capture_resolution(&huge, 16.0, 10.0).0, MAX_RESOLUTION);
    }
}
