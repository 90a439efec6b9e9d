//! Authoring space to engine space mapping
//!
//! Authoring X stays engine X. The authoring up axis becomes engine Y with its
//! sign flipped (engine Y grows downward). Authoring depth is dropped.

use glam::Vec3;
use serde::Serialize;

use crate::scene::{BoundingBox, SceneObject};

/// Decimal places for positions, scales, dimensions, rotation and origin offsets
pub const TRANSFORM_PRECISION: i32 = 4;

/// Axis values closer than this are treated as equal when detecting the up axis
const AXIS_TIE_EPSILON: f32 = 1e-6;

/// Round to a fixed number of decimal places, normalizing negative zero
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// 2D vector as written to the level file
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both components rounded to `places`
    pub fn rounded(x: f64, y: f64, places: i32) -> Self {
        Self {
            x: round_to(x, places),
            y: round_to(y, places),
        }
    }
}

/// Which authoring axis an object was drawn against as "up"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpAxis {
    Y,
    Z,
}

impl UpAxis {
    /// Pick the axis with the larger extent; Z wins ties
    pub fn detect(y_extent: f32, z_extent: f32) -> Self {
        if y_extent > z_extent + AXIS_TIE_EPSILON {
            UpAxis::Y
        } else {
            UpAxis::Z
        }
    }

    /// Detect from a bounding box
    pub fn detect_bounds(bounds: &BoundingBox) -> Self {
        let size = bounds.size();
        Self::detect(size.y, size.z)
    }

    /// The up component of a vector
    pub fn component(&self, v: Vec3) -> f32 {
        match self {
            UpAxis::Y => v.y,
            UpAxis::Z => v.z,
        }
    }
}

/// Engine-space transform of one object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedTransform {
    pub position: Point2,
    pub scale: Point2,
    pub dimensions: Point2,
    /// Degrees
    pub rotation: f64,
}

/// Map an authoring transform into engine space
///
/// `scale` is the object's own scale channel so negative (flipped) scales survive.
pub fn map_transform(
    translation: Vec3,
    rotation_euler: Vec3,
    scale: Vec3,
    dimensions: Vec3,
    scale_factor: f64,
) -> MappedTransform {
    let p = TRANSFORM_PRECISION;
    MappedTransform {
        position: Point2::rounded(
            translation.x as f64 * scale_factor,
            -(translation.z as f64) * scale_factor,
            p,
        ),
        scale: Point2::rounded(scale.x as f64, scale.z as f64, p),
        dimensions: Point2::rounded(
            dimensions.x as f64 * scale_factor,
            dimensions.z as f64 * scale_factor,
            p,
        ),
        // Spin within the X/Z plane is rotation about the dropped Y axis
        rotation: round_to((rotation_euler.y as f64).to_degrees(), p),
    }
}

/// Map a scene object, using its parent-relative translation
pub fn map_object(object: &SceneObject, scale_factor: f64) -> MappedTransform {
    let translation = object.matrix_local().w_axis.truncate();
    map_transform(
        translation,
        object.rotation_euler,
        object.scale,
        object.dimensions(),
        scale_factor,
    )
}

/// Normalized position of the local origin inside the bounding box
///
/// Measured from the bottom-left corner in authoring orientation. An axis with
/// no extent falls back to the centre (0.5).
pub fn origin_offset(bounds: &BoundingBox) -> Point2 {
    let up = UpAxis::detect_bounds(bounds);
    let normalized = |min: f32, max: f32| {
        let extent = (max - min) as f64;
        if extent.abs() <= f64::EPSILON {
            0.5
        } else {
            -(min as f64) / extent
        }
    };
    Point2::rounded(
        normalized(bounds.min.x, bounds.max.x),
        normalized(up.component(bounds.min), up.component(bounds.max)),
        TRANSFORM_PRECISION,
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::scene::ObjectKind;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(-0.00001, 4), 0.0);
        assert!(round_to(-0.00001, 4).is_sign_positive());
        assert_eq!(round_to(2.345678, 2), 2.35);
    }

    #[test]
    fn test_map_transform_axes() {
        let mapped = map_transform(
            Vec3::new(1.0, 7.0, 2.0),
            Vec3::new(0.3, std::f32::consts::FRAC_PI_2, 0.1),
            Vec3::new(-1.0, 3.0, 2.0),
            Vec3::new(2.0, 9.0, 0.5),
            16.0,
        );

        assert_eq!(mapped.position, Point2::new(16.0, -32.0));
        // Negative scale is preserved, depth scale ignored
        assert_eq!(mapped.scale, Point2::new(-1.0, 2.0));
        assert_eq!(mapped.dimensions, Point2::new(32.0, 8.0));
        assert_relative_eq!(mapped.rotation, 90.0);
    }

    #[test]
    fn test_map_object_uses_local_translation() {
        let mut object = SceneObject::new("Child", ObjectKind::Empty);
        object.location = Vec3::new(0.5, 0.0, -0.25);
        object.scale = Vec3::new(-1.0, 1.0, 1.0);

        let mapped = map_object(&object, 16.0);
        assert_eq!(mapped.position, Point2::new(8.0, 4.0));
        assert_eq!(mapped.scale, Point2::new(-1.0, 1.0));
        assert_eq!(mapped.rotation, 0.0);
    }

    #[test]
    fn test_origin_offset() {
        // Origin at the bottom-left of a standing quad
        let bounds = BoundingBox::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 1.0));
        assert_eq!(origin_offset(&bounds), Point2::new(0.0, 0.0));

        // Centered quad lying in the X/Y plane
        let bounds = BoundingBox::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 3.0, 0.0));
        assert_eq!(origin_offset(&bounds), Point2::new(0.5, 0.25));
    }

    #[test]
    fn test_origin_offset_degenerate() {
        let bounds = BoundingBox::default();
        assert_eq!(origin_offset(&bounds), Point2::new(0.5, 0.5));
    }

    #[test]
    fn test_up_axis_tie_prefers_z() {
        assert_eq!(UpAxis::detect(1.0, 1.0), UpAxis::Z);
        assert_eq!(UpAxis::detect(1.0, 0.5), UpAxis::Y);
        assert_eq!(UpAxis::detect(0.0, 0.5), UpAxis::Z);
    }
}
