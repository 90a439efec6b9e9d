//! Mesh classification and collider polygon extraction

use std::collections::HashSet;

use glam::{Mat4, Vec3};

use crate::mapping::{Point2, UpAxis, round_to};
use crate::scene::{BoundingBox, MeshData};

/// Decimal places for collider polygon vertices
pub const POLYGON_PRECISION: i32 = 2;

/// Classify a mesh as `plane`, `cube`, or its own datablock name
pub fn mesh_type(mesh: &MeshData) -> String {
    let vertex_count = mesh.vertex_count();
    let face_count = mesh.face_count();

    // One quad or two triangles
    if vertex_count == 4 && face_count <= 2 {
        return "plane".to_string();
    }

    // Six quads or twelve triangles
    if vertex_count == 8 && matches!(face_count, 6 | 12) {
        return "cube".to_string();
    }

    mesh.name.clone()
}

/// Derive an ordered 2D collider polygon from local-space mesh vertices
///
/// Vertices are moved into parent-local space with `matrix_local`, projected onto
/// the plane spanned by X and the detected up axis, scaled, rounded and
/// deduplicated. The unique points are ordered by angle around their centroid so
/// the result does not depend on the mesh's vertex order. Returns `None` when
/// fewer than three unique points remain.
pub fn collider_polygon(
    vertices: &[Vec3],
    matrix_local: &Mat4,
    scale_factor: f64,
) -> Option<Vec<Point2>> {
    let transformed: Vec<Vec3> = vertices
        .iter()
        .map(|v| matrix_local.transform_point3(*v))
        .collect();

    let bounds = BoundingBox::from_points(transformed.iter().copied())?;
    let up = UpAxis::detect_bounds(&bounds);

    let mut seen: HashSet<(u64, u64)> = HashSet::new();
    let mut points: Vec<Point2> = Vec::new();
    for v in &transformed {
        let point = Point2::new(
            round_to(v.x as f64 * scale_factor, POLYGON_PRECISION),
            round_to(-(up.component(*v) as f64) * scale_factor, POLYGON_PRECISION),
        );
        if seen.insert((point.x.to_bits(), point.y.to_bits())) {
            points.push(point);
        }
    }

    if points.len() < 3 {
        return None;
    }

    sort_by_angle(&mut points);
    Some(points)
}

/// Sort points by ascending `atan2(dy, dx)` around their centroid
fn sort_by_angle(points: &mut [Point2]) {
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;

    let key = |p: &Point2| {
        let dx = p.x - cx;
        let dy = p.y - cy;
        (dy.atan2(dx), dx * dx + dy * dy)
    };

    points.sort_by(|a, b| {
        let (angle_a, dist_a) = key(a);
        let (angle_b, dist_b) = key(b);
        angle_a
            .total_cmp(&angle_b)
            .then_with(|| dist_a.total_cmp(&dist_b))
            .then_with(|| a.x.total_cmp(&b.x))
            .then_with(|| a.y.total_cmp(&b.y))
    });
}
