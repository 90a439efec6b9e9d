//! CPU render host over a loaded [`Scene`]
//!
//! Draws the visible grease-pencil strokes through an orthographic capture
//! camera into an RGBA image. Strokes are stamped as round-capped segments.

use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3};
use image::{ImageBuffer, Rgba, RgbaImage};

use super::{
    CaptureCamera, ColorMode, ImageFormat, RenderEngine, RenderError, RenderHost, RenderSettings,
};
use crate::scene::{ObjectKind, Scene};

/// Background for renders without transparent film
const WORLD_COLOR: [u8; 4] = [64, 64, 64, 255];

/// Smallest stroke radius in pixels
const MIN_RADIUS_PX: f32 = 0.5;

/// Largest image the renderer allocates (1 GiB of RGBA)
const MAX_PIXELS: u64 = 1 << 28;

/// Software implementation of [`RenderHost`]
pub struct SoftwareRenderer<'s> {
    scene: &'s Scene,
    settings: RenderSettings,
    hidden: HashMap<String, bool>,
    cameras: Vec<CaptureCamera>,
    render_count: usize,
}

impl<'s> SoftwareRenderer<'s> {
    /// Start from the scene's stored render settings and visibility flags
    pub fn new(scene: &'s Scene) -> Self {
        Self {
            scene,
            settings: scene.render.clone(),
            hidden: scene
                .objects()
                .map(|o| (o.name.clone(), o.hide_render))
                .collect(),
            cameras: Vec::new(),
            render_count: 0,
        }
    }

    /// Number of stills rendered so far
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    /// Number of capture cameras currently alive
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    fn is_hidden(&self, name: &str) -> bool {
        self.hidden.get(name).copied().unwrap_or(true)
    }

    /// Rasterize all visible strokes into a new image
    fn draw(&self, camera: &CaptureCamera) -> Result<RgbaImage, RenderError> {
        let (width, height) = self.settings.output_size();
        if width as u64 * height as u64 > MAX_PIXELS {
            return Err(RenderError::Failed(format!(
                "{width}x{height} image exceeds {MAX_PIXELS} pixels"
            )));
        }
        let transparent =
            self.settings.film_transparent && self.settings.color_mode == ColorMode::Rgba;
        let background = if transparent {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba(WORLD_COLOR)
        };
        let mut image: RgbaImage = ImageBuffer::from_pixel(width, height, background);

        // Orthographic scale covers the larger image edge
        let pixel_size = camera.ortho_scale / width.max(height) as f32;
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(RenderError::Failed(format!(
                "degenerate camera '{}' (ortho scale {})",
                camera.name, camera.ortho_scale
            )));
        }

        // Workbench flat shading draws hard edges
        let antialias = self.settings.engine != RenderEngine::Workbench;
        let view = camera.view_matrix();
        let half = Vec2::new(width as f32, height as f32) * 0.5;

        for object in self.scene.objects() {
            if object.kind != ObjectKind::GreasePencil || self.is_hidden(&object.name) {
                continue;
            }
            let to_view: Mat4 = view * self.scene.world_matrix(object);
            let radius_scale = object.scale.abs().max_element();

            for stroke in &object.strokes {
                let projected: Vec<Vec2> = stroke
                    .points
                    .iter()
                    .filter_map(|p| {
                        let v: Vec3 = to_view.transform_point3(*p);
                        let depth = -v.z;
                        (depth >= camera.clip_start && depth <= camera.clip_end).then(|| {
                            Vec2::new(half.x + v.x / pixel_size, half.y - v.y / pixel_size)
                        })
                    })
                    .collect();

                let radius = (stroke.radius * radius_scale / pixel_size).max(MIN_RADIUS_PX);
                let color = stroke.color.map(|c| c.clamp(0.0, 1.0));
                match projected.as_slice() {
                    [] => {}
                    [single] => stamp_segment(&mut image, *single, *single, radius, color, antialias),
                    points => {
                        for pair in points.windows(2) {
                            stamp_segment(&mut image, pair[0], pair[1], radius, color, antialias);
                        }
                    }
                }
            }
        }

        Ok(image)
    }
}

/// Blend a round-capped segment into the image
fn stamp_segment(
    image: &mut RgbaImage,
    a: Vec2,
    b: Vec2,
    radius: f32,
    color: [f32; 4],
    antialias: bool,
) {
    let reach = radius + 1.0;
    let min = a.min(b) - Vec2::splat(reach);
    let max = a.max(b) + Vec2::splat(reach);
    let (width, height) = image.dimensions();

    let x0 = min.x.floor().max(0.0) as u32;
    let y0 = min.y.floor().max(0.0) as u32;
    let x1 = (max.x.ceil().max(0.0) as u32).min(width);
    let y1 = (max.y.ceil().max(0.0) as u32).min(height);

    for y in y0..y1 {
        for x in x0..x1 {
            let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let distance = distance_to_segment(center, a, b);
            let coverage = if antialias {
                (radius + 0.5 - distance).clamp(0.0, 1.0)
            } else if distance <= radius {
                1.0
            } else {
                0.0
            };
            if coverage > 0.0 {
                blend(image.get_pixel_mut(x, y), color, coverage);
            }
        }
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Source-over compositing in 0..1 space
fn blend(pixel: &mut Rgba<u8>, color: [f32; 4], coverage: f32) {
    let src_alpha = color[3] * coverage;
    let dst = pixel.0.map(|c| c as f32 / 255.0);
    let out_alpha = src_alpha + dst[3] * (1.0 - src_alpha);
    if out_alpha <= 0.0 {
        return;
    }
    for i in 0..3 {
        let value = (color[i] * src_alpha + dst[i] * dst[3] * (1.0 - src_alpha)) / out_alpha;
        pixel.0[i] = (value * 255.0).round() as u8;
    }
    pixel.0[3] = (out_alpha * 255.0).round() as u8;
}

impl RenderHost for SoftwareRenderer<'_> {
    fn render_settings(&self) -> RenderSettings {
        self.settings.clone()
    }

    fn apply_render_settings(&mut self, settings: &RenderSettings) {
        self.settings = settings.clone();
    }

    fn render_visibility(&self) -> Vec<(String, bool)> {
        self.scene
            .objects()
            .map(|o| o.name.as_str())
            .chain(self.cameras.iter().map(|c| c.name.as_str()))
            .map(|name| (name.to_string(), self.is_hidden(name)))
            .collect()
    }

    fn set_hide_render(&mut self, object: &str, hidden: bool) {
        if let Some(flag) = self.hidden.get_mut(object) {
            *flag = hidden;
        }
    }

    fn add_camera(&mut self, camera: &CaptureCamera) -> Result<(), RenderError> {
        if self.hidden.contains_key(&camera.name) {
            return Err(RenderError::NameInUse(camera.name.clone()));
        }
        self.hidden.insert(camera.name.clone(), false);
        self.cameras.push(camera.clone());
        Ok(())
    }

    fn remove_camera(&mut self, name: &str) {
        let before = self.cameras.len();
        self.cameras.retain(|c| c.name != name);
        if self.cameras.len() != before {
            self.hidden.remove(name);
        }
    }

    fn render_still(&mut self) -> Result<(), RenderError> {
        if self.settings.file_format != ImageFormat::Png {
            return Err(RenderError::Unsupported(format!(
                "{:?} output",
                self.settings.file_format
            )));
        }
        let camera_name = self.settings.camera.clone().ok_or(RenderError::NoCamera)?;
        let camera = self
            .cameras
            .iter()
            .find(|c| c.name == camera_name)
            .ok_or(RenderError::CameraNotFound(camera_name))?;

        let image = self.draw(camera)?;

        let path = &self.settings.filepath;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RenderError::Io(e.to_string()))?;
        }
        let result = match self.settings.color_mode {
            ColorMode::Rgba => image.save_with_format(path, image::ImageFormat::Png),
            ColorMode::Rgb => image::DynamicImage::ImageRgba8(image)
                .to_rgb8()
                .save_with_format(path, image::ImageFormat::Png),
            ColorMode::Bw => image::DynamicImage::ImageRgba8(image)
                .to_luma8()
                .save_with_format(path, image::ImageFormat::Png),
        };
        result.map_err(|e| RenderError::Io(e.to_string()))?;

        self.render_count += 1;
        tracing::debug!("Rendered still to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::raster::{RasterMode, RasterOptions, rasterize};
    use crate::scene::{SceneObject, Stroke};

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("leveler-test-{}", uuid::Uuid::new_v4()))
    }

    fn scene() -> Scene {
        let mut scene = Scene::default();
        let mut sketch = SceneObject::new("Sketch", ObjectKind::GreasePencil);
        sketch.strokes.push(Stroke {
            points: vec![Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0)],
            radius: 0.1,
            color: [0.0, 0.0, 1.0, 1.0],
        });
        scene.add_object(sketch).unwrap();

        let mut other = SceneObject::new("Other", ObjectKind::GreasePencil);
        other.strokes.push(Stroke {
            points: vec![Vec3::new(0.0, 0.0, -0.5), Vec3::new(0.0, 0.0, 0.5)],
            radius: 0.1,
            color: [1.0, 0.0, 0.0, 1.0],
        });
        scene.add_object(other).unwrap();
        scene
    }

    #[test]
    fn test_render_writes_transparent_png() {
        let scene = scene();
        let dir = temp_dir();
        let path = dir.join("Sketch.png");
        let mut renderer = SoftwareRenderer::new(&scene);

        let output = rasterize(
            &mut renderer,
            &scene,
            scene.object("Sketch").unwrap(),
            &path,
            &RasterOptions {
                scale_factor: 16.0,
                resolution_multiplier: 2.0,
                mode: RasterMode::Flat,
            },
        )
        .unwrap();

        assert_eq!(renderer.render_count(), 1);
        assert_eq!(renderer.camera_count(), 0);

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (output.width, output.height));

        let (w, h) = image.dimensions();
        // Diagonal stroke crosses the centre; corners stay transparent
        let middle = image.get_pixel(w / 2, h / 2);
        assert_eq!(middle.0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);

        // "Other" is hidden during capture: no red anywhere
        assert!(image.pixels().all(|p| p.0[0] == 0));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_render_without_camera_fails() {
        let scene = scene();
        let mut renderer = SoftwareRenderer::new(&scene);
        assert!(matches!(renderer.render_still(), Err(RenderError::NoCamera)));

        renderer.settings.camera = Some("Missing".into());
        assert!(matches!(
            renderer.render_still(),
            Err(RenderError::CameraNotFound(_))
        ));
    }

    #[test]
    fn test_oversized_image_fails() {
        let scene = scene();
        let mut renderer = SoftwareRenderer::new(&scene);
        let camera = CaptureCamera::framing(&crate::scene::BoundingBox::new(Vec3::ZERO, Vec3::ONE));
        renderer.add_camera(&camera).unwrap();
        renderer.settings.camera = Some(camera.name.clone());
        renderer.settings.resolution_x = crate::raster::MAX_RESOLUTION;
        renderer.settings.resolution_y = crate::raster::MAX_RESOLUTION;
        renderer.settings.resolution_percentage = 100;
        renderer.settings.filepath = temp_dir().join("huge.png");

        assert!(matches!(
            renderer.render_still(),
            Err(RenderError::Failed(_))
        ));
        assert_eq!(renderer.render_count(), 0);
        assert!(!renderer.settings.filepath.exists());
    }

    #[test]
    fn test_unsupported_format() {
        let scene = scene();
        let mut renderer = SoftwareRenderer::new(&scene);
        renderer.settings.file_format = ImageFormat::OpenExr;
        assert!(matches!(
            renderer.render_still(),
            Err(RenderError::Unsupported(_))
        ));
    }

    #[test]
    fn test_camera_lifecycle_and_visibility() {
        let scene = scene();
        let mut renderer = SoftwareRenderer::new(&scene);
        let camera = CaptureCamera::framing(&crate::scene::BoundingBox::new(Vec3::ZERO, Vec3::ONE));

        renderer.add_camera(&camera).unwrap();
        assert!(matches!(
            renderer.add_camera(&camera),
            Err(RenderError::NameInUse(_))
        ));
        assert_eq!(renderer.render_visibility().len(), 3);

        renderer.set_hide_render("Sketch", true);
        renderer.set_hide_render("Unknown", true);
        assert!(renderer.is_hidden("Sketch"));

        renderer.remove_camera(&camera.name);
        assert_eq!(renderer.render_visibility().len(), 2);
    }
}
