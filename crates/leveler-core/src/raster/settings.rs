//! Render configuration touched by stroke rasterization

use std::path::PathBuf;

use serde::Deserialize;

/// Output image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    #[serde(alias = "OPEN_EXR")]
    OpenExr,
    Tiff,
}

/// Output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorMode {
    Bw,
    #[default]
    Rgb,
    Rgba,
}

/// Render engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RenderEngine {
    #[default]
    #[serde(alias = "BLENDER_EEVEE", alias = "BLENDER_EEVEE_NEXT")]
    Eevee,
    #[serde(alias = "BLENDER_WORKBENCH")]
    Workbench,
    Cycles,
}

/// Workbench lighting model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Lighting {
    #[default]
    Studio,
    Matcap,
    Flat,
}

/// Workbench color source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShadingColor {
    #[default]
    Material,
    Object,
    Single,
    Texture,
    Vertex,
}

/// Workbench shading fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ShadingSettings {
    pub light: Lighting,
    pub color_type: ShadingColor,
}

/// Snapshot of every global render field the rasterizer mutates
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub filepath: PathBuf,
    pub file_format: ImageFormat,
    pub color_mode: ColorMode,
    pub film_transparent: bool,
    pub resolution_x: u32,
    pub resolution_y: u32,
    pub resolution_percentage: u32,
    pub engine: RenderEngine,
    /// Anti-aliasing samples for final renders
    pub taa_render_samples: u32,
    pub use_taa_reprojection: bool,
    pub shading: ShadingSettings,
    /// Active camera object
    pub camera: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            filepath: PathBuf::from("/tmp/"),
            file_format: ImageFormat::Png,
            color_mode: ColorMode::Rgb,
            film_transparent: false,
            resolution_x: 1920,
            resolution_y: 1080,
            resolution_percentage: 100,
            engine: RenderEngine::Eevee,
            taa_render_samples: 64,
            use_taa_reprojection: true,
            shading: ShadingSettings::default(),
            camera: None,
        }
    }
}

impl RenderSettings {
    /// Effective output size after the percentage scale, at least 1x1
    pub fn output_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as u64 * self.resolution_percentage as u64) / 100).max(1) as u32;
        (scale(self.resolution_x), scale(self.resolution_y))
    }
}
