//! Export options and their RON file form

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::raster::RasterMode;

/// Configuration error types
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    Serialize(String),
    /// Error during deserialization
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    /// A value outside its allowed range
    #[error("Invalid option '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Parameters of one export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Level JSON file to write
    pub output_path: PathBuf,
    /// Engine units per authoring unit
    pub scale_factor: f64,
    /// Export only selected objects
    pub selected_only: bool,
    /// Render grease-pencil drawings to PNGs; skipped entirely when off
    pub rasterize_strokes: bool,
    /// Pixels per engine unit for rendered drawings
    pub raster_resolution: f64,
    /// Directory next to the JSON file receiving the PNGs
    pub raster_subfolder: String,
    pub raster_mode: RasterMode,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("level.json"),
            scale_factor: 16.0,
            selected_only: false,
            rasterize_strokes: true,
            raster_resolution: 10.0,
            raster_subfolder: "GreasePencil".to_string(),
            raster_mode: RasterMode::Standard,
        }
    }
}

impl ExportOptions {
    /// Load options from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let options: Self =
            ron::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        tracing::info!("Loaded export options from {:?}", path);
        Ok(options)
    }

    /// Save options as pretty RON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, &content).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::info!("Saved export options to {:?}", path);
        Ok(())
    }

    /// Check ranges before any work starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("scale_factor", self.scale_factor)?;
        positive("raster_resolution", self.raster_resolution)?;

        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output_path",
                reason: "must not be empty".into(),
            });
        }

        let mut components = Path::new(&self.raster_subfolder).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(ConfigError::Invalid {
                field: "raster_subfolder",
                reason: format!("'{}' is not a single folder name", self.raster_subfolder),
            }),
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is not a positive number"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExportOptions::default();
        assert_eq!(options.scale_factor, 16.0);
        assert_eq!(options.raster_resolution, 10.0);
        assert_eq!(options.raster_subfolder, "GreasePencil");
        assert_eq!(options.raster_mode, RasterMode::Standard);
        assert!(options.rasterize_strokes);
        assert!(!options.selected_only);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let options: ExportOptions =
            ron::from_str("(scale_factor: 32.0, raster_mode: flat)").unwrap();
        assert_eq!(options.scale_factor, 32.0);
        assert_eq!(options.raster_mode, RasterMode::Flat);
        assert_eq!(options.raster_subfolder, "GreasePencil");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_scale = ExportOptions {
            scale_factor: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_scale.validate(),
            Err(ConfigError::Invalid { field: "scale_factor", .. })
        ));

        let bad_resolution = ExportOptions {
            raster_resolution: f64::NAN,
            ..Default::default()
        };
        assert!(bad_resolution.validate().is_err());

        for subfolder in ["", "a/b", "..", "/abs"] {
            let options = ExportOptions {
                raster_subfolder: subfolder.into(),
                ..Default::default()
            };
            assert!(options.validate().is_err(), "{subfolder:?}");
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("leveler-test-{}", uuid::Uuid::new_v4()));
        let path = dir.join("export.ron");
        let options = ExportOptions {
            output_path: PathBuf::from("out/level.json"),
            selected_only: true,
            ..Default::default()
        };

        options.save(&path).unwrap();
        assert_eq!(ExportOptions::load(&path).unwrap(), options);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ExportOptions::load("/nonexistent/leveler.ron"),
            Err(ConfigError::Io(_))
        ));
    }
}
