//! Leveler command-line entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use leveler_core::raster::{RasterMode, SoftwareRenderer};
use leveler_core::{ExportOptions, Scene, VERSION, export_level};

#[derive(Parser, Debug)]
#[command(name = "leveler", version = VERSION, about = "Export a 3D scene dump as a 2D level")]
struct Cli {
    /// Scene dump (JSON) to export
    scene: PathBuf,
    /// Level JSON to write
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// RON file with export options; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Engine units per authoring unit
    #[arg(long)]
    scale_factor: Option<f64>,
    /// Export only selected objects
    #[arg(long)]
    selected_only: bool,
    /// Skip grease-pencil drawings instead of rendering them
    #[arg(long)]
    no_rasterize: bool,
    /// Pixels per engine unit for rendered drawings
    #[arg(long)]
    raster_resolution: Option<f64>,
    /// Folder next to the level file receiving rendered drawings
    #[arg(long)]
    raster_subfolder: Option<String>,
    #[arg(long, value_enum)]
    raster_mode: Option<ModeArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Unlit, hard-edged strokes
    Flat,
    /// Default engine with anti-aliasing reduced to one sample
    Standard,
}

impl From<ModeArg> for RasterMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Flat => RasterMode::Flat,
            ModeArg::Standard => RasterMode::Standard,
        }
    }
}

impl Cli {
    fn export_options(&self) -> Result<ExportOptions> {
        let mut options = match &self.config {
            Some(path) => ExportOptions::load(path)
                .with_context(|| format!("loading options from {}", path.display()))?,
            None => ExportOptions::default(),
        };

        if let Some(output) = &self.output {
            options.output_path = output.clone();
        } else if self.config.is_none() {
            options.output_path = self.scene.with_extension("level.json");
        }
        if let Some(scale_factor) = self.scale_factor {
            options.scale_factor = scale_factor;
        }
        if self.selected_only {
            options.selected_only = true;
        }
        if self.no_rasterize {
            options.rasterize_strokes = false;
        }
        if let Some(resolution) = self.raster_resolution {
            options.raster_resolution = resolution;
        }
        if let Some(subfolder) = &self.raster_subfolder {
            options.raster_subfolder = subfolder.clone();
        }
        if let Some(mode) = self.raster_mode {
            options.raster_mode = mode.into();
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leveler=info,leveler_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let options = cli.export_options()?;

    let scene = Scene::load(&cli.scene)
        .with_context(|| format!("loading scene {}", cli.scene.display()))?;
    tracing::info!("Loaded {} objects from {}", scene.len(), cli.scene.display());

    let mut renderer = SoftwareRenderer::new(&scene);
    let report = export_level(&scene, &mut renderer, &options).context("export failed")?;

    println!(
        "Exported {} objects to {} ({} drawings rendered, {} warnings)",
        report.object_count,
        report.output_path.display(),
        report.rasterized.len(),
        report.warnings.len()
    );
    Ok(())
}
