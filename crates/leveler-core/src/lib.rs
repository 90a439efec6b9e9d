//! Leveler Core
//!
//! Turns a 3D authoring scene into a 2D level description:
//! - scene: read-only object, mesh, material and collection model
//! - mapping: authoring space to engine space transforms
//! - geometry: mesh classification and collider polygons
//! - surface: texture paths and per-vertex UVs
//! - properties / hierarchy: custom attributes and collection membership
//! - raster: grease-pencil rendering through a render host
//! - export: assembly of the level JSON

pub mod config;
pub mod export;
pub mod geometry;
pub mod hierarchy;
pub mod mapping;
pub mod properties;
pub mod raster;
pub mod scene;
pub mod surface;

pub use config::*;
pub use export::*;
pub use scene::*;

/// Crate version, part of the default `exportedFrom` string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
