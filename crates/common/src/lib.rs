//! Shared types for gridview: colors, grid shading parameters and the
//! config file that carries them between runs.
//!
//! # Invariants
//! - Colors are stored in linear RGB; sRGB only appears at the file boundary.
//! - `GridParams` loaded from disk contain finite values only.

pub mod config;
pub mod params;
pub mod types;

pub use config::{ConfigError, ConfigFormat, ConfigWatcher, DemoConfig, SampleMeshConfig};
pub use params::{GridParams, PipelineVariant};
pub use types::{ColorParseError, Rgb, Rgba};
