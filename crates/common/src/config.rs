//! Config files for the demo.
//!
//! A config is YAML (`.yaml`, `.yml`) or JSON (`.json`), chosen by file
//! extension. Every field is optional; missing ones take their defaults.
//!
//! ```yaml
//! grid:
//!   major_line_width: 0.04
//!   base_color: "#707070"
//! variant: canonical
//! sample_mesh:
//!   fps: 120.0
//! ```

use crate::params::{GridParams, PipelineVariant};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Errors from loading or saving a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format for {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),
    #[error("grid parameter `{field}` is not finite")]
    NonFinite { field: &'static str },
    #[error("sample mesh fps must be positive, got {0}")]
    InvalidFps(f32),
}

/// On-disk encoding of a config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Settings for the animated sample mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleMeshConfig {
    /// Animation ticks per second.
    pub fps: f32,
    /// Spin rate in radians per second around X and Y.
    pub spin_speed: f32,
}

impl Default for SampleMeshConfig {
    fn default() -> Self {
        Self {
            fps: 120.0,
            spin_speed: 0.3,
        }
    }
}

/// Everything the demo reads from a config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub grid: GridParams,
    pub variant: PipelineVariant,
    pub sample_mesh: SampleMeshConfig,
}

impl DemoConfig {
    /// Parse a config from text in the given format and validate it.
    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let config: Self = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(text)?,
            ConfigFormat::Json => serde_json::from_str(text)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, format)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_text(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        Ok(match format {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
        })
    }

    /// Write the config, choosing the format from the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = self.to_text(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("config saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(field) = self.grid.first_non_finite() {
            return Err(ConfigError::NonFinite { field });
        }
        let fps = self.sample_mesh.fps;
        if !(fps.is_finite() && fps > 0.0) {
            return Err(ConfigError::InvalidFps(fps));
        }
        Ok(())
    }
}

/// Polls a config file for modification and reloads it.
///
/// Checks at most once per `interval`; a reload happens when the file's
/// modification time differs from the last one seen.
pub struct ConfigWatcher {
    path: PathBuf,
    interval: Duration,
    last_modified: Option<SystemTime>,
    last_check: Option<Instant>,
}

impl ConfigWatcher {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        let path = path.into();
        let last_modified = modified_time(&path);
        Self {
            path,
            interval,
            last_modified,
            last_check: None,
        }
    }

    /// Rate-limited [`check`](Self::check).
    pub fn poll(&mut self, now: Instant) -> Result<Option<DemoConfig>, ConfigError> {
        if let Some(last) = self.last_check {
            if now.saturating_duration_since(last) < self.interval {
                return Ok(None);
            }
        }
        self.last_check = Some(now);
        self.check()
    }

    /// Reload the file if its modification time changed since the last check.
    ///
    /// A missing file is not an error; it is reported once it reappears.
    pub fn check(&mut self) -> Result<Option<DemoConfig>, ConfigError> {
        let modified = modified_time(&self.path);
        if modified.is_none() || modified == self.last_modified {
            return Ok(None);
        }
        self.last_modified = modified;
        let config = DemoConfig::load(&self.path)?;
        tracing::info!("config reloaded from {}", self.path.display());
        Ok(Some(config))
    }

    /// Record the current modification time without reloading, e.g. after
    /// the app saved the file itself.
    pub fn mark_seen(&mut self) {
        self.last_modified = modified_time(&self.path);
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgb;
    use std::fs::File;

    fn touch(path: &Path, secs_after_epoch: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch))
            .unwrap();
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let text = "grid:\n  major_line_width: 0.1\n  base_color: \"#ff0000\"\n";
        let config = DemoConfig::parse(text, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.grid.major_line_width, 0.1);
        assert_eq!(config.grid.base_color, Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(config.grid.minor_line_width, 0.01);
        assert_eq!(config.variant, PipelineVariant::Canonical);
        assert_eq!(config.sample_mesh.fps, 120.0);
    }

    #[test]
    fn json_variant_is_lowercase() {
        let text = r#"{ "variant": "simplified" }"#;
        let config = DemoConfig::parse(text, ConfigFormat::Json).unwrap();
        assert_eq!(config.variant, PipelineVariant::Simplified);
    }

    #[test]
    fn invalid_color_is_rejected() {
        let text = "grid:\n  base_color: \"#nothex\"\n";
        let err = DemoConfig::parse(text, ConfigFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        assert!(err.to_string().contains("invalid color"));
    }

    #[test]
    fn zero_fps_is_rejected() {
        let text = r#"{ "sample_mesh": { "fps": 0.0 } }"#;
        let err = DemoConfig::parse(text, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFps(_)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = ConfigFormat::from_path(Path::new("grid.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn save_and_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.yaml");
        let mut config = DemoConfig::default();
        config.grid.grid_div = 8.0;
        config.variant = PipelineVariant::Simplified;
        config.save(&path).unwrap();

        let loaded = DemoConfig::load(&path).unwrap();
        assert_eq!(loaded.grid.grid_div, 8.0);
        assert_eq!(loaded.variant, PipelineVariant::Simplified);
        assert_eq!(loaded.grid.base_color.to_hex(), "#707070");
    }

    #[test]
    fn default_config_survives_text_round_trip() {
        let defaults = DemoConfig::default();
        for format in [ConfigFormat::Yaml, ConfigFormat::Json] {
            let text = defaults.to_text(format).unwrap();
            assert_eq!(DemoConfig::parse(&text, format).unwrap(), defaults);
        }
    }

    #[test]
    fn picked_colors_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.yaml");
        let mut config = DemoConfig::default();
        config.grid.base_color = Rgb::new(0.123, 0.456, 0.789);
        config.save(&path).unwrap();
        assert_eq!(DemoConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DemoConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn watcher_reloads_on_modification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");
        DemoConfig::default().save(&path).unwrap();
        touch(&path, 1_000);

        let mut watcher = ConfigWatcher::new(&path, Duration::from_secs(1));
        assert!(watcher.check().unwrap().is_none());

        let mut changed = DemoConfig::default();
        changed.grid.base_alpha = 0.9;
        changed.save(&path).unwrap();
        touch(&path, 2_000);

        let reloaded = watcher.check().unwrap().expect("reload");
        assert_eq!(reloaded.grid.base_alpha, 0.9);
        assert!(watcher.check().unwrap().is_none());
    }

    #[test]
    fn watcher_poll_is_rate_limited() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.yaml");
        DemoConfig::default().save(&path).unwrap();
        touch(&path, 1_000);

        let mut watcher = ConfigWatcher::new(&path, Duration::from_secs(60));
        let start = Instant::now();
        assert!(watcher.poll(start).unwrap().is_none());

        touch(&path, 2_000);
        // Inside the interval: not checked yet.
        assert!(watcher.poll(start + Duration::from_secs(1)).unwrap().is_none());
        assert!(watcher.poll(start + Duration::from_secs(61)).unwrap().is_some());
    }

    #[test]
    fn mark_seen_skips_own_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.yaml");
        DemoConfig::default().save(&path).unwrap();
        touch(&path, 1_000);
        let mut watcher = ConfigWatcher::new(&path, Duration::ZERO);

        DemoConfig::default().save(&path).unwrap();
        touch(&path, 3_000);
        watcher.mark_seen();
        assert!(watcher.check().unwrap().is_none());
    }
}
