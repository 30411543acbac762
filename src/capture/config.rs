//! Detector and application configuration.
//!
//! All detector parameters are fixed at construction time. The file
//! format mirrors these structs section by section.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Literal message handed to the notifier when motion is detected.
pub const DEFAULT_ALERT_MESSAGE: &str = "Motion detected!";

/// Configuration for the motion detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Downsampling ratio applied to the natural video resolution, in (0, 1].
    pub scale_factor: f64,
    /// Pixels per tile edge at capture resolution.
    pub tile_size: u32,
    /// Per-tile luminance delta considered "changed".
    pub diff_threshold: f64,
    /// Number of changed tiles required to call it motion.
    pub min_changed_tiles: usize,
    /// Minimum elapsed video time between processed samples, in seconds.
    pub min_sample_delta_secs: f64,
    /// Minimum elapsed wall time between fired alerts, in seconds.
    pub min_silence_secs: f64,
    /// Message passed to the notifier.
    pub alert_message: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            scale_factor: 0.2,
            tile_size: 4,
            diff_threshold: 0.15,
            min_changed_tiles: 1,
            min_sample_delta_secs: 0.5,
            min_silence_secs: 30.0,
            alert_message: DEFAULT_ALERT_MESSAGE.to_string(),
        }
    }
}

impl DetectorConfig {
    /// Minimum sample delta as a duration.
    pub fn min_sample_delta(&self) -> Result<Duration, ConfigError> {
        interval("min_sample_delta_secs", self.min_sample_delta_secs)
    }

    /// Minimum silence interval as a duration.
    pub fn min_silence(&self) -> Result<Duration, ConfigError> {
        interval("min_silence_secs", self.min_silence_secs)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale_factor > 0.0 && self.scale_factor <= 1.0) {
            return Err(ConfigError::InvalidScaleFactor(self.scale_factor));
        }
        if self.tile_size == 0 {
            return Err(ConfigError::InvalidTileSize);
        }
        if !(0.0..1.0).contains(&self.diff_threshold) {
            return Err(ConfigError::InvalidThreshold(self.diff_threshold));
        }
        if self.min_changed_tiles == 0 {
            return Err(ConfigError::InvalidMinChangedTiles);
        }
        self.min_sample_delta()?;
        self.min_silence()?;
        Ok(())
    }
}

/// Seconds as a `Duration`, rejecting values a `Duration` cannot hold.
fn interval(name: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| ConfigError::InvalidInterval { name, value: secs })
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("scale factor {0} must be in (0, 1]")]
    InvalidScaleFactor(f64),
    #[error("tile size must be at least 1 pixel")]
    InvalidTileSize,
    #[error("tile size {tile_size} exceeds capture resolution {width}x{height}")]
    TileLargerThanCapture {
        tile_size: u32,
        width: u32,
        height: u32,
    },
    #[error("diff threshold {0} must be in [0, 1)")]
    InvalidThreshold(f64),
    #[error("min_changed_tiles must be at least 1")]
    InvalidMinChangedTiles,
    #[error("{name} must be a non-negative number of seconds that fits a duration (got {value})")]
    InvalidInterval { name: &'static str, value: f64 },
    #[error("invalid source dimensions")]
    InvalidDimensions,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Video source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Camera device index.
    pub device_id: u32,
    /// Natural frame width in pixels (mock source).
    pub width: u32,
    /// Natural frame height in pixels (mock source).
    pub height: u32,
    /// Host tick rate.
    pub fps: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

impl SourceConfig {
    /// Validates the source parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 || self.fps == 0 || self.fps > 240 {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

/// Alert delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AlertConfig {
    /// External program run with the alert message as its last argument
    /// (e.g. `espeak`). Alerts are only logged when unset.
    pub command: Option<String>,
    /// Arguments placed before the message.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
    /// Where to write the diff preview image, if anywhere.
    pub preview_path: Option<PathBuf>,
    /// Stop after this many ticks (0 runs until interrupted).
    pub max_ticks: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            metrics_port: 0,
            preview_path: None,
            max_ticks: 0,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.detector.validate()?;
        config.source.validate()?;
        Ok(config)
    }
}
