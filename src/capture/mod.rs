//! Video input and frame handling.
//!
//! This module provides the source abstraction the detector samples from,
//! the frame type it hands to the tile reducer, and the configuration
//! fixed at construction time.

mod config;
mod frame;
mod source;
#[cfg(feature = "camera")]
mod webcam;

pub use config::{
    AlertConfig, ConfigError, DetectorConfig, FileConfig, OutputConfig, SourceConfig,
    DEFAULT_ALERT_MESSAGE,
};
pub use frame::{Frame, PixelFormat};
pub use source::{MockVideoSource, SourceError, VideoSource};
#[cfg(feature = "camera")]
pub use webcam::WebcamSource;
