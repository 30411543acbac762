//! Tile Motion Detection Library
//!
//! Lightweight motion detection for a single live video stream. Frames
//! are sampled at a bounded rate, reduced to a coarse grid of average
//! luminance tiles, and compared with the previous grid. When enough
//! tiles change, an alert is handed to a notifier, at most once per
//! silence window.
//!
//! # Architecture
//!
//! ```text
//! capture → reduction → analysis → alert
//!     ↑__________ detector (tick) __________↓
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tile_motion::{
//!     alert::LogNotifier,
//!     capture::{DetectorConfig, MockVideoSource},
//!     detector::{Detector, TickOutcome},
//! };
//! use std::time::Duration;
//!
//! let mut source = MockVideoSource::new(640, 480);
//! let mut detector = Detector::new(DetectorConfig::default(), Box::new(LogNotifier)).unwrap();
//!
//! for step in 0..60 {
//!     if step == 30 {
//!         source.fill_rect(100, 100, 200, 200, [255, 255, 255]);
//!     }
//!     source.advance(Duration::from_millis(100));
//!
//!     if let TickOutcome::Compared(c) = detector.tick_now(&mut source).unwrap() {
//!         println!("changed tiles: {}", c.decision.changed_tiles);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod alert;
pub mod analysis;
pub mod capture;
pub mod detector;
pub mod metrics;
pub mod preview;
pub mod reduction;

// Re-export commonly used types at crate root
pub use alert::{AlertThrottle, CommandNotifier, LogNotifier, Notifier};
pub use analysis::{count_exceeding, diff, DiffGrid, MotionDecision, MotionRule};
pub use capture::{DetectorConfig, FileConfig, Frame, MockVideoSource, VideoSource};
pub use detector::{Detector, DetectorError, DetectorState, TickOutcome};
pub use reduction::{luminance, LuminanceGrid, TileGrid, TileReducer};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
