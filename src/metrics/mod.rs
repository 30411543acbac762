//! Prometheus metrics for the motion detector.
//!
//! # Metrics Exposed
//!
//! - `tile_motion_state` - Detector state (0=uninitialized, 1=warming, 2=steady)
//! - `tile_motion_ticks_total` - Scheduler ticks handled
//! - `tile_motion_samples_total` - Frames captured and reduced
//! - `tile_motion_skipped_too_soon_total` - Ticks gated by the sample delta
//! - `tile_motion_skipped_not_ready_total` - Ticks with no usable frame
//! - `tile_motion_motion_events_total` - Comparisons that counted as motion
//! - `tile_motion_changed_tiles` - Changed tiles in the latest comparison
//! - `tile_motion_max_diff` - Largest tile change in the latest comparison
//! - `tile_motion_alerts_fired_total` - Alerts delivered
//! - `tile_motion_alerts_suppressed_total` - Alerts swallowed by the throttle
//! - `tile_motion_resolution_resets_total` - Resets after resolution changes
//!
//! # Example
//!
//! ```no_run
//! use tile_motion::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     state: 2,
//!     samples: 120,
//!     motion_events: 4,
//!     alerts_fired: 1,
//!     alerts_suppressed: 3,
//!     ..Default::default()
//! };
//!
//! registry.update(&snapshot);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsHandle, MetricsServer, MetricsServerConfig, ServerError};
