//! Metrics collection and registry.

use crate::detector::{Detector, DetectorStats};
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of detector state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Lifecycle state code (0=uninitialized, 1=warming, 2=steady).
    pub state: i64,
    /// Total ticks handled.
    pub ticks: u64,
    /// Total frames sampled.
    pub samples: u64,
    /// Ticks skipped by the sample-delta gate.
    pub skipped_too_soon: u64,
    /// Ticks skipped because the source was not ready.
    pub skipped_not_ready: u64,
    /// Comparisons that counted as motion.
    pub motion_events: u64,
    /// Alerts delivered.
    pub alerts_fired: u64,
    /// Alerts swallowed by the throttle.
    pub alerts_suppressed: u64,
    /// Resets after resolution changes.
    pub resolution_resets: u64,
    /// Changed tiles in the latest comparison.
    pub changed_tiles: Option<usize>,
    /// Largest tile change in the latest comparison.
    pub max_diff: Option<f64>,
}

/// Prometheus metrics registry for detector monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    state: IntGauge,

    // Scheduling
    ticks_total: IntCounter,
    samples_total: IntCounter,
    skipped_too_soon_total: IntCounter,
    skipped_not_ready_total: IntCounter,

    // Detection
    motion_events_total: IntCounter,
    changed_tiles: IntGauge,
    max_diff: Gauge,

    // Alerts
    alerts_fired_total: IntCounter,
    alerts_suppressed_total: IntCounter,
    resolution_resets_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all detector metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let state = IntGauge::new(
            "tile_motion_state",
            "Detector state (0=uninitialized, 1=warming, 2=steady)",
        )?;

        let ticks_total = IntCounter::new("tile_motion_ticks_total", "Total scheduler ticks")?;
        let samples_total =
            IntCounter::new("tile_motion_samples_total", "Total frames sampled and reduced")?;
        let skipped_too_soon_total = IntCounter::new(
            "tile_motion_skipped_too_soon_total",
            "Ticks skipped because the minimum sample delta had not elapsed",
        )?;
        let skipped_not_ready_total = IntCounter::new(
            "tile_motion_skipped_not_ready_total",
            "Ticks skipped because the video source was not ready",
        )?;

        let motion_events_total = IntCounter::new(
            "tile_motion_motion_events_total",
            "Comparisons that counted as motion",
        )?;
        let changed_tiles = IntGauge::new(
            "tile_motion_changed_tiles",
            "Tiles above the diff threshold in the latest comparison",
        )?;
        let max_diff = Gauge::new(
            "tile_motion_max_diff",
            "Largest per-tile luminance change in the latest comparison",
        )?;

        let alerts_fired_total =
            IntCounter::new("tile_motion_alerts_fired_total", "Alerts delivered")?;
        let alerts_suppressed_total = IntCounter::new(
            "tile_motion_alerts_suppressed_total",
            "Motion events suppressed by the alert throttle",
        )?;
        let resolution_resets_total = IntCounter::new(
            "tile_motion_resolution_resets_total",
            "Returns to warming after a video resolution change",
        )?;

        registry.register(Box::new(state.clone()))?;
        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(samples_total.clone()))?;
        registry.register(Box::new(skipped_too_soon_total.clone()))?;
        registry.register(Box::new(skipped_not_ready_total.clone()))?;
        registry.register(Box::new(motion_events_total.clone()))?;
        registry.register(Box::new(changed_tiles.clone()))?;
        registry.register(Box::new(max_diff.clone()))?;
        registry.register(Box::new(alerts_fired_total.clone()))?;
        registry.register(Box::new(alerts_suppressed_total.clone()))?;
        registry.register(Box::new(resolution_resets_total.clone()))?;

        Ok(Self {
            registry,
            state,
            ticks_total,
            samples_total,
            skipped_too_soon_total,
            skipped_not_ready_total,
            motion_events_total,
            changed_tiles,
            max_diff,
            alerts_fired_total,
            alerts_suppressed_total,
            resolution_resets_total,
        })
    }

    /// Updates all metrics from a snapshot of detector state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.state.set(snapshot.state);

        // Counters only move forward by the difference
        advance(&self.ticks_total, snapshot.ticks);
        advance(&self.samples_total, snapshot.samples);
        advance(&self.skipped_too_soon_total, snapshot.skipped_too_soon);
        advance(&self.skipped_not_ready_total, snapshot.skipped_not_ready);
        advance(&self.motion_events_total, snapshot.motion_events);
        advance(&self.alerts_fired_total, snapshot.alerts_fired);
        advance(&self.alerts_suppressed_total, snapshot.alerts_suppressed);
        advance(&self.resolution_resets_total, snapshot.resolution_resets);

        if let Some(changed) = snapshot.changed_tiles {
            self.changed_tiles.set(changed as i64);
        }
        if let Some(max) = snapshot.max_diff {
            self.max_diff.set(max);
        }
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from detector statistics and state code.
    pub fn from_stats(stats: &DetectorStats, state: i64) -> Self {
        Self {
            state,
            ticks: stats.ticks,
            samples: stats.samples,
            skipped_too_soon: stats.skipped_too_soon,
            skipped_not_ready: stats.skipped_not_ready,
            motion_events: stats.motion_events,
            alerts_fired: stats.alerts_fired,
            alerts_suppressed: stats.alerts_suppressed,
            resolution_resets: stats.resolution_resets,
            changed_tiles: stats.last_decision.map(|d| d.changed_tiles),
            max_diff: stats.last_decision.map(|d| d.max_diff),
        }
    }

    /// Creates a snapshot from the current state of a detector.
    pub fn from_detector(detector: &Detector) -> Self {
        Self::from_stats(detector.stats(), detector.state().code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            state: 2,
            ticks: 40,
            samples: 10,
            skipped_too_soon: 30,
            skipped_not_ready: 0,
            motion_events: 3,
            alerts_fired: 1,
            alerts_suppressed: 2,
            resolution_resets: 0,
            changed_tiles: Some(5),
            max_diff: Some(0.75),
        };

        registry.update(&snapshot);
        // Re-applying the same snapshot must not double count.
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("tile_motion_state 2"));
        assert!(output.contains("tile_motion_samples_total 10"));
        assert!(output.contains("tile_motion_alerts_fired_total 1"));
        assert!(output.contains("tile_motion_alerts_suppressed_total 2"));
        assert!(output.contains("tile_motion_changed_tiles 5"));
    }

    #[test]
    fn test_snapshot_from_stats() {
        let stats = DetectorStats {
            ticks: 7,
            samples: 3,
            alerts_fired: 1,
            ..Default::default()
        };
        let snapshot = MetricsSnapshot::from_stats(&stats, 1);

        assert_eq!(snapshot.state, 1);
        assert_eq!(snapshot.ticks, 7);
        assert_eq!(snapshot.alerts_fired, 1);
        assert!(snapshot.changed_tiles.is_none());
    }

    #[test]
    fn test_metrics_encode() {
        let registry = MetricsRegistry::new().unwrap();
        let output = registry.encode().unwrap();

        assert!(output.contains("tile_motion_state"));
        assert!(output.contains("tile_motion_alerts_fired_total"));
        assert!(output.contains("tile_motion_max_diff"));
    }
}
