//! Motion decision rule.
//!
//! Turns a diff grid into a yes/no motion verdict. The reference rule is
//! "any tile changed"; raising `min_changed_tiles` makes the detector
//! less sensitive to isolated noisy tiles.

use super::diff::DiffGrid;
use crate::capture::DetectorConfig;
use serde::{Deserialize, Serialize};

/// Thresholds that decide whether a diff counts as motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionRule {
    /// Per-tile change considered significant (strict comparison).
    pub diff_threshold: f64,
    /// Changed tiles needed to call it motion.
    pub min_changed_tiles: usize,
}

impl Default for MotionRule {
    fn default() -> Self {
        Self {
            diff_threshold: 0.15,
            min_changed_tiles: 1,
        }
    }
}

impl From<&DetectorConfig> for MotionRule {
    fn from(config: &DetectorConfig) -> Self {
        Self {
            diff_threshold: config.diff_threshold,
            min_changed_tiles: config.min_changed_tiles,
        }
    }
}

/// Outcome of applying a [`MotionRule`] to one diff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionDecision {
    /// Tiles whose change exceeded the threshold.
    pub changed_tiles: usize,
    /// Tiles in the grid.
    pub total_tiles: usize,
    /// Largest single-tile change.
    pub max_diff: f64,
    /// Whether this counts as motion.
    pub detected: bool,
}

impl MotionDecision {
    /// Fraction of the grid that changed.
    pub fn changed_fraction(&self) -> f64 {
        if self.total_tiles == 0 {
            0.0
        } else {
            self.changed_tiles as f64 / self.total_tiles as f64
        }
    }
}

impl MotionRule {
    /// Evaluates a diff grid.
    pub fn evaluate(&self, diff: &DiffGrid) -> MotionDecision {
        let changed_tiles = diff.count_exceeding(self.diff_threshold);
        MotionDecision {
            changed_tiles,
            total_tiles: diff.len(),
            max_diff: diff.max_value(),
            detected: changed_tiles >= self.min_changed_tiles.max(1),
        }
    }
}
