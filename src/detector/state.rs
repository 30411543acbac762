//! Detector lifecycle states and per-tick outcomes.

use crate::analysis::{DiffGrid, MotionDecision};
use crate::reduction::LuminanceGrid;

/// Resolution frames are captured at, after applying the scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSize {
    /// Capture width in pixels.
    pub width: u32,
    /// Capture height in pixels.
    pub height: u32,
}

impl CaptureSize {
    /// Scales natural dimensions, truncating to whole pixels.
    pub fn from_natural(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width: (f64::from(width) * scale_factor).floor() as u32,
            height: (f64::from(height) * scale_factor).floor() as u32,
        }
    }
}

/// Where the detector is in its lifecycle.
///
/// ```text
/// Uninitialized --(source reports a size)--> Warming --(first sample)--> Steady
///                                               ^                          |
///                                               +----(resolution change)---+
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorState {
    /// No capture resolution known yet.
    Uninitialized,
    /// Sized, no grid captured yet.
    Warming {
        natural: (u32, u32),
        capture: CaptureSize,
    },
    /// Holding the grid of the last processed sample.
    Steady {
        natural: (u32, u32),
        capture: CaptureSize,
        previous: LuminanceGrid,
    },
}

impl DetectorState {
    /// Short lowercase name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            DetectorState::Uninitialized => "uninitialized",
            DetectorState::Warming { .. } => "warming",
            DetectorState::Steady { .. } => "steady",
        }
    }

    /// Numeric code for gauges: 0, 1 or 2.
    pub fn code(&self) -> i64 {
        match self {
            DetectorState::Uninitialized => 0,
            DetectorState::Warming { .. } => 1,
            DetectorState::Steady { .. } => 2,
        }
    }

    /// Natural and capture size, once known.
    pub fn sizing(&self) -> Option<((u32, u32), CaptureSize)> {
        match self {
            DetectorState::Uninitialized => None,
            DetectorState::Warming { natural, capture }
            | DetectorState::Steady {
                natural, capture, ..
            } => Some((*natural, *capture)),
        }
    }

    /// The grid the next sample will be compared against.
    pub fn previous(&self) -> Option<&LuminanceGrid> {
        match self {
            DetectorState::Steady { previous, .. } => Some(previous),
            _ => None,
        }
    }
}

/// Result of comparing a sample against its predecessor.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Per-tile change.
    pub diff: DiffGrid,
    /// Verdict of the motion rule.
    pub decision: MotionDecision,
    /// Whether the notifier was actually invoked.
    pub alerted: bool,
    /// Resolution the sample was captured at.
    pub capture: CaptureSize,
}

/// What a single tick did.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// Source had no usable frame; nothing changed.
    NotReady,
    /// Too little video time since the last processed sample.
    TooSoon,
    /// First grid after sizing stored as baseline.
    Baseline { cols: usize, rows: usize },
    /// Grid compared against the previous one.
    Compared(Comparison),
}

impl TickOutcome {
    /// True if this tick raised an alert.
    pub fn alerted(&self) -> bool {
        matches!(self, TickOutcome::Compared(c) if c.alerted)
    }

    /// True if this tick captured and reduced a frame.
    pub fn sampled(&self) -> bool {
        matches!(self, TickOutcome::Baseline { .. } | TickOutcome::Compared(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_size_truncates() {
        assert_eq!(
            CaptureSize::from_natural(640, 480, 0.2),
            CaptureSize {
                width: 128,
                height: 96
            }
        );
        assert_eq!(
            CaptureSize::from_natural(641, 479, 0.2),
            CaptureSize {
                width: 128,
                height: 95
            }
        );
        assert_eq!(
            CaptureSize::from_natural(8, 8, 1.0),
            CaptureSize {
                width: 8,
                height: 8
            }
        );
    }

    #[test]
    fn test_state_codes() {
        let capture = CaptureSize::from_natural(8, 8, 1.0);
        let warming = DetectorState::Warming {
            natural: (8, 8),
            capture,
        };

        assert_eq!(DetectorState::Uninitialized.code(), 0);
        assert_eq!(warming.code(), 1);
        assert_eq!(warming.name(), "warming");
        assert_eq!(warming.sizing(), Some(((8, 8), capture)));
        assert!(warming.previous().is_none());
    }
}
