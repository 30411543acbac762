//! Sampling scheduler and motion detector.
//!
//! The host calls [`Detector::tick`] as often as it likes (every rendered
//! frame, every media time update). Each tick decides on its own whether
//! a new sample is due, then captures, reduces, diffs and alerts.
//!
//! All state lives in the detector: the lifecycle state (with the
//! previous grid), the video time of the last processed sample and the
//! alert throttle. Nothing blocks and nothing is shared.

mod state;

pub use state::{CaptureSize, Comparison, DetectorState, TickOutcome};

use crate::alert::{AlertThrottle, Notifier};
use crate::analysis::{self, MotionDecision, MotionRule};
use crate::capture::{ConfigError, DetectorConfig, VideoSource};
use crate::reduction::{GridError, TileReducer};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Fatal detector errors. Everything else is reported as a [`TickOutcome`].
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("grid error: {0}")]
    Grid(#[from] GridError),
}

/// Running counters since construction.
#[derive(Debug, Clone, Default)]
pub struct DetectorStats {
    /// Calls to `tick`.
    pub ticks: u64,
    /// Ticks skipped because the sample delta had not elapsed.
    pub skipped_too_soon: u64,
    /// Ticks skipped because the source had nothing usable.
    pub skipped_not_ready: u64,
    /// Frames captured and reduced.
    pub samples: u64,
    /// Samples compared against a previous grid.
    pub comparisons: u64,
    /// Comparisons that counted as motion.
    pub motion_events: u64,
    /// Alerts delivered to the notifier.
    pub alerts_fired: u64,
    /// Motion events swallowed by the throttle.
    pub alerts_suppressed: u64,
    /// Returns to warming after a resolution change.
    pub resolution_resets: u64,
    /// Decision of the most recent comparison.
    pub last_decision: Option<MotionDecision>,
}

/// Tile-diff motion detector with throttled alerts.
pub struct Detector {
    config: DetectorConfig,
    reducer: TileReducer,
    rule: MotionRule,
    throttle: AlertThrottle,
    state: DetectorState,
    /// Video time of the last processed sample.
    last_sample_at: Option<Duration>,
    min_sample_delta: Duration,
    stats: DetectorStats,
}

impl Detector {
    /// Creates a detector in the `Uninitialized` state.
    pub fn new(config: DetectorConfig, notifier: Box<dyn Notifier>) -> Result<Self, ConfigError> {
        config.validate()?;

        let reducer = TileReducer::new(config.tile_size)?;
        let rule = MotionRule::from(&config);
        let throttle = AlertThrottle::new(config.min_silence()?, notifier);
        let min_sample_delta = config.min_sample_delta()?;

        tracing::debug!(
            scale = config.scale_factor,
            tile_size = config.tile_size,
            threshold = config.diff_threshold,
            min_changed_tiles = config.min_changed_tiles,
            "Detector created"
        );

        Ok(Self {
            config,
            reducer,
            rule,
            throttle,
            state: DetectorState::Uninitialized,
            last_sample_at: None,
            min_sample_delta,
            stats: DetectorStats::default(),
        })
    }

    /// Runs one scheduling step against `source`, using `now` as wall time
    /// for the alert throttle.
    pub fn tick(
        &mut self,
        source: &mut dyn VideoSource,
        now: Instant,
    ) -> Result<TickOutcome, DetectorError> {
        self.stats.ticks += 1;

        let video_time = source.current_time();
        if !self.sample_due(video_time) {
            self.stats.skipped_too_soon += 1;
            return Ok(TickOutcome::TooSoon);
        }

        let natural = source.dimensions();
        if natural.0 == 0 || natural.1 == 0 {
            return Ok(self.not_ready("source has no dimensions yet"));
        }

        let capture = self.ensure_sized(natural)?;

        let frame = match source.capture(capture.width, capture.height) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "Frame capture failed");
                return Ok(self.not_ready("capture failed"));
            }
        };
        if (frame.width(), frame.height()) != (capture.width, capture.height) {
            tracing::warn!(
                expected_width = capture.width,
                expected_height = capture.height,
                width = frame.width(),
                height = frame.height(),
                "Source returned a frame of the wrong size"
            );
            return Ok(self.not_ready("wrong frame size"));
        }
        let current = match self.reducer.reduce(&frame) {
            Ok(grid) => grid,
            Err(e) => {
                tracing::warn!(error = %e, "Degenerate frame");
                return Ok(self.not_ready("degenerate frame"));
            }
        };

        self.last_sample_at = Some(video_time);
        self.stats.samples += 1;
        tracing::trace!(
            video_time_ms = video_time.as_millis() as u64,
            sequence = frame.sequence(),
            "Sample taken"
        );

        let diff = match self.state.previous() {
            Some(previous) => Some(analysis::diff(previous, &current)?),
            None => None,
        };
        let (cols, rows) = (current.cols(), current.rows());
        self.state = DetectorState::Steady {
            natural,
            capture,
            previous: current,
        };

        let Some(diff) = diff else {
            tracing::info!(cols, rows, "Baseline captured, detector steady");
            return Ok(TickOutcome::Baseline { cols, rows });
        };

        self.stats.comparisons += 1;
        let decision = self.rule.evaluate(&diff);
        self.stats.last_decision = Some(decision);

        let mut alerted = false;
        if decision.detected {
            self.stats.motion_events += 1;
            tracing::debug!(
                changed = decision.changed_tiles,
                total = decision.total_tiles,
                max_diff = decision.max_diff,
                "Motion detected"
            );
            alerted = self.throttle.try_alert(now, &self.config.alert_message);
            if alerted {
                self.stats.alerts_fired += 1;
            } else {
                self.stats.alerts_suppressed += 1;
            }
        }

        Ok(TickOutcome::Compared(Comparison {
            diff,
            decision,
            alerted,
            capture,
        }))
    }

    /// [`tick`](Self::tick) with the current wall time.
    pub fn tick_now(&mut self, source: &mut dyn VideoSource) -> Result<TickOutcome, DetectorError> {
        self.tick(source, Instant::now())
    }

    /// Drops sizing and the previous grid. The alert throttle keeps its
    /// last alert time.
    pub fn reset(&mut self) {
        self.state = DetectorState::Uninitialized;
        self.last_sample_at = None;
        tracing::info!("Detector reset");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// Counters since construction.
    pub fn stats(&self) -> &DetectorStats {
        &self.stats
    }

    /// The configuration the detector was built with.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// The alert throttle.
    pub fn throttle(&self) -> &AlertThrottle {
        &self.throttle
    }

    fn sample_due(&self, video_time: Duration) -> bool {
        match self.last_sample_at {
            None => true,
            Some(last) if video_time < last => {
                tracing::debug!(
                    last_ms = last.as_millis() as u64,
                    now_ms = video_time.as_millis() as u64,
                    "Video time moved backwards"
                );
                true
            }
            Some(last) => video_time - last > self.min_sample_delta,
        }
    }

    /// Makes sure the detector is sized for `natural`, moving to `Warming`
    /// on first sight or after a resolution change.
    fn ensure_sized(&mut self, natural: (u32, u32)) -> Result<CaptureSize, ConfigError> {
        let known = self.state.sizing();
        if let Some((known_natural, capture)) = known {
            if known_natural == natural {
                return Ok(capture);
            }
        }

        let capture = CaptureSize::from_natural(natural.0, natural.1, self.config.scale_factor);
        let tile_size = self.reducer.tile_size();
        if tile_size > capture.width.min(capture.height) {
            return Err(ConfigError::TileLargerThanCapture {
                tile_size,
                width: capture.width,
                height: capture.height,
            });
        }

        match known {
            None => tracing::info!(
                width = natural.0,
                height = natural.1,
                capture_width = capture.width,
                capture_height = capture.height,
                "Video source ready, warming up"
            ),
            Some((old, _)) => {
                self.stats.resolution_resets += 1;
                tracing::warn!(
                    old_width = old.0,
                    old_height = old.1,
                    width = natural.0,
                    height = natural.1,
                    "Video resolution changed, discarding previous grid"
                );
            }
        }

        self.state = DetectorState::Warming { natural, capture };
        Ok(capture)
    }

    fn not_ready(&mut self, reason: &'static str) -> TickOutcome {
        self.stats.skipped_not_ready += 1;
        tracing::debug!(reason, state = self.state.name(), "Tick skipped");
        TickOutcome::NotReady
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("state", &self.state.name())
            .field("last_sample_at", &self.last_sample_at)
            .field("throttle", &self.throttle)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MockVideoSource;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn config() -> DetectorConfig {
        DetectorConfig {
            scale_factor: 1.0,
            tile_size: 4,
            ..Default::default()
        }
    }

    fn detector(config: DetectorConfig) -> (Detector, Rc<RefCell<Vec<String>>>) {
        let sent = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&sent);
        let detector = Detector::new(
            config,
            Box::new(move |m: &str| sink.borrow_mut().push(m.to_string())),
        )
        .unwrap();
        (detector, sent)
    }

    fn at(source: &mut MockVideoSource, millis: u64) -> &mut MockVideoSource {
        source.set_time(Duration::from_millis(millis));
        source
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Detector::new(
            DetectorConfig {
                tile_size: 0,
                ..Default::default()
            },
            Box::new(|_: &str| {}),
        );
        assert!(matches!(result, Err(ConfigError::InvalidTileSize)));
    }

    #[test]
    fn test_lifecycle_transitions() {
        let (mut detector, sent) = detector(config());
        let mut source = MockVideoSource::pending(8, 8);
        let now = Instant::now();

        assert_eq!(detector.state(), &DetectorState::Uninitialized);

        // No dimensions yet: stays uninitialized and does not consume the gate.
        let outcome = detector.tick(at(&mut source, 0), now).unwrap();
        assert!(matches!(outcome, TickOutcome::NotReady));
        assert_eq!(detector.state().code(), 0);

        source.mark_ready();
        let outcome = detector.tick(at(&mut source, 100), now).unwrap();
        assert!(matches!(outcome, TickOutcome::Baseline { cols: 2, rows: 2 }));
        assert_eq!(detector.state().name(), "steady");

        let outcome = detector.tick(at(&mut source, 700), now).unwrap();
        match outcome {
            TickOutcome::Compared(c) => {
                assert!(!c.decision.detected);
                assert!(!c.alerted);
                assert_eq!(c.diff.values(), &[0.0; 4]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(sent.borrow().is_empty());
        assert_eq!(detector.stats().samples, 2);
        assert_eq!(detector.stats().skipped_not_ready, 1);
    }

    #[test]
    fn test_motion_raises_alert_message() {
        let (mut detector, sent) = detector(config());
        let mut source = MockVideoSource::new(8, 8);
        let now = Instant::now();

        detector.tick(at(&mut source, 0), now).unwrap();
        source.fill_rect(0, 0, 4, 4, [255, 255, 255]);
        let outcome = detector.tick(at(&mut source, 600), now).unwrap();

        assert!(outcome.alerted());
        assert_eq!(*sent.borrow(), vec!["Motion detected!"]);
        assert_eq!(detector.stats().motion_events, 1);
        assert_eq!(detector.stats().alerts_fired, 1);
    }

    #[test]
    fn test_previous_grid_replaced_every_sample() {
        let (mut detector, _) = detector(config());
        let mut source = MockVideoSource::new(8, 8);
        let now = Instant::now();

        detector.tick(at(&mut source, 0), now).unwrap();
        source.fill_rect(0, 0, 4, 4, [255, 255, 255]);
        detector.tick(at(&mut source, 600), now).unwrap();

        // Scene unchanged since the last sample: no motion against the new baseline.
        let outcome = detector.tick(at(&mut source, 1200), now).unwrap();
        match outcome {
            TickOutcome::Compared(c) => assert_eq!(c.decision.changed_tiles, 0),
            other => panic!("unexpected outcome {other:?}"),
        }
        let previous = detector.state().previous().unwrap();
        assert!((previous.get(0, 0).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_motion_is_throttled() {
        let (mut detector, sent) = detector(config());
        let mut source = MockVideoSource::new(8, 8);
        let t0 = Instant::now();

        detector.tick(at(&mut source, 0), t0).unwrap();
        source.fill([255, 255, 255]);
        detector.tick(at(&mut source, 600), t0).unwrap();
        source.fill([0, 0, 0]);
        let outcome = detector
            .tick(at(&mut source, 1200), t0 + Duration::from_secs(5))
            .unwrap();

        assert!(!outcome.alerted());
        assert_eq!(sent.borrow().len(), 1);
        assert_eq!(detector.stats().motion_events, 2);
        assert_eq!(detector.stats().alerts_suppressed, 1);
    }

    #[test]
    fn test_capture_failure_is_skipped() {
        let (mut detector, _) = detector(config());
        let mut source = MockVideoSource::new(8, 8);
        let now = Instant::now();

        source.fail_next_capture();
        let outcome = detector.tick(at(&mut source, 0), now).unwrap();
        assert!(matches!(outcome, TickOutcome::NotReady));
        assert_eq!(detector.state().name(), "warming");

        // The failed tick did not consume the time gate.
        let outcome = detector.tick(at(&mut source, 100), now).unwrap();
        assert!(matches!(outcome, TickOutcome::Baseline { .. }));
    }

    #[test]
    fn test_tile_larger_than_capture_fails_fast() {
        let (mut detector, _) = detector(DetectorConfig {
            scale_factor: 0.2,
            tile_size: 4,
            ..Default::default()
        });
        // 15 * 0.2 = 3 pixels, smaller than one tile.
        let mut source = MockVideoSource::new(15, 100);

        let result = detector.tick(&mut source, Instant::now());
        assert!(matches!(
            result,
            Err(DetectorError::Config(ConfigError::TileLargerThanCapture {
                tile_size: 4,
                width: 3,
                ..
            }))
        ));
    }

    #[test]
    fn test_shrink_below_tile_mid_run_fails_fast() {
        let (mut detector, sent) = detector(config());
        let mut source = MockVideoSource::new(8, 8);
        let now = Instant::now();

        assert!(detector.tick(at(&mut source, 0), now).unwrap().sampled());
        source.resize(3, 3);

        let result = detector.tick(at(&mut source, 600), now);
        assert!(matches!(
            result,
            Err(DetectorError::Config(ConfigError::TileLargerThanCapture {
                tile_size: 4,
                width: 3,
                height: 3,
            }))
        ));
        assert_eq!(detector.state().name(), "steady");
        assert_eq!(detector.stats().resolution_resets, 0);
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn test_resolution_change_resets_to_baseline() {
        let (mut detector, sent) = detector(config());
        let mut source = MockVideoSource::new(8, 8);
        let now = Instant::now();

        detector.tick(at(&mut source, 0), now).unwrap();
        source.resize(16, 8);
        source.fill([255, 255, 255]);

        let outcome = detector.tick(at(&mut source, 600), now).unwrap();
        assert!(matches!(outcome, TickOutcome::Baseline { cols: 4, rows: 2 }));
        assert_eq!(detector.stats().resolution_resets, 1);
        assert!(sent.borrow().is_empty());

        let outcome = detector.tick(at(&mut source, 1200), now).unwrap();
        assert!(matches!(outcome, TickOutcome::Compared(_)));
    }

    #[test]
    fn test_backwards_seek_is_processed() {
        let (mut detector, _) = detector(config());
        let mut source = MockVideoSource::new(8, 8);
        let now = Instant::now();

        detector.tick(at(&mut source, 5000), now).unwrap();
        let outcome = detector.tick(at(&mut source, 100), now).unwrap();
        assert!(outcome.sampled());
    }

    #[test]
    fn test_reset_keeps_throttle() {
        let (mut detector, sent) = detector(config());
        let mut source = MockVideoSource::new(8, 8);
        let t0 = Instant::now();

        detector.tick(at(&mut source, 0), t0).unwrap();
        source.fill([255, 255, 255]);
        detector.tick(at(&mut source, 600), t0).unwrap();

        detector.reset();
        assert_eq!(detector.state(), &DetectorState::Uninitialized);
        assert!(detector.throttle().last_alert_at().is_some());

        detector.tick(at(&mut source, 700), t0).unwrap();
        source.fill([0, 0, 0]);
        let outcome = detector
            .tick(at(&mut source, 1300), t0 + Duration::from_secs(1))
            .unwrap();
        assert!(!outcome.alerted());
        assert_eq!(sent.borrow().len(), 1);
    }
}
