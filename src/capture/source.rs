//! Video source abstraction for frame capture.
//!
//! A source exposes its playback clock and natural size, and can draw its
//! current content into a buffer of any requested size. The detector only
//! ever talks to this trait, so real cameras and scripted mocks are
//! interchangeable.

use super::{Frame, PixelFormat};
use image::{imageops, Rgba, RgbaImage};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during source operations.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("video source device not found: {0}")]
    DeviceNotFound(String),
    #[error("failed to open video source: {0}")]
    OpenFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("video source not ready")]
    NotReady,
}

/// Trait for video sources feeding the detector.
pub trait VideoSource {
    /// Current playback time of the stream.
    fn current_time(&self) -> Duration;

    /// Natural width and height. `(0, 0)` while the stream has no video yet.
    fn dimensions(&self) -> (u32, u32);

    /// Draws the current content scaled to `width` x `height`.
    fn capture(&mut self, width: u32, height: u32) -> Result<Frame, SourceError>;
}

/// Scripted in-memory source for tests and demos.
///
/// Holds one scene image at natural resolution; callers paint it and move
/// the playback clock explicitly.
#[derive(Debug, Clone)]
pub struct MockVideoSource {
    scene: RgbaImage,
    time: Duration,
    ready: bool,
    fail_next: bool,
    sequence: u64,
}

impl MockVideoSource {
    /// Creates a ready source showing a black scene.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            scene: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
            time: Duration::ZERO,
            ready: true,
            fail_next: false,
            sequence: 0,
        }
    }

    /// Creates a source that reports zero dimensions until [`mark_ready`](Self::mark_ready).
    pub fn pending(width: u32, height: u32) -> Self {
        Self {
            ready: false,
            ..Self::new(width, height)
        }
    }

    /// Makes the natural dimensions visible.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Sets the playback clock.
    pub fn set_time(&mut self, time: Duration) {
        self.time = time;
    }

    /// Advances the playback clock.
    pub fn advance(&mut self, delta: Duration) {
        self.time += delta;
    }

    /// Paints the whole scene with one color.
    pub fn fill(&mut self, rgb: [u8; 3]) {
        let pixel = Rgba([rgb[0], rgb[1], rgb[2], 255]);
        for p in self.scene.pixels_mut() {
            *p = pixel;
        }
    }

    /// Paints a rectangle, clipped to the scene.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, rgb: [u8; 3]) {
        let pixel = Rgba([rgb[0], rgb[1], rgb[2], 255]);
        let x_end = x.saturating_add(width).min(self.scene.width());
        let y_end = y.saturating_add(height).min(self.scene.height());
        for py in y..y_end {
            for px in x..x_end {
                self.scene.put_pixel(px, py, pixel);
            }
        }
    }

    /// Replaces the scene with a black one of a different natural size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    }

    /// Makes the next capture fail once.
    pub fn fail_next_capture(&mut self) {
        self.fail_next = true;
    }

    /// Number of frames captured so far.
    pub fn captured(&self) -> u64 {
        self.sequence
    }
}

impl VideoSource for MockVideoSource {
    fn current_time(&self) -> Duration {
        self.time
    }

    fn dimensions(&self) -> (u32, u32) {
        if self.ready {
            self.scene.dimensions()
        } else {
            (0, 0)
        }
    }

    fn capture(&mut self, width: u32, height: u32) -> Result<Frame, SourceError> {
        if !self.ready {
            return Err(SourceError::NotReady);
        }
        if std::mem::take(&mut self.fail_next) {
            return Err(SourceError::CaptureFailed("scripted failure".to_string()));
        }

        let scaled = if self.scene.dimensions() == (width, height) {
            self.scene.clone()
        } else {
            imageops::resize(&self.scene, width, height, imageops::FilterType::Nearest)
        };

        self.sequence += 1;
        Ok(Frame::new(
            scaled.into_raw(),
            width,
            height,
            PixelFormat::Rgba8,
            self.time,
            self.sequence,
        ))
    }
}
