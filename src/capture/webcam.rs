//! Webcam-backed video source.

use super::{Frame, PixelFormat, SourceError, VideoSource};
use image::{imageops, RgbImage};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use std::time::{Duration, Instant};

/// Live camera stream. Playback time is wall time since the stream opened.
pub struct WebcamSource {
    camera: Camera,
    opened_at: Instant,
    sequence: u64,
}

impl WebcamSource {
    /// Opens the camera at `device_index` and starts streaming.
    pub fn open(device_index: u32) -> Result<Self, SourceError> {
        let index = CameraIndex::Index(device_index);
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

        let mut camera = Camera::new(index, requested)
            .map_err(|e| SourceError::DeviceNotFound(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| SourceError::OpenFailed(e.to_string()))?;

        let resolution = camera.resolution();
        tracing::info!(
            device = device_index,
            width = resolution.width(),
            height = resolution.height(),
            "Webcam stream opened"
        );

        Ok(Self {
            camera,
            opened_at: Instant::now(),
            sequence: 0,
        })
    }
}

impl VideoSource for WebcamSource {
    fn current_time(&self) -> Duration {
        self.opened_at.elapsed()
    }

    fn dimensions(&self) -> (u32, u32) {
        let resolution = self.camera.resolution();
        (resolution.width(), resolution.height())
    }

    fn capture(&mut self, width: u32, height: u32) -> Result<Frame, SourceError> {
        let timestamp = self.current_time();
        let buffer = self
            .camera
            .frame()
            .map_err(|e| SourceError::CaptureFailed(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| SourceError::CaptureFailed(e.to_string()))?;

        let (natural_width, natural_height) = (decoded.width(), decoded.height());
        let image = RgbImage::from_raw(natural_width, natural_height, decoded.into_raw())
            .ok_or_else(|| SourceError::CaptureFailed("decoded buffer size mismatch".into()))?;

        let scaled = if (natural_width, natural_height) == (width, height) {
            image
        } else {
            imageops::resize(&image, width, height, imageops::FilterType::Triangle)
        };

        self.sequence += 1;
        Ok(Frame::new(
            scaled.into_raw(),
            width,
            height,
            PixelFormat::Rgb8,
            timestamp,
            self.sequence,
        ))
    }
}

impl Drop for WebcamSource {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            tracing::warn!(error = %e, "Failed to stop webcam stream");
        }
    }
}
