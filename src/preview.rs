//! Debug rendering of diff grids.
//!
//! Each tile is painted as a gray square whose brightness is the tile's
//! luminance change: 0 is black, 1 is white. Nothing in the detector
//! depends on this.

use crate::analysis::DiffGrid;
use crate::detector::CaptureSize;
use image::{GrayImage, Luma};
use std::path::Path;
use thiserror::Error;

/// Errors writing a preview image.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to write preview image: {0}")]
    Write(#[from] image::ImageError),
}

/// Renders `diff` at capture resolution.
pub fn render(diff: &DiffGrid, tile_size: u32, capture: CaptureSize) -> GrayImage {
    let tile = tile_size.max(1);
    let mut image = GrayImage::new(capture.width, capture.height);
    for (row, col, value) in diff.cells() {
        let shade = Luma([(value.clamp(0.0, 1.0) * 255.0).round() as u8]);
        let (x0, y0) = (col as u32 * tile, row as u32 * tile);
        for y in y0..y0.saturating_add(tile).min(capture.height) {
            for x in x0..x0.saturating_add(tile).min(capture.width) {
                image.put_pixel(x, y, shade);
            }
        }
    }
    image
}

/// Renders `diff` and writes it to `path`; the format follows the extension.
pub fn save(
    diff: &DiffGrid,
    tile_size: u32,
    capture: CaptureSize,
    path: impl AsRef<Path>,
) -> Result<(), PreviewError> {
    render(diff, tile_size, capture).save(path.as_ref())?;
    tracing::trace!(path = %path.as_ref().display(), "Preview written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::diff;
    use crate::reduction::LuminanceGrid;

    #[test]
    fn test_tiles_painted_by_magnitude() {
        let previous = LuminanceGrid::from_values(2, 2, vec![0.0; 4]).unwrap();
        let current = LuminanceGrid::from_values(2, 2, vec![1.0, 0.5, 0.0, 0.0]).unwrap();
        let d = diff(&previous, &current).unwrap();

        let image = render(
            &d,
            4,
            CaptureSize {
                width: 8,
                height: 8,
            },
        );

        assert_eq!(image.dimensions(), (8, 8));
        assert_eq!(image.get_pixel(0, 0), &Luma([255]));
        assert_eq!(image.get_pixel(3, 3), &Luma([255]));
        assert_eq!(image.get_pixel(4, 0), &Luma([128]));
        assert_eq!(image.get_pixel(7, 7), &Luma([0]));
    }

    #[test]
    fn test_partial_edge_tiles() {
        let previous = LuminanceGrid::from_values(2, 1, vec![0.0; 2]).unwrap();
        let current = LuminanceGrid::from_values(2, 1, vec![0.0, 1.0]).unwrap();
        let d = diff(&previous, &current).unwrap();

        let image = render(
            &d,
            4,
            CaptureSize {
                width: 6,
                height: 3,
            },
        );
        assert_eq!(image.get_pixel(5, 2), &Luma([255]));
        assert_eq!(image.get_pixel(3, 2), &Luma([0]));
    }

    #[test]
    fn test_save_writes_png() {
        let previous = LuminanceGrid::from_values(2, 2, vec![0.0; 4]).unwrap();
        let current = LuminanceGrid::from_values(2, 2, vec![0.0, 0.0, 1.0, 0.0]).unwrap();
        let d = diff(&previous, &current).unwrap();
        let capture = CaptureSize {
            width: 8,
            height: 8,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        save(&d, 4, capture, &path).unwrap();

        let written = image::open(&path).unwrap().to_luma8();
        assert_eq!(written, render(&d, 4, capture));
        assert_eq!(written.get_pixel(0, 7), &Luma([255]));
        assert_eq!(written.get_pixel(7, 0), &Luma([0]));
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let d = diff(
            &LuminanceGrid::from_values(1, 1, vec![0.0]).unwrap(),
            &LuminanceGrid::from_values(1, 1, vec![1.0]).unwrap(),
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("preview.png");

        let capture = CaptureSize {
            width: 4,
            height: 4,
        };
        assert!(matches!(
            save(&d, 4, capture, &path),
            Err(PreviewError::Write(_))
        ));
    }
}
