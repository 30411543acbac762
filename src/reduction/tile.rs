//! Tile reduction: frame pixels to a coarse luminance grid.
//!
//! Each tile averages the perceptual luminance of the pixels it covers.
//! Trailing tiles on the right and bottom edges are kept and averaged
//! over the pixels that actually exist.

use super::grid::{GridError, TileGrid};
use crate::capture::{ConfigError, Frame};
use std::ops::Deref;

/// Perceptual luminance of an 8-bit RGB sample, in `[0, 1]`.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) / 255.0 + 0.587 * f64::from(g) / 255.0 + 0.114 * f64::from(b) / 255.0
}

/// Per-tile average luminance of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LuminanceGrid(TileGrid);

impl LuminanceGrid {
    /// Builds a grid from row-major values.
    pub fn from_values(cols: usize, rows: usize, values: Vec<f64>) -> Result<Self, GridError> {
        TileGrid::from_values(cols, rows, values).map(Self)
    }
}

impl Deref for LuminanceGrid {
    type Target = TileGrid;

    fn deref(&self) -> &TileGrid {
        &self.0
    }
}

/// Reduces frames to luminance grids with a fixed tile edge.
#[derive(Debug, Clone, Copy)]
pub struct TileReducer {
    tile_size: u32,
}

impl TileReducer {
    /// Creates a reducer; `tile_size` must be at least 1.
    pub fn new(tile_size: u32) -> Result<Self, ConfigError> {
        if tile_size == 0 {
            return Err(ConfigError::InvalidTileSize);
        }
        Ok(Self { tile_size })
    }

    /// Tile edge in pixels.
    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// `(cols, rows)` of the grid produced for a `width` x `height` buffer.
    pub fn grid_shape(&self, width: u32, height: u32) -> (usize, usize) {
        (
            width.div_ceil(self.tile_size) as usize,
            height.div_ceil(self.tile_size) as usize,
        )
    }

    /// Reduces a frame to its luminance grid.
    pub fn reduce(&self, frame: &Frame) -> Result<LuminanceGrid, GridError> {
        if frame.is_empty() {
            return Err(GridError::EmptyFrame);
        }
        if !frame.is_valid() {
            return Err(GridError::InvalidFrame {
                expected: frame.pixel_count() * frame.format().bytes_per_pixel(),
                found: frame.pixels().len(),
            });
        }
        let (width, height) = (frame.width(), frame.height());
        if self.tile_size > width.min(height) {
            return Err(GridError::FrameSmallerThanTile {
                width,
                height,
                tile_size: self.tile_size,
            });
        }

        let (cols, rows) = self.grid_shape(width, height);
        let tile = self.tile_size;
        let grid = TileGrid::from_fn(cols, rows, |row, col| {
            let x0 = col as u32 * tile;
            let y0 = row as u32 * tile;
            let x1 = (x0 + tile).min(width);
            let y1 = (y0 + tile).min(height);

            let mut sum = 0.0;
            for y in y0..y1 {
                for x in x0..x1 {
                    let [r, g, b] = frame.rgb(x, y);
                    sum += luminance(r, g, b);
                }
            }
            sum / f64::from((x1 - x0) * (y1 - y0))
        });

        tracing::trace!(
            sequence = frame.sequence(),
            cols,
            rows,
            "Reduced frame to luminance grid"
        );

        Ok(LuminanceGrid(grid))
    }
}
