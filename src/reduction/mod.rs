//! Frame downsampling into luminance tiles.
//!
//! This module turns a captured frame into a coarse grid of average
//! luminance values. Grids are the only thing the diff stage sees.

mod grid;
mod tile;

pub use grid::{GridError, TileGrid};
pub use tile::{luminance, LuminanceGrid, TileReducer};
