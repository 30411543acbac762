//! Tile-wise differencing between consecutive luminance grids.

use crate::reduction::{GridError, LuminanceGrid, TileGrid};
use std::ops::Deref;

/// Absolute per-tile luminance change between two grids.
///
/// Same shape and row-major layout as the grids it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffGrid(TileGrid);

impl DiffGrid {
    /// Number of tiles whose change is strictly greater than `threshold`.
    pub fn count_exceeding(&self, threshold: f64) -> usize {
        count_exceeding(self, threshold)
    }
}

impl Deref for DiffGrid {
    type Target = TileGrid;

    fn deref(&self) -> &TileGrid {
        &self.0
    }
}

/// Computes `|current - previous|` tile by tile.
///
/// Grids of different shape are rejected rather than truncated or padded.
pub fn diff(previous: &LuminanceGrid, current: &LuminanceGrid) -> Result<DiffGrid, GridError> {
    previous.ensure_same_shape(current)?;

    let values = previous
        .values()
        .iter()
        .zip(current.values())
        .map(|(&p, &c)| (c - p).abs())
        .collect();

    TileGrid::from_values(previous.cols(), previous.rows(), values).map(DiffGrid)
}

/// Number of entries strictly greater than `threshold`.
pub fn count_exceeding(diff: &DiffGrid, threshold: f64) -> usize {
    diff.values().iter().filter(|&&v| v > threshold).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(cols: usize, rows: usize, values: &[f64]) -> LuminanceGrid {
        LuminanceGrid::from_values(cols, rows, values.to_vec()).unwrap()
    }

    #[test]
    fn test_absolute_difference() {
        let previous = grid(2, 2, &[0.0, 0.5, 1.0, 0.25]);
        let current = grid(2, 2, &[1.0, 0.25, 1.0, 0.5]);

        let d = diff(&previous, &current).unwrap();
        assert_eq!(d.values(), &[1.0, 0.25, 0.0, 0.25]);
    }

    #[test]
    fn test_identical_grids_zero_difference() {
        let a = grid(3, 1, &[0.1, 0.7, 0.3]);
        let d = diff(&a, &a).unwrap();

        assert!(d.values().iter().all(|&v| v == 0.0));
        assert_eq!(d.count_exceeding(0.0), 0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let previous = grid(4, 1, &[0.0; 4]);
        let current = grid(4, 1, &[0.1, 0.15, 0.2, 0.9]);
        let d = diff(&previous, &current).unwrap();

        assert_eq!(count_exceeding(&d, 0.15), 2);
        assert_eq!(count_exceeding(&d, 0.9), 0);
        assert_eq!(count_exceeding(&d, 0.0), 4);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let a = grid(2, 2, &[0.0; 4]);
        let b = grid(4, 1, &[0.0; 4]);
        assert!(matches!(
            diff(&a, &b),
            Err(GridError::ShapeMismatch { .. })
        ));

        let c = grid(3, 2, &[0.0; 6]);
        assert!(diff(&a, &c).is_err());
    }
}
