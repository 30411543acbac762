//! Two-dimensional tile grid.
//!
//! Values are stored row-major (left-to-right, top-to-bottom) so the
//! flat order matches the preview renderer; callers address cells by
//! `(row, col)` instead of computing strides.

use thiserror::Error;

/// Errors raised while building or combining grids.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid shape mismatch: expected {expected_cols}x{expected_rows}, found {found_cols}x{found_rows}")]
    ShapeMismatch {
        expected_cols: usize,
        expected_rows: usize,
        found_cols: usize,
        found_rows: usize,
    },
    #[error("grid of {cols}x{rows} needs {expected} values, got {found}")]
    LengthMismatch {
        cols: usize,
        rows: usize,
        expected: usize,
        found: usize,
    },
    #[error("frame has zero area")]
    EmptyFrame,
    #[error("frame buffer holds {found} bytes, expected {expected}")]
    InvalidFrame { expected: usize, found: usize },
    #[error("frame {width}x{height} is smaller than one {tile_size}px tile")]
    FrameSmallerThanTile {
        width: u32,
        height: u32,
        tile_size: u32,
    },
}

/// A `cols` x `rows` grid of floating-point cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    cols: usize,
    rows: usize,
    values: Vec<f64>,
}

impl TileGrid {
    /// Wraps row-major values, checking the length against the shape.
    pub fn from_values(cols: usize, rows: usize, values: Vec<f64>) -> Result<Self, GridError> {
        let expected = cols * rows;
        if values.len() != expected {
            return Err(GridError::LengthMismatch {
                cols,
                rows,
                expected,
                found: values.len(),
            });
        }
        Ok(Self { cols, rows, values })
    }

    /// Builds a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn(cols: usize, rows: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                values.push(f(row, col));
            }
        }
        Self { cols, rows, values }
    }

    /// Number of tile columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of tile rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the grid has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cell at `(row, col)`, or `None` out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.values[row * self.cols + col])
        } else {
            None
        }
    }

    /// All cells in row-major order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterates over `(row, col, value)` triples in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let cols = self.cols.max(1);
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i / cols, i % cols, v))
    }

    /// Largest cell value, `0.0` for an empty grid.
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Fails unless `other` has the same shape.
    pub fn ensure_same_shape(&self, other: &TileGrid) -> Result<(), GridError> {
        if self.cols == other.cols && self.rows == other.rows {
            Ok(())
        } else {
            Err(GridError::ShapeMismatch {
                expected_cols: self.cols,
                expected_rows: self.rows,
                found_cols: other.cols,
                found_rows: other.rows,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_addressing() {
        let grid = TileGrid::from_values(3, 2, vec![0.0, 0.1, 0.2, 1.0, 1.1, 1.2]).unwrap();

        assert_eq!(grid.get(0, 2), Some(0.2));
        assert_eq!(grid.get(1, 0), Some(1.0));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 3), None);
    }

    #[test]
    fn test_from_fn_matches_get() {
        let grid = TileGrid::from_fn(4, 3, |row, col| (row * 10 + col) as f64);
        for (row, col, value) in grid.cells() {
            assert_eq!(grid.get(row, col), Some(value));
            assert_eq!(value, (row * 10 + col) as f64);
        }
        assert_eq!(grid.len(), 12);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(matches!(
            TileGrid::from_values(2, 2, vec![0.0; 3]),
            Err(GridError::LengthMismatch {
                expected: 4,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_shape_check() {
        let a = TileGrid::from_fn(2, 2, |_, _| 0.0);
        let b = TileGrid::from_fn(4, 1, |_, _| 0.0);
        assert!(a.ensure_same_shape(&a.clone()).is_ok());
        assert!(matches!(
            a.ensure_same_shape(&b),
            Err(GridError::ShapeMismatch { .. })
        ));
    }
}
