use std::fmt;

use serde::Serialize;

use super::error::ShapeError;
use super::layout;

/// Structural decoding strategy selected from an output's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ShapeStrategy {
    /// Rank 1: a single value. The dimension itself is not consulted.
    Scalar,
    /// Rank 2 with a leading (batch) dimension of one.
    #[serde(rename = "array_1d")]
    Array1D { len: usize },
    /// Rank 2 with any other leading dimension, decoded row-major.
    #[serde(rename = "array_2d")]
    Array2D { rows: usize, cols: usize },
}

impl ShapeStrategy {
    /// Number of elements a string payload must carry for this strategy.
    pub fn element_count(&self) -> usize {
        match *self {
            ShapeStrategy::Scalar => 1,
            ShapeStrategy::Array1D { len } => len,
            ShapeStrategy::Array2D { rows, cols } => rows.saturating_mul(cols),
        }
    }
}

impl fmt::Display for ShapeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeStrategy::Scalar => write!(f, "scalar"),
            ShapeStrategy::Array1D { len } => write!(f, "1-D array [{len}]"),
            ShapeStrategy::Array2D { rows, cols } => write!(f, "2-D array [{rows}x{cols}]"),
        }
    }
}

/// Classify a shape into one of the three supported strategies.
///
/// A leading dimension of one is read as a batch of one, so `[1, n]` is a
/// plain array of `n` elements rather than a single-row matrix. A leading
/// dimension of zero is an empty matrix.
///
/// # Examples
/// ```
/// use tensorbind_core::{ShapeStrategy, classify_shape};
///
/// assert_eq!(classify_shape(&[1]).unwrap(), ShapeStrategy::Scalar);
/// assert_eq!(classify_shape(&[1, 3]).unwrap(), ShapeStrategy::Array1D { len: 3 });
/// assert_eq!(
///     classify_shape(&[2, 3]).unwrap(),
///     ShapeStrategy::Array2D { rows: 2, cols: 3 }
/// );
/// assert!(classify_shape(&[1, 2, 3]).is_err());
/// ```
///
/// # Errors
/// Returns `ShapeError::UnsupportedRank` for rank 0 or above 2, and
/// `ShapeError::InvalidDimension` for negative or overflowing dimensions,
/// or an outer dimension larger than `layout::MAX_ROWS`.
pub fn classify(shape: &[i64]) -> Result<ShapeStrategy, ShapeError> {
    match shape.len() {
        layout::SCALAR_RANK => Ok(ShapeStrategy::Scalar),
        layout::ARRAY_RANK => {
            let invalid = || ShapeError::InvalidDimension {
                shape: shape.to_vec(),
            };
            let rows = usize::try_from(shape[0]).map_err(|_| invalid())?;
            let cols = usize::try_from(shape[1]).map_err(|_| invalid())?;
            rows.checked_mul(cols).ok_or_else(invalid)?;
            if rows > layout::MAX_ROWS {
                return Err(invalid());
            }
            if shape[0] == layout::SINGLE_BATCH {
                Ok(ShapeStrategy::Array1D { len: cols })
            } else {
                Ok(ShapeStrategy::Array2D { rows, cols })
            }
        }
        rank => Err(ShapeError::UnsupportedRank { rank }),
    }
}
