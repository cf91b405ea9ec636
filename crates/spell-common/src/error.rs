//! Error types for grid construction and coordinate handling.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while building or slicing a grid.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    // === Shape Errors ===
    #[error("grid shape mismatch: axes describe {expected} values, data holds {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("axis '{axis}' is not strictly monotonic at index {index}")]
    NonMonotonicAxis { axis: String, index: usize },

    #[error("axis '{axis}' repeats a coordinate at index {index}")]
    DuplicateCoordinate { axis: String, index: usize },

    #[error("axis '{0}' is empty")]
    EmptyAxis(String),

    #[error("axis mismatch: {0}")]
    AxisMismatch(String),

    // === Calendar Errors ===
    #[error("day of year must be within 1..=366, got {0}")]
    InvalidDayOfYear(u16),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    // === Subsetting Errors ===
    #[error("bounding box selects no grid cells")]
    EmptySubset,

    #[error("invalid bounding box: {0}")]
    InvalidBbox(String),
}

impl GridError {
    /// Create a NonMonotonicAxis error.
    pub fn non_monotonic(axis: impl Into<String>, index: usize) -> Self {
        Self::NonMonotonicAxis {
            axis: axis.into(),
            index,
        }
    }

    /// Create a DuplicateCoordinate error.
    pub fn duplicate(axis: impl Into<String>, index: usize) -> Self {
        Self::DuplicateCoordinate {
            axis: axis.into(),
            index,
        }
    }

    /// Create an AxisMismatch error.
    pub fn axis_mismatch(msg: impl Into<String>) -> Self {
        Self::AxisMismatch(msg.into())
    }
}

impl From<chrono::ParseError> for GridError {
    fn from(err: chrono::ParseError) -> Self {
        GridError::InvalidDate(err.to_string())
    }
}
