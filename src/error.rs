//! Error types for alignment construction and editing.
//!
//! Every fallible operation validates its inputs before touching the
//! alignment, so an `Err` always leaves the alignment exactly as it was.

use thiserror::Error;

/// Which axis of the grid an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Errors that can occur while building or editing an alignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{axis} index {index} out of range (0..{bound})")]
    OutOfRange {
        axis: Axis,
        index: usize,
        bound: usize,
    },

    #[error("Invalid column range {start}..{end} for alignment of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Invalid letter '{letter}' at row {row}, column {col}")]
    InvalidLetter { letter: char, row: usize, col: usize },

    #[error("Alphabet mismatch: expected {expected}, found {found}")]
    AlphabetMismatch { expected: String, found: String },
}

impl Error {
    /// True for errors where row or column counts cannot be reconciled.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Error::ShapeMismatch { .. })
    }

    /// True for index and range errors.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Error::OutOfRange { .. } | Error::InvalidRange { .. })
    }
}

/// Result type for alignment operations.
pub type Result<T> = std::result::Result<T, Error>;
