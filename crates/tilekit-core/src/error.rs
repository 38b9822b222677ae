//! Error handling for Tilekit
//!
//! The placement engine reports expected, recoverable failures (an unknown
//! tile id, an operation before the puzzle exists, an out-of-range value)
//! through these types. Geometry code never fails.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Puzzle engine error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PuzzleError {
    /// The operation referenced a tile id that is not part of the puzzle,
    /// or that has no placement.
    #[error("Tile not found: {tile_id}")]
    NotFound {
        /// The unknown tile id.
        tile_id: String,
    },

    /// The operation was attempted before the puzzle was initialized.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A scale, crop or tile dimension is outside its legal bounds.
    #[error("Value out of range for '{field}': {value}")]
    OutOfRange {
        /// Name of the offending field.
        field: String,
        /// The rejected value, formatted.
        value: String,
    },
}

impl PuzzleError {
    pub fn not_found(tile_id: impl Into<String>) -> Self {
        Self::NotFound {
            tile_id: tile_id.into(),
        }
    }

    pub fn out_of_range(field: impl Into<String>, value: impl ToString) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

/// Result type alias for puzzle operations.
pub type PuzzleResult<T> = Result<T, PuzzleError>;
