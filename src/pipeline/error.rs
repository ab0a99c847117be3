//! Error types for the RFM pipeline.
//!
//! Only malformed input and broken scoring invariants are errors. Degenerate
//! distributions and anonymous customers are handled in-band by the stages
//! that meet them.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the RFM pipeline.
#[derive(Debug, Error)]
pub enum RfmError {
    /// A required column is absent from the input table.
    #[error("Required column '{column}' not found. Available columns: {available:?}")]
    MissingColumn {
        /// Expected column name
        column: String,
        /// Columns actually present
        available: Vec<String>,
    },

    /// A cell could not be converted to the type its column requires.
    ///
    /// `row` is zero-based over data rows (the header is not counted).
    #[error("Malformed value in column '{column}' at row {row}: {reason}")]
    MalformedValue {
        /// Column holding the bad value
        column: String,
        /// Zero-based data row index
        row: usize,
        /// What went wrong
        reason: String,
    },

    /// A required (non-nullable) cell is empty.
    #[error("Missing required value in column '{column}' at row {row}")]
    MissingValue {
        /// Column holding the empty cell
        column: String,
        /// Zero-based data row index
        row: usize,
    },

    /// A datetime column carries a time zone that cannot be resolved.
    #[error("Column '{column}' has unknown time zone '{zone}'")]
    UnknownTimeZone {
        /// Column holding the timestamps
        column: String,
        /// Zone name as stored in the column dtype
        zone: String,
    },

    /// A monetary amount or total does not fit the decimal range.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// The underlying table could not be read or cast.
    #[error("Table error: {0}")]
    Table(#[from] PolarsError),

    /// Invalid segmenter configuration (e.g. inverted clip bounds).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The scoring contract was broken. Indicates a bug, not bad data.
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl RfmError {
    pub(crate) fn malformed(column: &str, row: usize, reason: impl Into<String>) -> Self {
        RfmError::MalformedValue {
            column: column.to_string(),
            row,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(column: &str, row: usize) -> Self {
        RfmError::MissingValue {
            column: column.to_string(),
            row,
        }
    }
}

/// Convenience alias used across the pipeline.
pub type RfmResult<T> = std::result::Result<T, RfmError>;
