use std::io;

use thiserror::Error;

use crate::types::SourceId;

/// Error type for configuration, cursor misuse, ingestion, and matrix failures.
#[derive(Debug, Error)]
pub enum SplitterError {
    /// Invalid fold count, unknown policy name, or a column format the data cannot satisfy.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Cursor used out of order.
    #[error("splitter state error: {0}")]
    State(String),
    /// Malformed input line.
    #[error("rating source '{source_id}' failed at line {line}: {reason}")]
    Ingestion {
        /// Source that produced the line.
        source_id: SourceId,
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
    /// Source file missing or unreadable.
    #[error("rating source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable {
        /// Source that failed to open.
        source_id: SourceId,
        /// Path and underlying error.
        reason: String,
    },
    /// Entry pushed outside the declared matrix shape.
    #[error("matrix entry ({row}, {col}) lies outside a {rows}x{cols} matrix")]
    MatrixBounds {
        /// Offending row.
        row: usize,
        /// Offending column.
        col: usize,
        /// Declared row count.
        rows: usize,
        /// Declared column count.
        cols: usize,
    },
    /// Other I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}
