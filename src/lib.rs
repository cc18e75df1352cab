#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Splitter configuration types.
pub mod config;
/// Centralized constants used across config, sources, and fold assignment.
pub mod constants;
/// Rating records and the ingested dataset.
pub mod data;
/// Fold assignment over record positions.
pub mod folds;
mod hash;
/// Raw-identifier to dense-index interning.
pub mod index;
/// Compressed sparse row matrices.
pub mod matrix;
/// Fold balance metrics.
pub mod metrics;
mod rng;
/// Rating source traits and built-in sources.
pub mod source;
/// K-fold cursor and fold iteration.
pub mod splitter;
/// Input transports used by sources.
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Field splitting and value parsing helpers.
pub mod utils;

mod errors;

pub use config::{ColumnFormat, DuplicatePolicy, FoldPolicy, SplitterConfig};
pub use data::{RatingDataset, RatingRecord};
pub use errors::SplitterError;
pub use folds::{FoldAssignment, assign_folds};
pub use index::IdentifierIndex;
pub use matrix::{MatrixBuilder, SparseMatrix, SparseRow, SparseValue};
pub use metrics::{FoldBalance, FoldShare};
pub use source::{
    ArffRatingSource, ArffSourceConfig, InMemoryRatingSource, RatingSource, TextRatingSource,
    TextSourceConfig, open_rating_source,
};
pub use splitter::{FoldIter, FoldSplit, KcvSplitter};
pub use types::{DenseIndex, FoldId, RawId, SourceId, Timestamp};
