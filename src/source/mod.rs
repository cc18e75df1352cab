//! Rating source interfaces.
//!
//! Ownership model:
//! - `RatingSource` is the splitter-facing capability: it turns some input into
//!   an ordered `RatingDataset`.
//! - Each file format has its own implementation under `sources`; the splitter
//!   never depends on a concrete parser type.

use std::path::Path;

use crate::config::ColumnFormat;
use crate::data::{RatingDataset, RatingRecord};
use crate::errors::SplitterError;
use crate::transport::fs::has_extension;
use crate::types::SourceId;

/// Source implementation modules.
pub mod sources;

pub use sources::arff_source::{ArffRatingSource, ArffSourceConfig};
pub use sources::text_source::{TextRatingSource, TextSourceConfig};

/// Splitter-facing rating source interface.
///
/// For unchanged input, `load` must return the same records in the same
/// order; dense indices and fold assignments are derived from that order.
pub trait RatingSource: Send + Sync {
    /// Stable source identifier used in errors and logs.
    fn id(&self) -> &str;

    /// Parse the full input into an ordered dataset.
    fn load(&self) -> Result<RatingDataset, SplitterError>;
}

/// In-memory rating source for tests and programmatic use.
pub struct InMemoryRatingSource {
    id: SourceId,
    records: Vec<RatingRecord>,
    column_format: ColumnFormat,
}

impl InMemoryRatingSource {
    /// Create an in-memory source from prebuilt records.
    pub fn new(
        id: impl Into<SourceId>,
        records: Vec<RatingRecord>,
        column_format: ColumnFormat,
    ) -> Self {
        Self {
            id: id.into(),
            records,
            column_format,
        }
    }
}

impl RatingSource for InMemoryRatingSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> Result<RatingDataset, SplitterError> {
        Ok(RatingDataset::new(self.records.clone(), self.column_format))
    }
}

/// Pick a file-backed source by extension: `.arff` files use the ARFF
/// parser, everything else is read as delimited text in `column_format`.
pub fn open_rating_source(
    source_id: impl Into<SourceId>,
    path: &Path,
    column_format: ColumnFormat,
) -> Box<dyn RatingSource> {
    if has_extension(path, "arff") {
        Box::new(ArffRatingSource::new(ArffSourceConfig::new(source_id, path)))
    } else {
        Box::new(TextRatingSource::new(
            TextSourceConfig::new(source_id, path).with_column_format(column_format),
        ))
    }
}
