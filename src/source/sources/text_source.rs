use std::path::PathBuf;

use tracing::{debug, warn};

use crate::config::ColumnFormat;
use crate::constants::text::{
    COMMENT_PREFIX, DEFAULT_DELIMITERS, IMPLICIT_RATING, SKIP_MALFORMED_MSG,
};
use crate::data::{RatingDataset, RatingRecord};
use crate::errors::SplitterError;
use crate::source::RatingSource;
use crate::transport::fs::read_source_text;
use crate::types::SourceId;
use crate::utils::{binarize, parse_rating, parse_timestamp, split_fields};

/// Configuration for a delimited-text rating file.
#[derive(Clone, Debug)]
pub struct TextSourceConfig {
    /// Stable source identifier used in errors and logs.
    pub source_id: SourceId,
    /// Path of the rating file.
    pub path: PathBuf,
    /// Expected column layout (`UIRT` requires a fourth timestamp column).
    pub column_format: ColumnFormat,
    /// Characters that separate fields; consecutive delimiters collapse.
    pub delimiters: Vec<char>,
    /// Optional threshold turning ratings into `1.0` (above) or `0.0`.
    pub binarize_threshold: Option<f64>,
    /// Skip malformed lines with a warning instead of failing the load.
    pub skip_malformed: bool,
}

impl TextSourceConfig {
    /// Create a config for a text source with explicit id and path.
    pub fn new(source_id: impl Into<SourceId>, path: impl Into<PathBuf>) -> Self {
        Self {
            source_id: source_id.into(),
            path: path.into(),
            column_format: ColumnFormat::Uir,
            delimiters: DEFAULT_DELIMITERS.to_vec(),
            binarize_threshold: None,
            skip_malformed: false,
        }
    }

    /// Override the column layout.
    pub fn with_column_format(mut self, column_format: ColumnFormat) -> Self {
        self.column_format = column_format;
        self
    }

    /// Override the delimiter set.
    pub fn with_delimiters(mut self, delimiters: impl IntoIterator<Item = char>) -> Self {
        self.delimiters = delimiters.into_iter().collect();
        self
    }

    /// Binarize ratings against `threshold`.
    pub fn with_binarize_threshold(mut self, threshold: f64) -> Self {
        self.binarize_threshold = Some(threshold);
        self
    }

    /// Set whether malformed lines are skipped.
    pub fn with_skip_malformed(mut self, skip_malformed: bool) -> Self {
        self.skip_malformed = skip_malformed;
        self
    }
}

/// Rating source over `user item rating [timestamp]` lines.
pub struct TextRatingSource {
    config: TextSourceConfig,
}

impl TextRatingSource {
    /// Create a text source from configuration.
    pub fn new(config: TextSourceConfig) -> Self {
        Self { config }
    }

    /// Source configuration.
    pub fn config(&self) -> &TextSourceConfig {
        &self.config
    }

    /// Parse already-loaded file contents.
    pub fn parse_str(&self, text: &str) -> Result<RatingDataset, SplitterError> {
        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
                continue;
            }
            match self.parse_line(trimmed) {
                Ok(record) => records.push(record),
                Err(reason) if self.config.skip_malformed => {
                    warn!(
                        source_id = %self.config.source_id,
                        line = idx + 1,
                        reason = %reason,
                        SKIP_MALFORMED_MSG
                    );
                    skipped += 1;
                }
                Err(reason) => {
                    return Err(SplitterError::Ingestion {
                        source_id: self.config.source_id.clone(),
                        line: idx + 1,
                        reason,
                    });
                }
            }
        }
        debug!(
            source_id = %self.config.source_id,
            records = records.len(),
            skipped,
            format = %self.config.column_format,
            "parsed delimited rating text"
        );
        Ok(RatingDataset::new(records, self.config.column_format))
    }

    fn parse_line(&self, line: &str) -> Result<RatingRecord, String> {
        let fields: Vec<&str> = split_fields(line, &self.config.delimiters).collect();
        let (user, item) = match fields.as_slice() {
            [user, item, ..] => (*user, *item),
            _ => return Err(format!("expected user and item fields, got '{line}'")),
        };
        let uirt = self.config.column_format.has_timestamps();
        let value = match fields.get(2) {
            Some(raw) => parse_rating(raw).ok_or_else(|| format!("invalid rating '{raw}'"))?,
            None if uirt => return Err("missing rating field".to_string()),
            None => IMPLICIT_RATING,
        };
        let value = binarize(value, self.config.binarize_threshold);
        if !uirt {
            return Ok(RatingRecord::new(user, item, value));
        }
        let raw = fields
            .get(3)
            .ok_or_else(|| "missing timestamp field".to_string())?;
        let timestamp = parse_timestamp(raw).ok_or_else(|| format!("invalid timestamp '{raw}'"))?;
        Ok(RatingRecord::with_timestamp(user, item, value, timestamp))
    }
}

impl RatingSource for TextRatingSource {
    fn id(&self) -> &str {
        &self.config.source_id
    }

    fn load(&self) -> Result<RatingDataset, SplitterError> {
        let text = read_source_text(&self.config.source_id, &self.config.path)?;
        self.parse_str(&text)
    }
}
