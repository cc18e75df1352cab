use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ColumnFormat;
use crate::index::IdentifierIndex;

pub use crate::types::{DenseIndex, RawId, Timestamp};

/// Canonical rating tuple produced by a `RatingSource`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    user: RawId,
    item: RawId,
    value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<Timestamp>,
}

impl RatingRecord {
    /// Create a record without a timestamp.
    pub fn new(user: impl Into<RawId>, item: impl Into<RawId>, value: f64) -> Self {
        Self {
            user: user.into(),
            item: item.into(),
            value,
            timestamp: None,
        }
    }

    /// Create a record carrying a timestamp.
    pub fn with_timestamp(
        user: impl Into<RawId>,
        item: impl Into<RawId>,
        value: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::new(user, item, value)
        }
    }

    /// Raw user identifier.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Raw item identifier.
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Rating value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Timestamp, when the source layout carries one.
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    /// Timestamp interpreted as seconds since the Unix epoch.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

/// Ordered rating store plus the identifier indices derived from it.
///
/// Indices are built by a single scan at construction time, so every raw id
/// present in `records` has a dense index before any fold is assigned.
#[derive(Clone, Debug)]
pub struct RatingDataset {
    records: Vec<RatingRecord>,
    column_format: ColumnFormat,
    users: IdentifierIndex,
    items: IdentifierIndex,
    dense: Vec<(DenseIndex, DenseIndex)>,
}

impl RatingDataset {
    /// Build a dataset (and its user/item indices) from ordered records.
    pub fn new(records: Vec<RatingRecord>, column_format: ColumnFormat) -> Self {
        let mut users = IdentifierIndex::new();
        let mut items = IdentifierIndex::new();
        let dense = records
            .iter()
            .map(|record| (users.intern(&record.user), items.intern(&record.item)))
            .collect();
        Self {
            records,
            column_format,
            users,
            items,
            dense,
        }
    }

    /// Records in ingestion order.
    pub fn records(&self) -> &[RatingRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column layout reported by the source.
    pub fn column_format(&self) -> ColumnFormat {
        self.column_format
    }

    /// User identifier index (matrix rows).
    pub fn users(&self) -> &IdentifierIndex {
        &self.users
    }

    /// Item identifier index (matrix columns).
    pub fn items(&self) -> &IdentifierIndex {
        &self.items
    }

    /// Dense `(row, col)` of the record at `position`.
    pub fn dense_position(&self, position: usize) -> Option<(DenseIndex, DenseIndex)> {
        self.dense.get(position).copied()
    }

    /// Dense `(row, col)` of every record, in record order.
    pub fn dense_positions(&self) -> &[(DenseIndex, DenseIndex)] {
        &self.dense
    }

    /// Position of the first record lacking a timestamp, if any.
    pub fn first_missing_timestamp(&self) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.timestamp.is_none())
    }
}
