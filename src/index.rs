//! Bidirectional raw-id ↔ dense-index mapping.

use indexmap::IndexSet;

use crate::types::{DenseIndex, RawId};

/// Assigns contiguous zero-based indices to raw identifiers in first-seen order.
///
/// The position of a raw id inside the backing `IndexSet` is its dense index,
/// so both directions are O(1) and the numbering never changes once assigned.
#[derive(Clone, Debug, Default)]
pub struct IdentifierIndex {
    ids: IndexSet<RawId>,
}

impl IdentifierIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the dense index of `raw`, assigning the next one if unseen.
    pub fn intern(&mut self, raw: &str) -> DenseIndex {
        if let Some(idx) = self.ids.get_index_of(raw) {
            return idx;
        }
        self.ids.insert_full(raw.to_string()).0
    }

    /// Dense index of `raw`, if it has been interned.
    pub fn index_of(&self, raw: &str) -> Option<DenseIndex> {
        self.ids.get_index_of(raw)
    }

    /// Raw identifier behind `index`.
    pub fn raw_id(&self, index: DenseIndex) -> Option<&str> {
        self.ids.get_index(index).map(String::as_str)
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no identifier has been interned.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Raw identifiers in dense-index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

// `IndexSet` equality ignores order; dense numbering does not.
impl PartialEq for IdentifierIndex {
    fn eq(&self, other: &Self) -> bool {
        self.ids.iter().eq(other.ids.iter())
    }
}

impl Eq for IdentifierIndex {}

impl<S: AsRef<str>> FromIterator<S> for IdentifierIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = Self::new();
        for raw in iter {
            index.intern(raw.as_ref());
        }
        index
    }
}
