/// Raw user or item identifier as it appears in an input file.
/// Examples: `u17`, `42`, `tt0111161`
pub type RawId = String;
/// Identifier for the source that produced a dataset.
/// Examples: `ratings-text`, `ratings-arff`
pub type SourceId = String;
/// Zero-based dense index assigned to a raw identifier.
pub type DenseIndex = usize;
/// Zero-based fold number in `0..fold_count`.
pub type FoldId = usize;
/// Rating timestamp in seconds (or whatever epoch unit the input uses).
/// Example: `1112486027`
pub type Timestamp = i64;
