/// Property keys and defaults recognized by `SplitterConfig`.
pub mod config {
    /// Property key holding the number of cross-validation folds.
    pub const CONF_FOLD_COUNT: &str = "data.splitter.cv.number";
    /// Property key holding the random seed used for fold assignment.
    pub const CONF_RANDOM_SEED: &str = "rec.random.seed";
    /// Property key holding the column format tag (`UIR` or `UIRT`).
    pub const CONF_COLUMN_FORMAT: &str = "data.column.format";
    /// Property key holding the fold policy (`shuffled` or `sequential`).
    pub const CONF_FOLD_POLICY: &str = "data.splitter.cv.policy";
    /// Property key holding the duplicate-entry policy (`overwrite` or `sum`).
    pub const CONF_DUPLICATE_POLICY: &str = "data.splitter.duplicate.policy";

    /// Default number of folds.
    pub const DEFAULT_FOLD_COUNT: usize = 5;
    /// Default fold-assignment seed.
    pub const DEFAULT_SEED: u64 = 42;
    /// Smallest fold count that still yields a train and a test partition.
    pub const MIN_FOLD_COUNT: usize = 2;
}

/// Constants used by the delimited-text rating source.
pub mod text {
    /// Default field delimiters (space, tab, comma, semicolon).
    pub const DEFAULT_DELIMITERS: [char; 4] = [' ', '\t', ',', ';'];
    /// Lines starting with this prefix are ignored.
    pub const COMMENT_PREFIX: char = '#';
    /// Rating assigned when a UIR line carries only user and item.
    pub const IMPLICIT_RATING: f64 = 1.0;
    /// Log message used when a malformed line is skipped.
    pub const SKIP_MALFORMED_MSG: &str = "skipping malformed rating line";
}

/// Constants used by the ARFF rating source.
pub mod arff {
    /// Comment prefix for ARFF files.
    pub const COMMENT_PREFIX: char = '%';
    /// Relation header keyword.
    pub const RELATION: &str = "@relation";
    /// Attribute declaration keyword.
    pub const ATTRIBUTE: &str = "@attribute";
    /// Data section keyword.
    pub const DATA: &str = "@data";
    /// Missing-value marker.
    pub const MISSING: &str = "?";
    /// Attribute names recognized as the user column.
    pub const USER_ATTRIBUTES: &[&str] = &["user", "userid", "user_id"];
    /// Attribute names recognized as the item column.
    pub const ITEM_ATTRIBUTES: &[&str] = &["item", "itemid", "item_id"];
    /// Attribute names recognized as the rating column.
    pub const RATING_ATTRIBUTES: &[&str] = &["rating", "rate", "score"];
    /// Attribute names recognized as the timestamp column.
    pub const TIME_ATTRIBUTES: &[&str] = &["datetime", "timestamp", "time", "date"];
}

/// Date/time layouts accepted for textual timestamps.
pub mod timestamps {
    /// Layouts tried in order for values carrying a time of day.
    pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    /// Layouts tried in order for date-only values (midnight UTC).
    pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
}

/// Constants used by the deterministic RNG.
pub mod rng {
    /// Offset mixed into the fold seed so seed `0` still yields a useful stream.
    pub const FOLD_SEED_OFFSET: u64 = 0x5EED_F01D;
}
