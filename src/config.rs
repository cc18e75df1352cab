use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::config::{
    CONF_COLUMN_FORMAT, CONF_DUPLICATE_POLICY, CONF_FOLD_COUNT, CONF_FOLD_POLICY,
    CONF_RANDOM_SEED, DEFAULT_FOLD_COUNT, DEFAULT_SEED,
};
use crate::errors::SplitterError;
use crate::folds::check_fold_count;

/// Column layout of an ingested rating file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnFormat {
    /// `user item rating`.
    #[default]
    #[serde(rename = "UIR")]
    Uir,
    /// `user item rating timestamp`.
    #[serde(rename = "UIRT")]
    Uirt,
}

impl ColumnFormat {
    /// Whether records in this layout carry a timestamp.
    pub fn has_timestamps(self) -> bool {
        matches!(self, ColumnFormat::Uirt)
    }
}

impl fmt::Display for ColumnFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnFormat::Uir => write!(f, "UIR"),
            ColumnFormat::Uirt => write!(f, "UIRT"),
        }
    }
}

impl FromStr for ColumnFormat {
    type Err = SplitterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "UIR" => Ok(ColumnFormat::Uir),
            "UIRT" => Ok(ColumnFormat::Uirt),
            other => Err(SplitterError::Configuration(format!(
                "unknown column format '{other}' (expected UIR or UIRT)"
            ))),
        }
    }
}

/// How record positions are mapped onto folds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldPolicy {
    /// Contiguous blocks in record order.
    Sequential,
    /// Seeded permutation of record positions, then contiguous blocks.
    #[default]
    Shuffled,
}

impl FromStr for FoldPolicy {
    type Err = SplitterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(FoldPolicy::Sequential),
            "shuffled" | "random" => Ok(FoldPolicy::Shuffled),
            other => Err(SplitterError::Configuration(format!(
                "unknown fold policy '{other}' (expected sequential or shuffled)"
            ))),
        }
    }
}

/// Resolution for repeated `(row, col)` entries within one matrix build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The value pushed last wins.
    #[default]
    OverwriteLast,
    /// Values are accumulated.
    Sum,
}

impl FromStr for DuplicatePolicy {
    type Err = SplitterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overwrite" | "overwrite_last" | "last" => Ok(DuplicatePolicy::OverwriteLast),
            "sum" => Ok(DuplicatePolicy::Sum),
            other => Err(SplitterError::Configuration(format!(
                "unknown duplicate policy '{other}' (expected overwrite or sum)"
            ))),
        }
    }
}

/// Top-level k-fold splitter configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Number of folds `K`; must satisfy `2 <= K <= record count`.
    pub fold_count: usize,
    /// RNG seed controlling the shuffled fold assignment.
    pub seed: u64,
    /// Column layout the splitter should materialize.
    pub column_format: ColumnFormat,
    /// Mapping of record positions onto folds.
    pub fold_policy: FoldPolicy,
    /// Resolution of duplicate `(user, item)` pairs inside one partition.
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            fold_count: DEFAULT_FOLD_COUNT,
            seed: DEFAULT_SEED,
            column_format: ColumnFormat::Uir,
            fold_policy: FoldPolicy::Shuffled,
            duplicate_policy: DuplicatePolicy::OverwriteLast,
        }
    }
}

impl SplitterConfig {
    /// Create a config with `fold_count` folds and defaults elsewhere.
    pub fn new(fold_count: usize) -> Self {
        Self {
            fold_count,
            ..Self::default()
        }
    }

    /// Override the fold-assignment seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Override the column format.
    pub fn with_column_format(mut self, column_format: ColumnFormat) -> Self {
        self.column_format = column_format;
        self
    }

    /// Override the fold policy.
    pub fn with_fold_policy(mut self, fold_policy: FoldPolicy) -> Self {
        self.fold_policy = fold_policy;
        self
    }

    /// Override the duplicate-entry policy.
    pub fn with_duplicate_policy(mut self, duplicate_policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = duplicate_policy;
        self
    }

    /// Build a config from recommender-style property pairs.
    ///
    /// Recognized keys are listed in `constants::config`; other keys are ignored
    /// so a full application property map can be passed through unchanged.
    pub fn from_properties<I, K, V>(properties: I) -> Result<Self, SplitterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in properties {
            let value = value.as_ref().trim();
            match key.as_ref() {
                CONF_FOLD_COUNT => {
                    config.fold_count = value.parse().map_err(|_| {
                        SplitterError::Configuration(format!(
                            "{CONF_FOLD_COUNT} must be a positive integer, got '{value}'"
                        ))
                    })?;
                }
                CONF_RANDOM_SEED => config.seed = parse_seed(value)?,
                CONF_COLUMN_FORMAT => config.column_format = value.parse()?,
                CONF_FOLD_POLICY => config.fold_policy = value.parse()?,
                CONF_DUPLICATE_POLICY => config.duplicate_policy = value.parse()?,
                _ => {}
            }
        }
        Ok(config)
    }

    /// Check the fold count against the number of records to split.
    pub fn validate(&self, record_count: usize) -> Result<(), SplitterError> {
        check_fold_count(self.fold_count, record_count)
    }
}

/// Seeds may be written as signed integers; negative values keep their bit pattern.
fn parse_seed(value: &str) -> Result<u64, SplitterError> {
    if let Ok(seed) = value.parse::<u64>() {
        return Ok(seed);
    }
    value.parse::<i64>().map(|seed| seed as u64).map_err(|_| {
        SplitterError::Configuration(format!(
            "{CONF_RANDOM_SEED} must be an integer, got '{value}'"
        ))
    })
}
