//! K-fold cursor over a shared rating dataset.
//!
//! `KcvSplitter` is the stateful external-iteration API:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use kfold_ratings::{KcvSplitter, RatingDataset, SplitterConfig, SplitterError};
//! # fn run(dataset: Arc<RatingDataset>) -> Result<(), SplitterError> {
//! let mut splitter = KcvSplitter::new(dataset, SplitterConfig::new(5).with_seed(1));
//! splitter.split_data()?;
//! while splitter.next_fold()? {
//!     let train = splitter.train_data()?;
//!     let test = splitter.test_data()?;
//!     println!("train={} test={}", train.size(), test.size());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! `KcvSplitter::folds` yields the same `(train, test)` pairs as a lazy iterator.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ColumnFormat, DuplicatePolicy, SplitterConfig};
use crate::data::RatingDataset;
use crate::errors::SplitterError;
use crate::folds::{FoldAssignment, assign_folds};
use crate::matrix::{MatrixBuilder, SparseMatrix};
use crate::source::RatingSource;
use crate::types::{FoldId, Timestamp};

/// Train/test partition of one fold.
#[derive(Clone, Debug, PartialEq)]
pub struct FoldSplit {
    /// Zero-based fold number.
    pub fold: FoldId,
    /// Ratings whose fold differs from `fold`.
    pub train: SparseMatrix,
    /// Ratings assigned to `fold`.
    pub test: SparseMatrix,
    /// Timestamps aligned with `train` (UIRT only).
    pub train_timestamps: Option<SparseMatrix<Timestamp>>,
    /// Timestamps aligned with `test` (UIRT only).
    pub test_timestamps: Option<SparseMatrix<Timestamp>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CursorState {
    Unsplit,
    Ready,
    Active(FoldId),
    Exhausted,
}

/// K-fold cross-validation splitter with a fold cursor.
///
/// The dataset (records plus identifier indices) is shared read-only; every
/// splitter owns its own cursor, so independent splitters over one dataset
/// may run on different threads.
pub struct KcvSplitter {
    dataset: Arc<RatingDataset>,
    config: SplitterConfig,
    assignment: Option<Arc<FoldAssignment>>,
    state: CursorState,
    current: Option<FoldSplit>,
}

impl KcvSplitter {
    /// Create a splitter over an already-loaded dataset.
    pub fn new(dataset: Arc<RatingDataset>, config: SplitterConfig) -> Self {
        Self {
            dataset,
            config,
            assignment: None,
            state: CursorState::Unsplit,
            current: None,
        }
    }

    /// Load `source` and create a splitter over the result.
    pub fn from_source(
        source: &dyn RatingSource,
        config: SplitterConfig,
    ) -> Result<Self, SplitterError> {
        let dataset = source.load()?;
        debug!(
            source_id = source.id(),
            records = dataset.len(),
            users = dataset.users().len(),
            items = dataset.items().len(),
            "loaded rating source"
        );
        Ok(Self::new(Arc::new(dataset), config))
    }

    /// Validate the configuration, assign folds, and rewind the cursor.
    ///
    /// Calling this again recomputes the identical assignment and restarts
    /// iteration from the first fold.
    pub fn split_data(&mut self) -> Result<(), SplitterError> {
        self.config.validate(self.dataset.len())?;
        if self.config.column_format == ColumnFormat::Uirt {
            if let Some(position) = self.dataset.first_missing_timestamp() {
                return Err(SplitterError::Configuration(format!(
                    "column format UIRT requires timestamps, but rating {position} has none"
                )));
            }
        }
        let assignment = assign_folds(
            self.dataset.len(),
            self.config.fold_count,
            self.config.seed,
            self.config.fold_policy,
        )?;
        info!(
            records = self.dataset.len(),
            users = self.dataset.users().len(),
            items = self.dataset.items().len(),
            folds = self.config.fold_count,
            seed = self.config.seed,
            policy = ?self.config.fold_policy,
            fingerprint = assignment.fingerprint(),
            "prepared k-fold split"
        );
        self.assignment = Some(Arc::new(assignment));
        self.state = CursorState::Ready;
        self.current = None;
        Ok(())
    }

    /// Advance to the next fold and materialize its matrices.
    ///
    /// Returns `true` exactly `fold_count` times after `split_data`, then
    /// `false` on every later call until `split_data` runs again.
    pub fn next_fold(&mut self) -> Result<bool, SplitterError> {
        let next = match self.state {
            CursorState::Unsplit => {
                return Err(SplitterError::State(
                    "split_data() must be called before next_fold()".to_string(),
                ));
            }
            CursorState::Exhausted => return Ok(false),
            CursorState::Ready => 0,
            CursorState::Active(fold) => fold + 1,
        };
        let assignment = self.prepared_assignment()?;
        if next >= assignment.fold_count() {
            self.state = CursorState::Exhausted;
            self.current = None;
            return Ok(false);
        }
        let split = build_fold(&self.dataset, assignment, next, &self.config)?;
        self.current = Some(split);
        self.state = CursorState::Active(next);
        Ok(true)
    }

    /// Training matrix of the active fold.
    pub fn train_data(&self) -> Result<&SparseMatrix, SplitterError> {
        self.current_split().map(|split| &split.train)
    }

    /// Test matrix of the active fold.
    pub fn test_data(&self) -> Result<&SparseMatrix, SplitterError> {
        self.current_split().map(|split| &split.test)
    }

    /// Training timestamps of the active fold (`None` under UIR).
    pub fn train_timestamps(&self) -> Result<Option<&SparseMatrix<Timestamp>>, SplitterError> {
        self.current_split()
            .map(|split| split.train_timestamps.as_ref())
    }

    /// Test timestamps of the active fold (`None` under UIR).
    pub fn test_timestamps(&self) -> Result<Option<&SparseMatrix<Timestamp>>, SplitterError> {
        self.current_split()
            .map(|split| split.test_timestamps.as_ref())
    }

    /// Both partitions of the active fold.
    pub fn current_split(&self) -> Result<&FoldSplit, SplitterError> {
        match (self.state, self.current.as_ref()) {
            (CursorState::Active(_), Some(split)) => Ok(split),
            (CursorState::Unsplit, _) => Err(SplitterError::State(
                "split_data() must be called before reading fold data".to_string(),
            )),
            (CursorState::Ready, _) => Err(SplitterError::State(
                "next_fold() must return true before reading fold data".to_string(),
            )),
            (CursorState::Exhausted, _) | (CursorState::Active(_), None) => {
                Err(SplitterError::State(format!(
                    "all {} folds have been consumed; call split_data() to restart",
                    self.config.fold_count
                )))
            }
        }
    }

    /// Active fold number, if the cursor is on a fold.
    pub fn current_fold(&self) -> Option<FoldId> {
        match self.state {
            CursorState::Active(fold) => Some(fold),
            _ => None,
        }
    }

    /// Whether every fold has been visited.
    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }

    /// Configured number of folds.
    pub fn fold_count(&self) -> usize {
        self.config.fold_count
    }

    /// Splitter configuration.
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Shared dataset.
    pub fn dataset(&self) -> &Arc<RatingDataset> {
        &self.dataset
    }

    /// Fold assignment computed by the last `split_data`.
    pub fn assignment(&self) -> Option<&FoldAssignment> {
        self.assignment.as_deref()
    }

    /// Lazy iterator over all folds, independent of the cursor position.
    pub fn folds(&self) -> Result<FoldIter, SplitterError> {
        let assignment = Arc::clone(self.prepared_assignment_arc()?);
        Ok(FoldIter {
            dataset: Arc::clone(&self.dataset),
            config: self.config.clone(),
            assignment,
            next: 0,
        })
    }

    /// Build every fold eagerly, ordered by fold number.
    ///
    /// With the `parallel` feature, folds are built on the rayon pool.
    pub fn materialize_all(&self) -> Result<Vec<FoldSplit>, SplitterError> {
        let assignment = self.prepared_assignment()?;
        let folds = 0..assignment.fold_count();

        #[cfg(feature = "parallel")]
        let splits: Result<Vec<FoldSplit>, SplitterError> = {
            use rayon::prelude::*;
            folds
                .into_par_iter()
                .map(|fold| build_fold(&self.dataset, assignment, fold, &self.config))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let splits: Result<Vec<FoldSplit>, SplitterError> = folds
            .map(|fold| build_fold(&self.dataset, assignment, fold, &self.config))
            .collect();

        splits
    }

    fn prepared_assignment(&self) -> Result<&FoldAssignment, SplitterError> {
        self.prepared_assignment_arc().map(|assignment| assignment.as_ref())
    }

    fn prepared_assignment_arc(&self) -> Result<&Arc<FoldAssignment>, SplitterError> {
        self.assignment.as_ref().ok_or_else(|| {
            SplitterError::State("split_data() has not been called".to_string())
        })
    }
}

/// Lazy, non-restartable iterator over the `fold_count` folds of a split.
pub struct FoldIter {
    dataset: Arc<RatingDataset>,
    config: SplitterConfig,
    assignment: Arc<FoldAssignment>,
    next: FoldId,
}

impl Iterator for FoldIter {
    type Item = Result<FoldSplit, SplitterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.assignment.fold_count() {
            return None;
        }
        let fold = self.next;
        self.next += 1;
        Some(build_fold(&self.dataset, &self.assignment, fold, &self.config))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.assignment.fold_count().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FoldIter {}

/// Materialize the train and test matrices of `fold`.
fn build_fold(
    dataset: &RatingDataset,
    assignment: &FoldAssignment,
    fold: FoldId,
    config: &SplitterConfig,
) -> Result<FoldSplit, SplitterError> {
    let rows = dataset.users().len();
    let cols = dataset.items().len();
    let test_len = assignment.positions(fold).count();

    let mut train = MatrixBuilder::new(rows, cols)
        .with_duplicate_policy(config.duplicate_policy)
        .with_capacity(dataset.len() - test_len);
    let mut test = MatrixBuilder::new(rows, cols)
        .with_duplicate_policy(config.duplicate_policy)
        .with_capacity(test_len);
    let with_timestamps = config.column_format == ColumnFormat::Uirt;
    let mut train_ts = with_timestamps.then(|| {
        MatrixBuilder::<Timestamp>::new(rows, cols)
            .with_duplicate_policy(DuplicatePolicy::OverwriteLast)
    });
    let mut test_ts = with_timestamps.then(|| {
        MatrixBuilder::<Timestamp>::new(rows, cols)
            .with_duplicate_policy(DuplicatePolicy::OverwriteLast)
    });

    let entries = dataset
        .records()
        .iter()
        .zip(dataset.dense_positions())
        .zip(assignment.as_slice());
    for ((record, &(row, col)), &assigned) in entries {
        let (values, stamps) = if assigned == fold {
            (&mut test, &mut test_ts)
        } else {
            (&mut train, &mut train_ts)
        };
        values.push(row, col, record.value())?;
        if let (Some(stamps), Some(timestamp)) = (stamps.as_mut(), record.timestamp()) {
            stamps.push(row, col, timestamp)?;
        }
    }

    let split = FoldSplit {
        fold,
        train: train.build(),
        test: test.build(),
        train_timestamps: train_ts.map(MatrixBuilder::build),
        test_timestamps: test_ts.map(MatrixBuilder::build),
    };
    debug!(
        fold,
        train = split.train.size(),
        test = split.test.size(),
        "materialized fold"
    );
    Ok(split)
}
