//! Deterministic record → fold assignment.

use rand::seq::SliceRandom;

use crate::config::FoldPolicy;
use crate::constants::config::MIN_FOLD_COUNT;
use crate::errors::SplitterError;
use crate::hash::stable_hash_slice;
use crate::metrics::{FoldBalance, fold_balance};
use crate::rng::DeterministicRng;
use crate::types::FoldId;

/// Fold number for every record position of a dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoldAssignment {
    folds: Vec<FoldId>,
    fold_count: usize,
    seed: u64,
    policy: FoldPolicy,
}

impl FoldAssignment {
    /// Fold of the record at `position`.
    pub fn fold_of(&self, position: usize) -> Option<FoldId> {
        self.folds.get(position).copied()
    }

    /// Folds indexed by record position.
    pub fn as_slice(&self) -> &[FoldId] {
        &self.folds
    }

    /// Number of assigned records.
    pub fn len(&self) -> usize {
        self.folds.len()
    }

    /// Whether no record is assigned.
    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    /// Number of folds `K`.
    pub fn fold_count(&self) -> usize {
        self.fold_count
    }

    /// Seed the assignment was derived from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Policy the assignment was derived with.
    pub fn policy(&self) -> FoldPolicy {
        self.policy
    }

    /// Record count per fold.
    pub fn fold_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.fold_count];
        for fold in &self.folds {
            sizes[*fold] += 1;
        }
        sizes
    }

    /// Record positions assigned to `fold`, ascending.
    pub fn positions(&self, fold: FoldId) -> impl Iterator<Item = usize> + '_ {
        self.folds
            .iter()
            .enumerate()
            .filter(move |(_, assigned)| **assigned == fold)
            .map(|(position, _)| position)
    }

    /// Balance summary over fold sizes.
    pub fn balance(&self) -> Option<FoldBalance> {
        fold_balance(&self.fold_sizes())
    }

    /// Stable 64-bit digest of the assignment, for logging and comparisons.
    pub fn fingerprint(&self) -> u64 {
        stable_hash_slice(self.seed ^ self.fold_count as u64, &self.folds)
    }
}

/// Reject fold counts that cannot produce K non-empty train/test partitions.
pub fn check_fold_count(fold_count: usize, record_count: usize) -> Result<(), SplitterError> {
    if fold_count < MIN_FOLD_COUNT {
        return Err(SplitterError::Configuration(format!(
            "fold count must be at least {MIN_FOLD_COUNT}, got {fold_count}"
        )));
    }
    if fold_count > record_count {
        return Err(SplitterError::Configuration(format!(
            "fold count {fold_count} exceeds the {record_count} available ratings"
        )));
    }
    Ok(())
}

/// Assign `record_count` positions to `fold_count` folds.
///
/// Positions (shuffled first under `FoldPolicy::Shuffled`) are cut into
/// contiguous blocks; the first `record_count % fold_count` folds hold one
/// extra record, so fold sizes never differ by more than one.
pub fn assign_folds(
    record_count: usize,
    fold_count: usize,
    seed: u64,
    policy: FoldPolicy,
) -> Result<FoldAssignment, SplitterError> {
    check_fold_count(fold_count, record_count)?;

    let mut order: Vec<usize> = (0..record_count).collect();
    if policy == FoldPolicy::Shuffled {
        let mut rng = DeterministicRng::for_folds(seed);
        order.shuffle(&mut rng);
    }

    let blocks = BlockLayout::new(record_count, fold_count);
    let mut folds = vec![0; record_count];
    for (rank, position) in order.into_iter().enumerate() {
        folds[position] = blocks.fold_at(rank);
    }

    Ok(FoldAssignment {
        folds,
        fold_count,
        seed,
        policy,
    })
}

/// Contiguous block boundaries for `total` ranks over `folds` folds.
struct BlockLayout {
    base: usize,
    remainder: usize,
}

impl BlockLayout {
    fn new(total: usize, folds: usize) -> Self {
        Self {
            base: total / folds,
            remainder: total % folds,
        }
    }

    fn fold_at(&self, rank: usize) -> FoldId {
        let wide = self.base + 1;
        let wide_span = self.remainder * wide;
        if rank < wide_span {
            rank / wide
        } else {
            self.remainder + (rank - wide_span) / self.base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_blocks_front_load_the_remainder() {
        let assignment = assign_folds(11, 4, 0, FoldPolicy::Sequential).unwrap();
        assert_eq!(
            assignment.as_slice(),
            &[0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3]
        );
        assert_eq!(assignment.fold_sizes(), vec![3, 3, 3, 2]);
    }

    #[test]
    fn shuffled_sizes_differ_by_at_most_one() {
        for (records, folds) in [(12, 6), (13, 6), (100, 7), (5, 5), (9, 2)] {
            let assignment = assign_folds(records, folds, 1, FoldPolicy::Shuffled).unwrap();
            let sizes = assignment.fold_sizes();
            let min = *sizes.iter().min().unwrap();
            let max = *sizes.iter().max().unwrap();
            assert!(max - min <= 1, "sizes {sizes:?} for {records}/{folds}");
            assert_eq!(sizes.iter().sum::<usize>(), records);
            for (fold, size) in sizes.iter().enumerate() {
                let expected = records / folds + usize::from(fold < records % folds);
                assert_eq!(*size, expected);
            }
        }
    }

    #[test]
    fn same_seed_reproduces_assignment() {
        let a = assign_folds(500, 6, 1, FoldPolicy::Shuffled).unwrap();
        let b = assign_folds(500, 6, 1, FoldPolicy::Shuffled).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = assign_folds(500, 6, 2, FoldPolicy::Shuffled).unwrap();
        assert_ne!(a.as_slice(), c.as_slice());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn shuffled_differs_from_sequential() {
        let sequential = assign_folds(60, 6, 1, FoldPolicy::Sequential).unwrap();
        let shuffled = assign_folds(60, 6, 1, FoldPolicy::Shuffled).unwrap();
        assert_ne!(sequential.as_slice(), shuffled.as_slice());
    }

    #[test]
    fn positions_partition_all_records() {
        let assignment = assign_folds(23, 5, 9, FoldPolicy::Shuffled).unwrap();
        let mut seen = vec![0usize; 23];
        for fold in 0..5 {
            for position in assignment.positions(fold) {
                seen[position] += 1;
                assert_eq!(assignment.fold_of(position), Some(fold));
            }
        }
        assert!(seen.iter().all(|count| *count == 1));
    }

    #[test]
    fn invalid_fold_counts_are_rejected() {
        for (records, folds) in [(10, 0), (10, 1), (3, 4), (0, 2)] {
            let err = assign_folds(records, folds, 1, FoldPolicy::Shuffled).unwrap_err();
            assert!(matches!(err, SplitterError::Configuration(_)));
        }
    }
}
