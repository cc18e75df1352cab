use crate::types::FoldId;

/// Aggregate balance metrics over per-fold record counts.
#[derive(Clone, Debug, PartialEq)]
pub struct FoldBalance {
    /// Records across all folds.
    pub total: usize,
    /// Number of folds.
    pub folds: usize,
    /// Smallest fold.
    pub min: usize,
    /// Largest fold.
    pub max: usize,
    /// Mean records per fold.
    pub mean: f64,
    /// `max - min`; k-fold assignments keep this at 0 or 1.
    pub spread: usize,
    /// `max / min`, infinite when a fold is empty.
    pub ratio: f64,
    /// Per-fold counts and shares, indexed by fold.
    pub per_fold: Vec<FoldShare>,
}

/// Per-fold share of the dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct FoldShare {
    /// Fold number.
    pub fold: FoldId,
    /// Records in this fold.
    pub count: usize,
    /// Fraction of all records in this fold.
    pub share: f64,
}

/// Compute balance metrics from per-fold counts (indexed by fold).
pub fn fold_balance(sizes: &[usize]) -> Option<FoldBalance> {
    let min = *sizes.iter().min()?;
    let max = *sizes.iter().max()?;
    let total: usize = sizes.iter().sum();
    let folds = sizes.len();
    let mean = total as f64 / folds as f64;
    let ratio = if min == 0 {
        f64::INFINITY
    } else {
        max as f64 / min as f64
    };
    let per_fold = sizes
        .iter()
        .enumerate()
        .map(|(fold, count)| FoldShare {
            fold,
            count: *count,
            share: if total == 0 {
                0.0
            } else {
                *count as f64 / total as f64
            },
        })
        .collect();
    Some(FoldBalance {
        total,
        folds,
        min,
        max,
        mean,
        spread: max - min,
        ratio,
        per_fold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_balance_reports_even_split() {
        let balance = fold_balance(&[2, 2, 2, 2, 2, 2]).expect("balance");
        assert_eq!(balance.total, 12);
        assert_eq!(balance.folds, 6);
        assert_eq!(balance.spread, 0);
        assert!((balance.mean - 2.0).abs() < 1e-9);
        assert!((balance.ratio - 1.0).abs() < 1e-9);
        assert!(
            balance
                .per_fold
                .iter()
                .all(|entry| (entry.share - 1.0 / 6.0).abs() < 1e-9)
        );
    }

    #[test]
    fn fold_balance_reports_remainder() {
        let balance = fold_balance(&[3, 3, 2]).expect("balance");
        assert_eq!(balance.total, 8);
        assert_eq!(balance.min, 2);
        assert_eq!(balance.max, 3);
        assert_eq!(balance.spread, 1);
        assert!((balance.ratio - 1.5).abs() < 1e-9);
        assert_eq!(balance.per_fold[2].fold, 2);
        assert_eq!(balance.per_fold[2].count, 2);
    }

    #[test]
    fn fold_balance_of_nothing_is_none() {
        assert!(fold_balance(&[]).is_none());
    }
}
