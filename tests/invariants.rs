use std::fs;
use std::sync::Arc;
use std::thread;

use tempfile::tempdir;

use kfold_ratings::{
    ColumnFormat, DuplicatePolicy, FoldPolicy, FoldSplit, InMemoryRatingSource, KcvSplitter,
    RatingDataset, RatingRecord, SplitterConfig, SplitterError, open_rating_source,
};

fn build_records(users: usize, items: usize, count: usize) -> Vec<RatingRecord> {
    (0..count)
        .map(|idx| {
            let user = (idx * 7) % users;
            let item = (idx * 7 / users + idx) % items;
            RatingRecord::with_timestamp(
                format!("user-{user}"),
                format!("item-{item}"),
                (idx % 5 + 1) as f64,
                1_700_000_000 + idx as i64 * 60,
            )
        })
        .collect()
}

fn unique_dataset() -> Arc<RatingDataset> {
    // 9 users x 11 items, 47 distinct pairs.
    let mut seen = std::collections::HashSet::new();
    let records = build_records(9, 11, 200)
        .into_iter()
        .filter(|record| seen.insert((record.user().to_string(), record.item().to_string())))
        .take(47)
        .collect::<Vec<_>>();
    assert_eq!(records.len(), 47);
    Arc::new(RatingDataset::new(records, ColumnFormat::Uirt))
}

fn collect_folds(splitter: &mut KcvSplitter) -> Vec<FoldSplit> {
    splitter.split_data().unwrap();
    let mut folds = Vec::new();
    while splitter.next_fold().unwrap() {
        folds.push(splitter.current_split().unwrap().clone());
    }
    folds
}

#[test]
fn every_rating_is_tested_exactly_once() {
    let dataset = unique_dataset();
    for policy in [FoldPolicy::Shuffled, FoldPolicy::Sequential] {
        let config = SplitterConfig::new(5).with_seed(3).with_fold_policy(policy);
        let mut splitter = KcvSplitter::new(Arc::clone(&dataset), config);
        let folds = collect_folds(&mut splitter);
        assert_eq!(folds.len(), 5);

        let mut tested: Vec<(usize, usize)> = Vec::new();
        for split in &folds {
            assert_eq!(split.train.size() + split.test.size(), dataset.len());
            for (row, col, value) in split.test.iter() {
                assert!(!split.train.contains(row, col));
                let position = dataset
                    .dense_positions()
                    .iter()
                    .position(|&dense| dense == (row, col))
                    .unwrap();
                assert_eq!(dataset.records()[position].value(), value);
                tested.push((row, col));
            }
        }
        tested.sort_unstable();
        let mut expected = dataset.dense_positions().to_vec();
        expected.sort_unstable();
        assert_eq!(tested, expected);
    }
}

#[test]
fn fold_sizes_differ_by_at_most_one() {
    let dataset = unique_dataset();
    for fold_count in [2, 3, 5, 6, 10, 47] {
        let mut splitter = KcvSplitter::new(Arc::clone(&dataset), SplitterConfig::new(fold_count));
        let folds = collect_folds(&mut splitter);
        let sizes: Vec<usize> = folds.iter().map(|split| split.test.size()).collect();
        let min = sizes.iter().min().copied().unwrap();
        let max = sizes.iter().max().copied().unwrap();
        assert!(max - min <= 1, "K={fold_count} sizes={sizes:?}");

        let balance = splitter.assignment().unwrap().balance().unwrap();
        assert_eq!(balance.total, 47);
        assert!(balance.spread <= 1);
    }
}

#[test]
fn same_seed_reproduces_and_different_seed_reshuffles() {
    let dataset = unique_dataset();
    let run = |seed| {
        let mut splitter =
            KcvSplitter::new(Arc::clone(&dataset), SplitterConfig::new(4).with_seed(seed));
        collect_folds(&mut splitter)
    };
    assert_eq!(run(11), run(11));
    assert_ne!(run(11), run(12));
}

#[test]
fn cursor_contract_holds() {
    let mut splitter = KcvSplitter::new(unique_dataset(), SplitterConfig::new(3));
    assert!(matches!(splitter.next_fold(), Err(SplitterError::State(_))));
    assert!(matches!(splitter.train_data(), Err(SplitterError::State(_))));

    splitter.split_data().unwrap();
    assert!(matches!(splitter.test_data(), Err(SplitterError::State(_))));
    let trues = (0..10).filter(|_| splitter.next_fold().unwrap()).count();
    assert_eq!(trues, 3);
    assert!(splitter.is_exhausted());

    splitter.split_data().unwrap();
    assert!(splitter.next_fold().unwrap());
    assert_eq!(splitter.current_fold(), Some(0));
}

#[test]
fn lazy_eager_and_cursor_views_agree() {
    let mut splitter = KcvSplitter::new(unique_dataset(), SplitterConfig::new(6).with_seed(5));
    splitter.split_data().unwrap();
    let lazy: Vec<FoldSplit> = splitter.folds().unwrap().collect::<Result<_, _>>().unwrap();
    let eager = splitter.materialize_all().unwrap();
    let cursor = collect_folds(&mut splitter);
    assert_eq!(lazy, eager);
    assert_eq!(eager, cursor);
    assert!(lazy.iter().enumerate().all(|(idx, split)| split.fold == idx));
}

#[test]
fn duplicate_pairs_follow_policy() {
    let records = vec![
        RatingRecord::new("u1", "i1", 2.0),
        RatingRecord::new("u1", "i1", 3.0),
        RatingRecord::new("u2", "i1", 1.0),
        RatingRecord::new("u2", "i2", 4.0),
    ];
    let dataset = Arc::new(RatingDataset::new(records, ColumnFormat::Uir));
    let sequential = SplitterConfig::new(2).with_fold_policy(FoldPolicy::Sequential);

    let mut last = KcvSplitter::new(Arc::clone(&dataset), sequential.clone());
    last.split_data().unwrap();
    assert!(last.next_fold().unwrap());
    assert_eq!(last.test_data().unwrap().size(), 1);
    assert_eq!(last.test_data().unwrap().get(0, 0), 3.0);

    let mut sum = KcvSplitter::new(
        dataset,
        sequential.with_duplicate_policy(DuplicatePolicy::Sum),
    );
    sum.split_data().unwrap();
    assert!(sum.next_fold().unwrap());
    assert_eq!(sum.test_data().unwrap().get(0, 0), 5.0);
    assert_eq!(sum.train_data().unwrap().size(), 2);
}

#[test]
fn degenerate_fold_counts_are_rejected() {
    let source = InMemoryRatingSource::new(
        "tiny",
        vec![
            RatingRecord::new("a", "x", 1.0),
            RatingRecord::new("b", "y", 2.0),
        ],
        ColumnFormat::Uir,
    );
    for fold_count in [0, 1, 3] {
        let mut splitter = KcvSplitter::from_source(&source, SplitterConfig::new(fold_count)).unwrap();
        assert!(matches!(splitter.split_data(), Err(SplitterError::Configuration(_))));
    }
    let mut splitter = KcvSplitter::from_source(&source, SplitterConfig::new(2)).unwrap();
    assert_eq!(collect_folds(&mut splitter).len(), 2);
}

#[test]
fn independent_splitters_share_one_dataset_across_threads() {
    let dataset = unique_dataset();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dataset = Arc::clone(&dataset);
            thread::spawn(move || {
                let mut splitter = KcvSplitter::new(dataset, SplitterConfig::new(5).with_seed(8));
                collect_folds(&mut splitter)
            })
        })
        .collect();
    let results: Vec<Vec<FoldSplit>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn files_load_from_disk_and_missing_files_are_unavailable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ratings.txt");
    fs::write(&path, "# u i r\nalice matrix 5\nbob matrix 3\nalice up 4\ncarol up 2\n").unwrap();

    let source = open_rating_source("disk", &path, ColumnFormat::Uir);
    let mut splitter = KcvSplitter::from_source(source.as_ref(), SplitterConfig::new(2)).unwrap();
    assert_eq!(splitter.dataset().users().len(), 3);
    assert_eq!(collect_folds(&mut splitter).len(), 2);

    let missing = open_rating_source("gone", &dir.path().join("nope.txt"), ColumnFormat::Uir);
    let err = KcvSplitter::from_source(missing.as_ref(), SplitterConfig::new(2))
        .err()
        .unwrap();
    assert!(matches!(err, SplitterError::SourceUnavailable { ref source_id, .. } if source_id == "gone"));
}

#[test]
fn config_from_properties_drives_the_split() {
    let config = SplitterConfig::from_properties([
        ("data.splitter.cv.number", "4"),
        ("rec.random.seed", "1"),
        ("data.column.format", "UIRT"),
    ])
    .unwrap();
    let mut splitter = KcvSplitter::new(unique_dataset(), config);
    let folds = collect_folds(&mut splitter);
    assert_eq!(folds.len(), 4);
    assert!(folds.iter().all(|split| split.test_timestamps.is_some()));
}
