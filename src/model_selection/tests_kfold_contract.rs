// =========================================================================
// FALSIFY-KF: KFold and fold-factory contract
//
// Fold assignment must be a partition: each user is tested exactly once,
// train and test never overlap, and a fixed seed reproduces the split.
//
// References:
//   - Stone (1974) "Cross-Validatory Choice and Assessment of Predictions"
// =========================================================================

use super::*;
use crate::data::Listen;

/// FALSIFY-KF-001: K-Fold produces exactly K splits
#[test]
fn falsify_kf_001_produces_k_splits() {
    let splits = KFold::new(5).split(100);

    assert_eq!(
        splits.len(),
        5,
        "FALSIFIED KF-001: splits={}, expected 5",
        splits.len()
    );
}

/// FALSIFY-KF-002: Train + test indices cover all samples per fold
#[test]
fn falsify_kf_002_train_test_cover_all() {
    let n = 17; // non-divisible by K to test remainder handling
    let splits = KFold::new(4).with_random_state(11).split(n);

    for (fold_idx, (train, test)) in splits.iter().enumerate() {
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        all.dedup();

        assert_eq!(
            all.len(),
            n,
            "FALSIFIED KF-002: fold {fold_idx} covers {} samples, expected {n}",
            all.len()
        );
    }
}

/// FALSIFY-KF-003: Fold sizes differ by at most one
#[test]
fn falsify_kf_003_balanced_fold_sizes() {
    let splits = KFold::new(3).split(10);
    let sizes: Vec<usize> = splits.iter().map(|(_, test)| test.len()).collect();

    assert_eq!(
        sizes,
        vec![4, 3, 3],
        "FALSIFIED KF-003: remainder not spread over first folds: {sizes:?}"
    );
}

/// FALSIFY-KF-004: Factory hidden listens come only from test users
#[test]
fn falsify_kf_004_hidden_only_for_test_users() {
    let listens = (0..10).flat_map(|u| {
        (0..6).map(move |i| Listen::new(format!("u{u}"), format!("s{}", (u * 3 + i) % 17), 1))
    });
    let ds = Dataset::from_listens("contract", listens);
    let factory = CrossValidationFactory::new(&ds, 5, true)
        .expect("valid")
        .with_seed(2024);

    for run in 0..5 {
        let fold = factory.fold_data(run).expect("fold");
        for user in fold.test_hidden.users() {
            assert!(
                fold.train.history(user).is_none(),
                "FALSIFIED KF-004: run {run} hidden user {user} also in train"
            );
            assert!(
                fold.test_visible.history(user).is_some(),
                "FALSIFIED KF-004: run {run} hidden user {user} has no visible half"
            );
        }
    }
}

mod kf_proptest_falsify {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// FALSIFY-KF-001-prop: KFold produces exactly K splits for random K/n
        #[test]
        fn falsify_kf_001_prop_k_splits(
            k in 2..=10usize,
            n in 10..=50usize,
        ) {
            let splits = KFold::new(k).split(n);
            prop_assert_eq!(splits.len(), k);
        }

        /// FALSIFY-KF-005-prop: Every sample appears in exactly one test fold
        #[test]
        fn falsify_kf_005_prop_sample_coverage(
            k in 2..=5usize,
            n in 10..=30usize,
            seed in any::<u64>(),
        ) {
            let splits = KFold::new(k).with_random_state(seed).split(n);

            let mut test_counts = vec![0usize; n];
            for (_train, test) in &splits {
                for &idx in test {
                    test_counts[idx] += 1;
                }
            }

            for (i, &count) in test_counts.iter().enumerate() {
                prop_assert_eq!(
                    count, 1,
                    "FALSIFIED KF-005-prop: sample {} appeared {} times",
                    i, count
                );
            }
        }
    }
}
