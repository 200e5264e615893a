//! End-to-end sweeps over triplet files on disk.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use aprender_knn_sweep::error::ErrorKind;
use aprender_knn_sweep::prelude::*;
use tempfile::TempDir;

/// Write a clustered listening file: users in the same cluster share most
/// of their songs.
fn write_clustered(dir: &Path, name: &str, users: usize, clusters: usize) {
    let mut contents = String::from("# user\tsong\tplays\n");
    for u in 0..users {
        let cluster = u % clusters;
        for i in 0..8 {
            // rotate within a cluster-local pool of 10 songs
            let song = cluster * 100 + (u / clusters + i) % 10;
            writeln!(contents, "user{u}\tsong{song}\t{}", 1 + (u + i) % 4).expect("write to string");
        }
    }
    fs::write(dir.join(format!("{name}.txt")), contents).expect("write fixture");
}

fn config(dir: &Path) -> SweepConfig {
    let mut config = SweepConfig::default()
        .with_k_values(vec![1, 2, 5, 10])
        .with_folds(4)
        .with_runs(3)
        .with_num_recommendations(5)
        .with_seed(2024);
    config.data_dir = dir.to_path_buf();
    config
}

#[test]
fn test_sweep_named_dataset() {
    let dir = TempDir::new().expect("tempdir");
    write_clustered(dir.path(), "taste", 24, 3);

    let config = config(dir.path());
    let loader = TripletLoader::new(&config.data_dir);
    let driver = SweepDriver::new(config, HoldoutEvaluator::new()).expect("valid config");
    let result = driver.run_named(&loader, "taste").expect("sweep");

    assert_eq!(result.dataset, "taste");
    assert_eq!(result.statistics.len(), 4);
    assert!([1, 2, 5, 10].contains(&result.best_k));

    let best = result.statistics_for(result.best_k).expect("best K swept");
    assert_eq!(best.avg_accuracy, result.best_avg_accuracy);
    for stats in &result.statistics {
        assert_eq!(stats.accuracies.len(), 3);
        assert!(stats.avg_accuracy <= result.best_avg_accuracy);
        assert!(stats.min_accuracy <= stats.avg_accuracy && stats.avg_accuracy <= stats.max_accuracy);
    }
    // clustered tastes are learnable
    assert!(result.best_avg_accuracy > 0.0);
}

#[test]
fn test_same_seed_same_statistics() {
    let dir = TempDir::new().expect("tempdir");
    write_clustered(dir.path(), "taste", 20, 4);

    let loader = TripletLoader::new(dir.path());
    let run = || {
        SweepDriver::new(config(dir.path()), HoldoutEvaluator::new())
            .expect("valid config")
            .run_named(&loader, "taste")
            .expect("sweep")
    };

    let first = run();
    let second = run();
    assert_eq!(first.best_k, second.best_k);
    assert_eq!(first.statistics, second.statistics);
}

#[test]
fn test_missing_dataset_is_data_load_error() {
    let dir = TempDir::new().expect("tempdir");
    let loader = TripletLoader::new(dir.path());
    let driver =
        SweepDriver::new(config(dir.path()), HoldoutEvaluator::new()).expect("valid config");

    let err = driver.run_named(&loader, "nowhere").expect_err("no such file");
    assert_eq!(err.kind(), ErrorKind::DataLoad);
    assert!(err.to_string().contains("nowhere"));
}

#[test]
fn test_too_few_users_for_folds() {
    let dir = TempDir::new().expect("tempdir");
    write_clustered(dir.path(), "tiny", 3, 1);

    let loader = TripletLoader::new(dir.path());
    let driver =
        SweepDriver::new(config(dir.path()), HoldoutEvaluator::new()).expect("valid config");

    let err = driver.run_named(&loader, "tiny").expect_err("3 users, 4 folds");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_config_file_drives_sweep() {
    let dir = TempDir::new().expect("tempdir");
    write_clustered(dir.path(), "taste", 12, 2);

    let toml = format!(
        "k_values = [1, 3]\nruns = 2\nfolds = 3\nnum_recommendations = 4\nseed = 9\ndata_dir = {:?}\n",
        dir.path().display().to_string()
    );
    let path = dir.path().join("sweep.toml");
    fs::write(&path, toml).expect("write config");

    let config = SweepConfig::from_file(&path).expect("parse config");
    assert_eq!(config.k_values, vec![1, 3]);

    let loader = TripletLoader::new(&config.data_dir);
    let result = SweepDriver::new(config, HoldoutEvaluator::new())
        .expect("valid config")
        .run_named(&loader, "taste")
        .expect("sweep");
    let ks: Vec<usize> = result.statistics.iter().map(|s| s.k).collect();
    assert_eq!(ks, vec![1, 3]);
}

#[test]
fn test_every_fold_covers_every_user_once_as_test() {
    let dir = TempDir::new().expect("tempdir");
    write_clustered(dir.path(), "taste", 10, 2);
    let dataset = TripletLoader::new(dir.path()).load("taste").expect("load");

    let factory = CrossValidationFactory::new(&dataset, 5, true)
        .expect("valid folds")
        .with_seed(3);
    let mut tested = Vec::new();
    for run in 0..factory.fold_count() {
        let fold = factory.fold_data(run).expect("fold");
        assert_eq!(fold.train.n_users() + fold.test_visible.n_users(), 10);
        tested.extend(fold.test_visible.users().map(str::to_string));
    }
    tested.sort();
    tested.dedup();
    assert_eq!(tested.len(), 10);
}
