//! Cross-validation over listening datasets.
//!
//! This module provides:
//! - [`KFold`] index splitting
//! - [`CrossValidationFactory`], which turns a user-level K-fold split into
//!   train / test-visible / test-hidden datasets
//! - the [`FoldSource`] seam the sweep driver consumes

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::data::{Dataset, History};
use crate::error::{Result, SweepError};

/// K-Fold cross-validator.
///
/// Splits `n_samples` indices into K consecutive folds. Each fold is used
/// once as test set while the remaining K-1 folds form the training set.
/// When the sample count does not divide evenly the first folds take one
/// extra sample each.
///
/// # Example
///
/// ```rust
/// use aprender_knn_sweep::model_selection::KFold;
///
/// let kfold = KFold::new(5);
/// for (train_idx, test_idx) in kfold.split(10) {
///     assert_eq!(train_idx.len() + test_idx.len(), 10);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl KFold {
    /// Create a new K-Fold cross-validator.
    ///
    /// # Arguments
    ///
    /// * `n_splits` - Number of folds. Must be at least 2.
    #[must_use]
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            random_state: None,
        }
    }

    /// Enable shuffling before splitting into folds.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set random state for reproducible shuffling.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self.shuffle = true; // Shuffle is implied when random_state is set
        self
    }

    /// Number of folds.
    #[must_use]
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generate train/test indices for each fold.
    ///
    /// Returns a vector of (train_indices, test_indices) tuples.
    #[must_use]
    pub fn split(&self, n_samples: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
        let mut indices: Vec<usize> = (0..n_samples).collect();

        if self.shuffle {
            if let Some(seed) = self.random_state {
                let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
                indices.shuffle(&mut rng);
            } else {
                let mut rng = rand::thread_rng();
                indices.shuffle(&mut rng);
            }
        }

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut result = Vec::with_capacity(self.n_splits);
        let mut start = 0;

        for i in 0..self.n_splits {
            let current_fold_size = if i < remainder {
                fold_size + 1
            } else {
                fold_size
            };
            let end = start + current_fold_size;

            let test_indices: Vec<usize> = indices[start..end].to_vec();

            let mut train_indices = Vec::with_capacity(n_samples - current_fold_size);
            train_indices.extend_from_slice(&indices[..start]);
            train_indices.extend_from_slice(&indices[end..]);

            result.push((train_indices, test_indices));
            start = end;
        }

        result
    }
}

/// The three logical partitions of a fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoldPartition {
    /// Full histories of every user outside the test fold
    Train,
    /// The half of each test user's history the recommender may see
    TestVisible,
    /// The held-out half used to score recommendations
    TestHidden,
}

impl FoldPartition {
    /// All partitions in canonical order.
    pub const ALL: [FoldPartition; 3] = [Self::Train, Self::TestVisible, Self::TestHidden];

    /// Fixed logical name of the partition.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::TestVisible => "test_visible",
            Self::TestHidden => "test_hidden",
        }
    }
}

impl fmt::Display for FoldPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FoldPartition {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                SweepError::invalid_config("partition", s, "train, test_visible or test_hidden")
            })
    }
}

/// Datasets for one cross-validation run.
#[derive(Debug, Clone)]
pub struct FoldData {
    /// Training users with full histories
    pub train: Dataset,
    /// Visible half of each test user's history
    pub test_visible: Dataset,
    /// Hidden half of each test user's history
    pub test_hidden: Dataset,
}

impl FoldData {
    /// Look a partition up by its logical name.
    #[must_use]
    pub fn partition(&self, partition: FoldPartition) -> &Dataset {
        match partition {
            FoldPartition::Train => &self.train,
            FoldPartition::TestVisible => &self.test_visible,
            FoldPartition::TestHidden => &self.test_hidden,
        }
    }
}

/// Provider of per-run fold data.
pub trait FoldSource {
    /// Number of folds available.
    fn fold_count(&self) -> usize;

    /// Fold data for run `run`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `run >= fold_count()`.
    fn fold_data(&self, run: usize) -> Result<FoldData>;
}

/// User-level K-fold factory with visible/hidden splitting of test users.
///
/// Users are assigned to folds once, at construction, so every caller asking
/// for run `r` gets the same partition. Within a run, each test user's items
/// are shuffled with a run-specific seed and split: the first half (rounded
/// up) becomes visible, the rest hidden.
///
/// # Example
///
/// ```
/// use aprender_knn_sweep::data::{Dataset, Listen};
/// use aprender_knn_sweep::model_selection::{CrossValidationFactory, FoldSource};
///
/// let listens = (0..6).flat_map(|u| {
///     (0..4).map(move |i| Listen::new(format!("u{u}"), format!("s{}", u + i), 1))
/// });
/// let ds = Dataset::from_listens("demo", listens);
///
/// let factory = CrossValidationFactory::new(&ds, 3, true)
///     .expect("valid fold count")
///     .with_seed(7);
/// let fold = factory.fold_data(0).expect("run 0 exists");
/// assert_eq!(fold.train.n_users() + fold.test_visible.n_users(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct CrossValidationFactory<'a> {
    dataset: &'a Dataset,
    users: Vec<&'a str>,
    folds: usize,
    shuffle: bool,
    seed: u64,
    splits: Vec<(Vec<usize>, Vec<usize>)>,
}

impl<'a> CrossValidationFactory<'a> {
    /// Create a factory over `dataset` with `folds` folds.
    ///
    /// Without [`with_seed`](Self::with_seed) a seed is drawn at random.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `folds < 2` or the dataset has
    /// fewer users than folds.
    pub fn new(dataset: &'a Dataset, folds: usize, shuffle: bool) -> Result<Self> {
        if folds < 2 {
            return Err(SweepError::invalid_config("folds", folds, ">= 2"));
        }
        if dataset.n_users() < folds {
            return Err(SweepError::invalid_config(
                "folds",
                folds,
                format!("<= number of users ({})", dataset.n_users()),
            ));
        }

        let mut factory = Self {
            dataset,
            users: dataset.users().collect(),
            folds,
            shuffle,
            seed: rand::thread_rng().gen(),
            splits: Vec::new(),
        };
        factory.assign_folds();
        Ok(factory)
    }

    /// Fix the seed used for fold assignment and visible/hidden splits.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.assign_folds();
        self
    }

    /// Seed in use.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn assign_folds(&mut self) {
        let mut kfold = KFold::new(self.folds);
        if self.shuffle {
            kfold = kfold.with_random_state(self.seed);
        }
        self.splits = kfold.split(self.users.len());
    }

    fn run_seed(&self, run: usize) -> u64 {
        self.seed
            .wrapping_add(run as u64 + 1)
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    fn partition_name(&self, run: usize, partition: FoldPartition) -> String {
        format!("{}/fold{run}/{partition}", self.dataset.name())
    }
}

impl FoldSource for CrossValidationFactory<'_> {
    fn fold_count(&self) -> usize {
        self.folds
    }

    fn fold_data(&self, run: usize) -> Result<FoldData> {
        let (train_idx, test_idx) = self.splits.get(run).ok_or_else(|| {
            SweepError::invalid_config("run_index", run, format!("< folds ({})", self.folds))
        })?;

        let mut train = Dataset::new(self.partition_name(run, FoldPartition::Train));
        for &idx in train_idx {
            let user = self.users[idx];
            if let Some(history) = self.dataset.history(user) {
                train.insert_history(user, history.clone());
            }
        }

        let mut test_visible = Dataset::new(self.partition_name(run, FoldPartition::TestVisible));
        let mut test_hidden = Dataset::new(self.partition_name(run, FoldPartition::TestHidden));
        let mut rng = rand::rngs::StdRng::seed_from_u64(self.run_seed(run));

        for &idx in test_idx {
            let user = self.users[idx];
            let Some(history) = self.dataset.history(user) else {
                continue;
            };

            let mut items: Vec<(&String, &u32)> = history.iter().collect();
            items.shuffle(&mut rng);
            let n_visible = items.len().div_ceil(2);

            let visible: History = items[..n_visible]
                .iter()
                .map(|&(item, plays)| (item.clone(), *plays))
                .collect();
            let hidden: History = items[n_visible..]
                .iter()
                .map(|&(item, plays)| (item.clone(), *plays))
                .collect();

            test_visible.insert_history(user, visible);
            test_hidden.insert_history(user, hidden);
        }

        debug!(
            run,
            train_users = train.n_users(),
            test_users = test_visible.n_users(),
            hidden_listens = test_hidden.n_listens(),
            "built fold"
        );

        Ok(FoldData {
            train,
            test_visible,
            test_hidden,
        })
    }
}


#[cfg(test)]
mod tests_kfold_contract;
