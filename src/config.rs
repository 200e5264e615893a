//! Sweep configuration.
//!
//! Defaults reproduce the reference experiment: 5 runs per K over 10-fold
//! cross-validation, 10 recommendations per user, and a K grid from 1 to
//! 100. Values can be read from a TOML file and then overridden field by
//! field (the CLI does this with its flags).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// Default neighbour counts to sweep.
pub const DEFAULT_K_VALUES: [usize; 12] = [1, 2, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// Parameters of a neighbour-count sweep.
///
/// # Examples
///
/// ```
/// use aprender_knn_sweep::config::SweepConfig;
///
/// let config = SweepConfig::from_toml_str("runs = 3\nk_values = [5, 10]\n")
///     .expect("valid config");
/// assert_eq!(config.runs, 3);
/// assert_eq!(config.folds, 10);
/// assert_eq!(config.k_values, vec![5, 10]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Neighbour counts to evaluate, in order
    pub k_values: Vec<usize>,
    /// Repeated runs (J) per K; run r uses fold r
    pub runs: usize,
    /// Cross-validation folds (F)
    pub folds: usize,
    /// Items recommended per user (N)
    pub num_recommendations: usize,
    /// Shuffle users before assigning folds
    pub shuffle: bool,
    /// Seed for fold assignment; drawn at random when absent
    pub seed: Option<u64>,
    /// Directory dataset names are resolved against
    pub data_dir: PathBuf,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            k_values: DEFAULT_K_VALUES.to_vec(),
            runs: 5,
            folds: 10,
            num_recommendations: 10,
            shuffle: true,
            seed: None,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl SweepConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on malformed TOML or unknown keys.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| SweepError::invalid_config("config", "<toml>", e.to_string()))
    }

    /// Read a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a configuration
    /// error if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Set the K grid.
    #[must_use]
    pub fn with_k_values(mut self, k_values: Vec<usize>) -> Self {
        self.k_values = k_values;
        self
    }

    /// Set the number of runs per K.
    #[must_use]
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Set the number of folds.
    #[must_use]
    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    /// Set the number of recommendations per user.
    #[must_use]
    pub fn with_num_recommendations(mut self, n: usize) -> Self {
        self.num_recommendations = n;
        self
    }

    /// Set a fixed seed for fold assignment.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every constraint.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as a configuration error.
    pub fn validate(&self) -> Result<()> {
        if self.num_recommendations == 0 {
            return Err(SweepError::invalid_config(
                "num_recommendations",
                self.num_recommendations,
                ">= 1",
            ));
        }
        if self.folds < 2 {
            return Err(SweepError::invalid_config("folds", self.folds, ">= 2"));
        }
        if self.runs == 0 {
            return Err(SweepError::invalid_config("runs", self.runs, ">= 1"));
        }
        if self.runs > self.folds {
            return Err(SweepError::invalid_config(
                "runs",
                self.runs,
                format!("<= folds ({})", self.folds),
            ));
        }
        if self.k_values.is_empty() {
            return Err(SweepError::invalid_config("k_values", "[]", "non-empty"));
        }
        if self.k_values.contains(&0) {
            return Err(SweepError::invalid_config(
                "k_values",
                format!("{:?}", self.k_values),
                "every K >= 1",
            ));
        }

        let mut seen = HashSet::with_capacity(self.k_values.len());
        if let Some(dup) = self.k_values.iter().find(|&&k| !seen.insert(k)) {
            return Err(SweepError::invalid_config(
                "k_values",
                dup,
                "no duplicate K values",
            ));
        }

        Ok(())
    }
}
