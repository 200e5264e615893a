//! Neighbour-count sweep over repeated cross-validation runs.
//!
//! For every K in the configured grid the driver evaluates J runs (run `r`
//! uses fold `r`), aggregates min/avg/max accuracy, and keeps the K with the
//! highest average. The first K to reach a given average wins ties.

mod report;

use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::SweepConfig;
use crate::data::{Dataset, DatasetLoader};
use crate::error::{Result, SweepError};
use crate::evaluate::Evaluator;
use crate::model_selection::{CrossValidationFactory, FoldSource};
use crate::recommend::UserKnn;

/// Aggregated accuracy of one K over all its runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KStatistics {
    /// Neighbour count
    pub k: usize,
    /// Lowest run accuracy
    pub min_accuracy: f64,
    /// Mean run accuracy
    pub avg_accuracy: f64,
    /// Highest run accuracy
    pub max_accuracy: f64,
    /// Number of runs aggregated
    pub runs: usize,
    /// Accuracy of each run, in run order
    pub accuracies: Vec<f64>,
}

/// Per-K accumulator threaded through the run loop.
#[derive(Debug, Clone)]
struct RunAccumulator {
    sum: f64,
    min: f64,
    max: f64,
    accuracies: Vec<f64>,
}

impl RunAccumulator {
    fn new(runs: usize) -> Self {
        Self {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            accuracies: Vec::with_capacity(runs.min(1024)),
        }
    }

    fn record(&mut self, accuracy: f64) {
        self.sum += accuracy;
        self.min = self.min.min(accuracy);
        self.max = self.max.max(accuracy);
        self.accuracies.push(accuracy);
    }

    /// Callers record at least one run before finishing.
    fn finish(self, k: usize) -> KStatistics {
        KStatistics {
            k,
            min_accuracy: self.min,
            avg_accuracy: self.sum / self.accuracies.len() as f64,
            max_accuracy: self.max,
            runs: self.accuracies.len(),
            accuracies: self.accuracies,
        }
    }
}

/// Update best score and K if the current average is strictly better.
fn update_best_if_improved(avg: f64, k: usize, best_avg: &mut f64, best_k: &mut usize) {
    if avg > *best_avg {
        *best_avg = avg;
        *best_k = k;
    }
}

/// Outcome of a complete sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepResult {
    /// Dataset the sweep ran on
    pub dataset: String,
    /// K with the highest average accuracy
    pub best_k: usize,
    /// Average accuracy of `best_k`
    pub best_avg_accuracy: f64,
    /// Per-K statistics in grid order
    pub statistics: Vec<KStatistics>,
    /// Wall-clock duration of the sweep in seconds
    pub elapsed_secs: f64,
}

impl SweepResult {
    /// Statistics for a given K, if it was swept.
    #[must_use]
    pub fn statistics_for(&self, k: usize) -> Option<&KStatistics> {
        self.statistics.iter().find(|s| s.k == k)
    }
}

/// Drives a K sweep with a given evaluator.
///
/// # Example
///
/// ```
/// use aprender_knn_sweep::error::Result;
/// use aprender_knn_sweep::prelude::*;
///
/// // Crafted accuracies instead of real evaluation
/// let table = |algo: &UserKnn, _: &Dataset, _: &Dataset, _: &Dataset| -> Result<f64> {
///     Ok(match algo.num_neighbours() {
///         1 => 40.0,
///         10 => 72.0,
///         _ => 65.0,
///     })
/// };
///
/// let listens = (0..4).map(|u| Listen::new(format!("u{u}"), "song", 1));
/// let dataset = Dataset::from_listens("crafted", listens);
///
/// let config = SweepConfig::default()
///     .with_k_values(vec![1, 10, 50])
///     .with_folds(2)
///     .with_runs(2)
///     .with_seed(1);
/// let result = SweepDriver::new(config, table).expect("valid").run(&dataset).expect("sweep");
/// assert_eq!(result.best_k, 10);
/// assert_eq!(result.best_avg_accuracy, 72.0);
/// ```
#[derive(Debug, Clone)]
pub struct SweepDriver<E> {
    config: SweepConfig,
    evaluator: E,
}

impl<E: Evaluator> SweepDriver<E> {
    /// Create a driver after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn new(config: SweepConfig, evaluator: E) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, evaluator })
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Load `name` through `loader`, then sweep it.
    ///
    /// # Errors
    ///
    /// Propagates load, fold and evaluation failures.
    pub fn run_named<L: DatasetLoader>(&self, loader: &L, name: &str) -> Result<SweepResult> {
        let dataset = loader.load(name)?;
        self.run(&dataset)
    }

    /// Sweep an already loaded dataset with configured cross-validation.
    ///
    /// # Errors
    ///
    /// Propagates fold and evaluation failures.
    pub fn run(&self, dataset: &Dataset) -> Result<SweepResult> {
        let mut factory =
            CrossValidationFactory::new(dataset, self.config.folds, self.config.shuffle)?;
        if let Some(seed) = self.config.seed {
            factory = factory.with_seed(seed);
        }
        info!(
            folds = self.config.folds,
            seed = factory.seed(),
            "cross-validation folds assigned"
        );
        self.run_with_folds(dataset.name(), &factory)
    }

    /// Sweep using an arbitrary fold source.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the source has fewer folds than
    /// runs; any fold or evaluation failure aborts the sweep with the K and
    /// run that were in progress.
    pub fn run_with_folds<S: FoldSource>(&self, dataset: &str, folds: &S) -> Result<SweepResult> {
        let runs = self.config.runs;
        if folds.fold_count() < runs {
            return Err(SweepError::invalid_config(
                "runs",
                runs,
                format!("<= available folds ({})", folds.fold_count()),
            ));
        }

        info!(dataset, "Determining optimal K");
        let timer = Instant::now();

        let mut statistics = Vec::with_capacity(self.config.k_values.len());
        let mut best_avg = f64::NEG_INFINITY;
        let mut best_k = self.config.k_values[0];

        for &k in &self.config.k_values {
            info!(k, "Running experiment for K={k}");
            let mut acc = RunAccumulator::new(runs);

            for run in 0..runs {
                let accuracy = self.evaluate_run(folds, k, run)?;
                info!(
                    k,
                    job = run + 1,
                    accuracy,
                    "Accuracy for K={k} for job {} is {accuracy:.3} %",
                    run + 1
                );
                acc.record(accuracy);
            }

            let stats = acc.finish(k);
            update_best_if_improved(stats.avg_accuracy, k, &mut best_avg, &mut best_k);
            statistics.push(stats);
        }

        let result = SweepResult {
            dataset: dataset.to_string(),
            best_k,
            best_avg_accuracy: best_avg,
            statistics,
            elapsed_secs: timer.elapsed().as_secs_f64(),
        };

        for stats in &result.statistics {
            info!(
                "K : {} => {{{:.3}, {:.3}, {:.3}}}",
                stats.k, stats.min_accuracy, stats.avg_accuracy, stats.max_accuracy
            );
        }
        info!(
            best_k = result.best_k,
            best_avg_accuracy = result.best_avg_accuracy,
            "Best K-value is {} with best K-accuracy {:.3}",
            result.best_k,
            result.best_avg_accuracy
        );
        info!("Time to run the experiment : {:.1} seconds", result.elapsed_secs);

        Ok(result)
    }

    fn evaluate_run<S: FoldSource>(&self, folds: &S, k: usize, run: usize) -> Result<f64> {
        let fold = folds.fold_data(run).map_err(|e| e.in_run(k, run))?;
        let algorithm = UserKnn::new(self.config.num_recommendations).with_num_neighbours(k);

        let accuracy = self
            .evaluator
            .run(&algorithm, &fold.train, &fold.test_visible, &fold.test_hidden)
            .map_err(|e| {
                warn!(k, run, error = %e, "run failed, aborting sweep");
                e.in_run(k, run)
            })?;

        if !accuracy.is_finite() {
            return Err(
                SweepError::evaluation(format!("non-finite accuracy {accuracy}")).in_run(k, run),
            );
        }
        Ok(accuracy)
    }
}
