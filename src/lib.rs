//! Neighbour-count selection for user-based KNN recommenders.
//!
//! The crate sweeps a grid of neighbour counts K, evaluates a user-based
//! KNN recommender on repeated cross-validation runs for each K, and reports
//! min/avg/max accuracy per K together with the best K.
//!
//! # Quick Start
//!
//! ```
//! use aprender_knn_sweep::prelude::*;
//!
//! // Three taste clusters, six users each
//! let listens = (0..18).flat_map(|u| {
//!     (0..6).map(move |i| Listen::new(format!("u{u}"), format!("s{}", (u % 3) * 10 + i), 1))
//! });
//! let dataset = Dataset::from_listens("demo", listens);
//!
//! let config = SweepConfig::default()
//!     .with_k_values(vec![1, 5])
//!     .with_folds(3)
//!     .with_runs(2)
//!     .with_num_recommendations(3)
//!     .with_seed(7);
//!
//! let driver = SweepDriver::new(config, HoldoutEvaluator::new()).expect("valid config");
//! let result = driver.run(&dataset).expect("sweep succeeds");
//! assert!(result.best_k == 1 || result.best_k == 5);
//! assert_eq!(result.statistics.len(), 2);
//! ```
//!
//! # Modules
//!
//! - [`config`]: Sweep parameters (K grid, runs, folds, N, seed)
//! - [`data`]: Listening histories and dataset loading
//! - [`recommend`]: Top-N selection, backfilling and the KNN recommender
//! - [`metrics`]: Hit-based accuracy
//! - [`model_selection`]: K-fold partitioning into train/visible/hidden sets
//! - [`evaluate`]: Scoring a recommender on one fold
//! - [`sweep`]: The K sweep itself

pub mod config;
pub mod data;
pub mod error;
pub mod evaluate;
pub mod metrics;
pub mod model_selection;
pub mod prelude;
pub mod recommend;
pub mod sweep;

pub use error::{Result, SweepError};
pub use sweep::{KStatistics, SweepDriver, SweepResult};
