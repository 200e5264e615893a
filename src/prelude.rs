//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use aprender_knn_sweep::prelude::*;
//! ```

pub use crate::config::SweepConfig;
pub use crate::data::{Dataset, DatasetLoader, Listen, TripletLoader};
pub use crate::error::SweepError;
pub use crate::evaluate::{Evaluator, HoldoutEvaluator};
pub use crate::model_selection::{CrossValidationFactory, FoldSource};
pub use crate::recommend::{backfill, unexplored, TopNSelector, UserKnn};
pub use crate::sweep::{KStatistics, SweepDriver, SweepResult};
