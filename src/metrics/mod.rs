//! Recommendation accuracy metrics.
//!
//! Accuracy compares each user's recommendation list with the items held
//! out for that user:
//!
//! ```text
//! accuracy = 100 × Σ_u |R_u ∩ H_u| / Σ_u min(N, |H_u|)
//! ```
//!
//! where `R_u` is the list recommended to user `u`, `H_u` the user's hidden
//! items and `N` the recommendation count. Capping the denominator at N
//! means a perfect recommender scores 100% even for users with more hidden
//! items than recommendation slots.

use std::collections::HashSet;

use serde::Serialize;

/// Number of recommended items that appear in `hidden`.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use aprender_knn_sweep::metrics::hit_count;
///
/// let hidden: HashSet<String> = ["b", "d"].iter().map(|s| s.to_string()).collect();
/// let recs = vec!["a".to_string(), "b".to_string(), "c".to_string()];
/// assert_eq!(hit_count(&recs, &hidden), 1);
/// ```
#[must_use]
pub fn hit_count(recommended: &[String], hidden: &HashSet<String>) -> usize {
    recommended.iter().filter(|item| hidden.contains(*item)).count()
}

/// Accuracy percentage from raw totals; `None` when nothing was evaluable.
#[must_use]
pub fn accuracy_percent(hits: usize, possible: usize) -> Option<f64> {
    (possible > 0).then(|| 100.0 * hits as f64 / possible as f64)
}

/// Running accuracy totals over the users of one evaluation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccuracyTally {
    /// Recommended items found in the hidden sets
    pub hits: usize,
    /// Sum of `min(N, |hidden|)` over evaluated users
    pub possible: usize,
    /// Users evaluated
    pub users: usize,
}

impl AccuracyTally {
    /// Empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one user's outcome. Users without hidden items are skipped.
    pub fn record(&mut self, recommended: &[String], hidden: &HashSet<String>, n: usize) {
        if hidden.is_empty() {
            return;
        }
        self.hits += hit_count(recommended, hidden);
        self.possible += n.min(hidden.len());
        self.users += 1;
    }

    /// Accuracy in percent, or `None` if no user was evaluated.
    #[must_use]
    pub fn percent(&self) -> Option<f64> {
        accuracy_percent(self.hits, self.possible)
    }
}
