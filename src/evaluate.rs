//! Running a recommender against one cross-validation fold.

use std::collections::HashSet;

use tracing::debug;

use crate::data::Dataset;
use crate::error::{Result, SweepError};
use crate::metrics::AccuracyTally;
use crate::recommend::UserKnn;

/// Produces one accuracy percentage for a configured recommender on a fold.
///
/// Implemented by [`HoldoutEvaluator`] and by any closure with the same
/// signature, which keeps crafted accuracy tables easy to plug into a sweep.
pub trait Evaluator {
    /// Evaluate `algorithm` trained on `train` against the test users.
    ///
    /// # Errors
    ///
    /// Any error aborts the sweep in progress.
    fn run(
        &self,
        algorithm: &UserKnn,
        train: &Dataset,
        test_visible: &Dataset,
        test_hidden: &Dataset,
    ) -> Result<f64>;
}

impl<F> Evaluator for F
where
    F: Fn(&UserKnn, &Dataset, &Dataset, &Dataset) -> Result<f64>,
{
    fn run(
        &self,
        algorithm: &UserKnn,
        train: &Dataset,
        test_visible: &Dataset,
        test_hidden: &Dataset,
    ) -> Result<f64> {
        self(algorithm, train, test_visible, test_hidden)
    }
}

/// Hold-out evaluation: recommend from the visible half, score against the
/// hidden half.
///
/// Every user in `test_hidden` receives N recommendations computed from
/// their `test_visible` items; the run's accuracy is
/// [`AccuracyTally::percent`] over those users.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldoutEvaluator;

impl HoldoutEvaluator {
    /// Create an evaluator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Evaluate and return the raw tally instead of a percentage.
    ///
    /// # Errors
    ///
    /// Returns an evaluation error for an empty training set, or any error
    /// raised by the recommender.
    pub fn tally(
        &self,
        algorithm: &UserKnn,
        train: &Dataset,
        test_visible: &Dataset,
        test_hidden: &Dataset,
    ) -> Result<AccuracyTally> {
        if train.is_empty() {
            return Err(SweepError::evaluation(format!(
                "training set '{}' is empty",
                train.name()
            )));
        }

        let popularity = train.popularity();
        let mut tally = AccuracyTally::new();

        for (user, hidden_history) in test_hidden.histories() {
            let hidden: HashSet<String> = hidden_history.keys().cloned().collect();
            let seen = test_visible.item_set(user);
            let recommended = algorithm.recommend(train, &popularity, &seen)?;
            tally.record(&recommended, &hidden, algorithm.num_recommendations());
        }

        debug!(
            k = algorithm.num_neighbours(),
            users = tally.users,
            hits = tally.hits,
            possible = tally.possible,
            "evaluated fold"
        );
        Ok(tally)
    }
}

impl Evaluator for HoldoutEvaluator {
    fn run(
        &self,
        algorithm: &UserKnn,
        train: &Dataset,
        test_visible: &Dataset,
        test_hidden: &Dataset,
    ) -> Result<f64> {
        self.tally(algorithm, train, test_visible, test_hidden)?
            .percent()
            .ok_or_else(|| {
                SweepError::evaluation(format!(
                    "no test users with hidden items in '{}'",
                    test_hidden.name()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Listen;
    use crate::error::ErrorKind;

    fn train() -> Dataset {
        Dataset::from_listens(
            "train",
            vec![
                Listen::new("t1", "a", 1),
                Listen::new("t1", "b", 1),
                Listen::new("t1", "c", 1),
                Listen::new("t2", "d", 1),
                Listen::new("t2", "e", 1),
            ],
        )
    }

    #[test]
    fn test_perfect_recommendation() {
        let visible = Dataset::from_listens("visible", vec![Listen::new("u", "a", 1)]);
        let hidden = Dataset::from_listens(
            "hidden",
            vec![Listen::new("u", "b", 1), Listen::new("u", "c", 1)],
        );

        let knn = UserKnn::new(2).with_num_neighbours(1);
        let acc = HoldoutEvaluator::new()
            .run(&knn, &train(), &visible, &hidden)
            .expect("evaluable");
        assert!((acc - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_miss_scores_zero() {
        let visible = Dataset::from_listens("visible", vec![Listen::new("u", "a", 1)]);
        let hidden = Dataset::from_listens("hidden", vec![Listen::new("u", "e", 1)]);

        let knn = UserKnn::new(1).with_num_neighbours(1);
        let acc = HoldoutEvaluator::new()
            .run(&knn, &train(), &visible, &hidden)
            .expect("evaluable");
        assert_eq!(acc, 0.0);
    }

    #[test]
    fn test_no_hidden_users_is_evaluation_error() {
        let visible = Dataset::from_listens("visible", vec![Listen::new("u", "a", 1)]);
        let hidden = Dataset::new("hidden");

        let err = HoldoutEvaluator::new()
            .run(&UserKnn::new(2), &train(), &visible, &hidden)
            .expect_err("nothing to evaluate");
        assert_eq!(err.kind(), ErrorKind::Evaluation);
    }

    #[test]
    fn test_empty_train_is_evaluation_error() {
        let hidden = Dataset::from_listens("hidden", vec![Listen::new("u", "a", 1)]);
        let err = HoldoutEvaluator::new()
            .run(&UserKnn::new(2), &Dataset::new("train"), &Dataset::new("v"), &hidden)
            .expect_err("empty train");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_closure_evaluator() {
        let fixed = |algo: &UserKnn, _: &Dataset, _: &Dataset, _: &Dataset| -> Result<f64> {
            Ok(algo.num_neighbours() as f64)
        };
        let ds = Dataset::new("x");
        let acc = fixed
            .run(&UserKnn::new(1).with_num_neighbours(7), &ds, &ds, &ds)
            .expect("closure");
        assert_eq!(acc, 7.0);
    }
}
