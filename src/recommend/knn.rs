//! User-based K-nearest-neighbours recommender.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{backfill, unexplored, ScoredItem, TopNSelector};
use crate::data::{Dataset, History};
use crate::error::{Result, SweepError};

/// Default neighbour count.
pub const DEFAULT_NUM_NEIGHBOURS: usize = 10;

/// Similarity between two users' item sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Similarity {
    /// `|A ∩ B| / sqrt(|A| · |B|)`
    #[default]
    Cosine,
    /// `|A ∩ B| / |A ∪ B|`
    Jaccard,
}

impl Similarity {
    /// Similarity between a set of items and another user's history.
    ///
    /// Returns 0.0 when either side is empty.
    #[must_use]
    pub fn between(self, items: &HashSet<String>, other: &History) -> f64 {
        if items.is_empty() || other.is_empty() {
            return 0.0;
        }

        let shared = items.iter().filter(|item| other.contains_key(*item)).count() as f64;
        let a = items.len() as f64;
        let b = other.len() as f64;

        match self {
            Self::Cosine => shared / (a * b).sqrt(),
            Self::Jaccard => shared / (a + b - shared),
        }
    }
}

/// User-based KNN recommender.
///
/// For a test user, finds the K training users whose histories are most
/// similar to the user's visible items, scores every item those neighbours
/// listened to (and the user has not) by the summed similarity of the
/// neighbours that hold it, keeps the best N, and tops the list up from the
/// popularity ranking when fewer than N items could be scored.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use aprender_knn_sweep::data::{Dataset, Listen};
/// use aprender_knn_sweep::recommend::UserKnn;
///
/// let train = Dataset::from_listens("train", vec![
///     Listen::new("a", "rock1", 1),
///     Listen::new("a", "rock2", 1),
///     Listen::new("b", "jazz1", 1),
/// ]);
/// let seen: HashSet<String> = ["rock1".to_string()].into_iter().collect();
///
/// let knn = UserKnn::new(1).with_num_neighbours(1);
/// let recs = knn.recommend(&train, &train.popularity(), &seen).expect("valid");
/// assert_eq!(recs, vec!["rock2"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UserKnn {
    num_recommendations: usize,
    num_neighbours: usize,
    similarity: Similarity,
}

impl UserKnn {
    /// Creates a recommender producing `num_recommendations` items per user.
    #[must_use]
    pub fn new(num_recommendations: usize) -> Self {
        Self {
            num_recommendations,
            num_neighbours: DEFAULT_NUM_NEIGHBOURS,
            similarity: Similarity::default(),
        }
    }

    /// Sets the neighbour count K.
    #[must_use]
    pub fn with_num_neighbours(mut self, k: usize) -> Self {
        self.num_neighbours = k;
        self
    }

    /// Sets the similarity measure.
    #[must_use]
    pub fn with_similarity(mut self, similarity: Similarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// Neighbour count K.
    #[must_use]
    pub fn num_neighbours(&self) -> usize {
        self.num_neighbours
    }

    /// Items recommended per user (N).
    #[must_use]
    pub fn num_recommendations(&self) -> usize {
        self.num_recommendations
    }

    /// Similarity measure in use.
    #[must_use]
    pub fn similarity(&self) -> Similarity {
        self.similarity
    }

    /// The K training users most similar to `seen`, best first.
    ///
    /// Users with zero similarity are never neighbours.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when K is zero.
    pub fn neighbours(&self, train: &Dataset, seen: &HashSet<String>) -> Result<Vec<ScoredItem>> {
        let mut nearest = TopNSelector::new(self.num_neighbours)
            .map_err(|_| SweepError::invalid_config("num_neighbours", self.num_neighbours, ">= 1"))?;

        for (user, history) in train.histories() {
            let sim = self.similarity.between(seen, history);
            if sim > 0.0 {
                nearest.offer(user, sim);
            }
        }

        Ok(nearest.into_sorted_vec())
    }

    /// Recommend up to N unseen items.
    ///
    /// `popularity` is the training set's popularity ranking; it is only
    /// read when the neighbours cannot supply N items.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when K or N is zero.
    pub fn recommend(
        &self,
        train: &Dataset,
        popularity: &[String],
        seen: &HashSet<String>,
    ) -> Result<Vec<String>> {
        let mut top = TopNSelector::new(self.num_recommendations).map_err(|_| {
            SweepError::invalid_config("num_recommendations", self.num_recommendations, ">= 1")
        })?;

        let mut scores: BTreeMap<String, f64> = BTreeMap::new();
        for neighbour in self.neighbours(train, seen)? {
            let Some(history) = train.history(&neighbour.item) else {
                continue;
            };
            for item in unexplored(seen, history.keys()) {
                *scores.entry(item).or_insert(0.0) += neighbour.score;
            }
        }

        for (item, score) in scores {
            top.offer(item, score);
        }

        let ranked: Vec<String> = top.into_sorted_vec().into_iter().map(|s| s.item).collect();
        if ranked.len() == self.num_recommendations {
            return Ok(ranked);
        }

        // At most N of these collide with already ranked items.
        let fallback: Vec<String> = popularity
            .iter()
            .filter(|item| !seen.contains(*item))
            .take(self.num_recommendations.saturating_mul(2))
            .cloned()
            .collect();

        Ok(backfill(Some(ranked), self.num_recommendations, &fallback))
    }
}
