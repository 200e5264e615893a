//! Bounded top-N selection over a stream of scored items.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::error::{Result, SweepError};

/// An item identifier paired with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    /// Item identifier
    pub item: String,
    /// Score assigned by the recommender
    pub score: f64,
}

impl ScoredItem {
    /// Create a scored item.
    #[must_use]
    pub fn new(item: impl Into<String>, score: f64) -> Self {
        Self {
            item: item.into(),
            score,
        }
    }
}

/// Heap entry ordered by score alone (via [`f64::total_cmp`]).
#[derive(Debug, Clone)]
struct ByScore(ScoredItem);

impl PartialEq for ByScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ByScore {}

impl PartialOrd for ByScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.score.total_cmp(&other.0.score)
    }
}

/// Keeps the N highest-scoring items seen so far.
///
/// Backed by a min-heap capped at N entries. Storage grows with the items
/// actually retained, never past N, no matter how many candidates are
/// offered. Once full, a new item displaces the
/// current minimum only when its score is strictly greater; on ties the
/// item already retained wins.
///
/// # Example
///
/// ```
/// use aprender_knn_sweep::recommend::TopNSelector;
///
/// let mut top = TopNSelector::new(2).expect("n > 0");
/// top.offer("a", 0.1);
/// top.offer("b", 0.7);
/// top.offer("c", 0.4);
///
/// let mut kept: Vec<String> = top.extract().into_iter().map(|s| s.item).collect();
/// kept.sort();
/// assert_eq!(kept, vec!["b", "c"]);
/// ```
#[derive(Debug, Clone)]
pub struct TopNSelector {
    capacity: usize,
    heap: BinaryHeap<Reverse<ByScore>>,
}

impl TopNSelector {
    /// Create a selector retaining at most `n` items.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `n` is zero.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(SweepError::invalid_config("top_n", n, ">= 1"));
        }
        Ok(Self {
            capacity: n,
            heap: BinaryHeap::new(),
        })
    }

    /// Offer a candidate.
    pub fn offer(&mut self, item: impl Into<String>, score: f64) {
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(ByScore(ScoredItem::new(item, score))));
            return;
        }

        if let Some(Reverse(ByScore(min))) = self.heap.peek() {
            if score.total_cmp(&min.score) == Ordering::Greater {
                self.heap.pop();
                self.heap.push(Reverse(ByScore(ScoredItem::new(item, score))));
            }
        }
    }

    /// Maximum number of retained items.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing has been retained yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Lowest retained score, if any.
    #[must_use]
    pub fn min_score(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(ByScore(min))| min.score)
    }

    /// Consume the selector and return the retained items in no particular
    /// order.
    #[must_use]
    pub fn extract(self) -> Vec<ScoredItem> {
        self.heap.into_iter().map(|Reverse(ByScore(item))| item).collect()
    }

    /// Retained items by descending score, ties broken by item id.
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<ScoredItem> {
        let mut items = self.extract();
        items.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.item.cmp(&b.item)));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_names(items: &[ScoredItem]) -> Vec<&str> {
        let mut names: Vec<&str> = items.iter().map(|s| s.item.as_str()).collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = TopNSelector::new(0).expect_err("n = 0 must be rejected");
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_keeps_three_highest() {
        let mut top = TopNSelector::new(3).expect("valid capacity");
        top.offer("A", 0.5);
        top.offer("B", 0.9);
        top.offer("C", 0.2);
        top.offer("D", 0.8);
        top.offer("E", 0.95);

        let kept = top.extract();
        assert_eq!(kept.len(), 3);
        assert_eq!(item_names(&kept), vec!["B", "D", "E"]);
    }

    #[test]
    fn test_fills_unconditionally_below_capacity() {
        let mut top = TopNSelector::new(5).expect("valid capacity");
        top.offer("low", -3.0);
        top.offer("lower", -10.0);
        assert_eq!(top.len(), 2);
        assert_eq!(top.min_score(), Some(-10.0));
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let mut top = TopNSelector::new(2).expect("valid capacity");
        top.offer("first", 1.0);
        top.offer("second", 2.0);
        top.offer("late", 1.0);

        let kept = top.extract();
        assert_eq!(item_names(&kept), vec!["first", "second"]);
    }

    #[test]
    fn test_lower_score_discarded_at_capacity() {
        let mut top = TopNSelector::new(1).expect("valid capacity");
        top.offer("keep", 0.6);
        top.offer("drop", 0.4);
        assert_eq!(item_names(&top.extract()), vec!["keep"]);
    }

    #[test]
    fn test_sorted_vec_descending_with_id_tiebreak() {
        let mut top = TopNSelector::new(4).expect("valid capacity");
        top.offer("z", 0.5);
        top.offer("a", 0.5);
        top.offer("m", 0.9);
        top.offer("q", 0.1);

        let ranked: Vec<String> = top.into_sorted_vec().into_iter().map(|s| s.item).collect();
        assert_eq!(ranked, vec!["m", "a", "z", "q"]);
    }

    #[test]
    fn test_huge_capacity_allocates_lazily() {
        let mut top = TopNSelector::new(usize::MAX / 8).expect("valid capacity");
        assert!(top.is_empty());
        top.offer("only", 1.0);
        assert_eq!(top.len(), 1);
        assert_eq!(top.capacity(), usize::MAX / 8);
    }

    #[test]
    fn test_scored_item_equality_includes_item() {
        assert_ne!(ScoredItem::new("a", 1.0), ScoredItem::new("b", 1.0));
        assert_eq!(ScoredItem::new("a", 1.0), ScoredItem::new("a", 1.0));
    }

    #[test]
    fn test_empty_selector() {
        let top = TopNSelector::new(3).expect("valid capacity");
        assert!(top.is_empty());
        assert_eq!(top.capacity(), 3);
        assert_eq!(top.min_score(), None);
        assert!(top.extract().is_empty());
    }
}
