//! Listening datasets: users, items and their interaction records.
//!
//! A [`Dataset`] maps each user to the items they listened to, with play
//! counts. Users and items are kept in ordered maps so that iteration, and
//! everything derived from it (folds, popularity, recommendations), is
//! deterministic.

mod loader;

pub use loader::{DatasetLoader, TripletLoader};

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A single (user, item, plays) interaction record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listen {
    /// User identifier
    pub user: String,
    /// Item identifier
    pub item: String,
    /// Number of plays (at least 1)
    pub plays: u32,
}

impl Listen {
    /// Create a listen record.
    #[must_use]
    pub fn new(user: impl Into<String>, item: impl Into<String>, plays: u32) -> Self {
        Self {
            user: user.into(),
            item: item.into(),
            plays,
        }
    }
}

/// Per-user listening history: item id to play count.
pub type History = BTreeMap<String, u32>;

/// A named collection of user listening histories.
///
/// # Examples
///
/// ```
/// use aprender_knn_sweep::data::{Dataset, Listen};
///
/// let ds = Dataset::from_listens("tiny", vec![
///     Listen::new("u1", "song_a", 3),
///     Listen::new("u1", "song_b", 1),
///     Listen::new("u2", "song_a", 2),
/// ]);
/// assert_eq!(ds.n_users(), 2);
/// assert_eq!(ds.n_items(), 2);
/// assert_eq!(ds.popularity()[0], "song_a");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    name: String,
    histories: BTreeMap<String, History>,
}

impl Dataset {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            histories: BTreeMap::new(),
        }
    }

    /// Builds a dataset from listen records, summing plays of repeated
    /// (user, item) pairs.
    #[must_use]
    pub fn from_listens<I>(name: impl Into<String>, listens: I) -> Self
    where
        I: IntoIterator<Item = Listen>,
    {
        let mut dataset = Self::new(name);
        for listen in listens {
            dataset.add_listen(listen);
        }
        dataset
    }

    /// Records one listen.
    pub fn add_listen(&mut self, listen: Listen) {
        let plays = self
            .histories
            .entry(listen.user)
            .or_default()
            .entry(listen.item)
            .or_insert(0);
        *plays = plays.saturating_add(listen.plays);
    }

    /// Inserts (or replaces) a user's whole history. Empty histories are
    /// ignored.
    pub fn insert_history(&mut self, user: impl Into<String>, history: History) {
        if !history.is_empty() {
            self.histories.insert(user.into(), history);
        }
    }

    /// Dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of users with at least one listen.
    #[must_use]
    pub fn n_users(&self) -> usize {
        self.histories.len()
    }

    /// Number of distinct items.
    #[must_use]
    pub fn n_items(&self) -> usize {
        self.items().len()
    }

    /// Number of distinct (user, item) pairs.
    #[must_use]
    pub fn n_listens(&self) -> usize {
        self.histories.values().map(BTreeMap::len).sum()
    }

    /// Whether the dataset holds no listens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// User identifiers in ascending order.
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.histories.keys().map(String::as_str)
    }

    /// Users with their histories, in ascending user order.
    pub fn histories(&self) -> impl Iterator<Item = (&str, &History)> {
        self.histories.iter().map(|(u, h)| (u.as_str(), h))
    }

    /// Distinct item identifiers.
    #[must_use]
    pub fn items(&self) -> BTreeSet<&str> {
        self.histories
            .values()
            .flat_map(|h| h.keys().map(String::as_str))
            .collect()
    }

    /// A user's history, if the user exists.
    #[must_use]
    pub fn history(&self, user: &str) -> Option<&History> {
        self.histories.get(user)
    }

    /// The set of items a user listened to (empty for unknown users).
    #[must_use]
    pub fn item_set(&self, user: &str) -> HashSet<String> {
        self.histories
            .get(user)
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// All listen records, ordered by user then item.
    pub fn listens(&self) -> impl Iterator<Item = Listen> + '_ {
        self.histories.iter().flat_map(|(user, history)| {
            history
                .iter()
                .map(move |(item, &plays)| Listen::new(user.clone(), item.clone(), plays))
        })
    }

    /// Items ranked by overall popularity.
    ///
    /// Ranks by number of distinct listeners, then total plays (both
    /// descending), then item id ascending.
    #[must_use]
    pub fn popularity(&self) -> Vec<String> {
        let mut counts: HashMap<&str, (usize, u64)> = HashMap::new();
        for history in self.histories.values() {
            for (item, &plays) in history {
                let entry = counts.entry(item.as_str()).or_default();
                entry.0 += 1;
                entry.1 += u64::from(plays);
            }
        }

        let mut ranked: Vec<(&str, (usize, u64))> = counts.into_iter().collect();
        ranked.sort_by(|(item_a, (users_a, plays_a)), (item_b, (users_b, plays_b))| {
            users_b
                .cmp(users_a)
                .then_with(|| plays_b.cmp(plays_a))
                .then_with(|| item_a.cmp(item_b))
        });
        ranked.into_iter().map(|(item, _)| item.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_listens(
            "sample",
            vec![
                Listen::new("alice", "s1", 5),
                Listen::new("alice", "s2", 1),
                Listen::new("bob", "s2", 2),
                Listen::new("bob", "s3", 9),
                Listen::new("carol", "s2", 1),
                Listen::new("carol", "s3", 1),
            ],
        )
    }

    #[test]
    fn test_counts() {
        let ds = sample();
        assert_eq!(ds.name(), "sample");
        assert_eq!(ds.n_users(), 3);
        assert_eq!(ds.n_items(), 3);
        assert_eq!(ds.n_listens(), 6);
        assert!(!ds.is_empty());
    }

    #[test]
    fn test_repeated_listens_accumulate() {
        let ds = Dataset::from_listens(
            "dup",
            vec![Listen::new("u", "i", 2), Listen::new("u", "i", 3)],
        );
        assert_eq!(ds.n_listens(), 1);
        assert_eq!(ds.history("u").and_then(|h| h.get("i")), Some(&5));
    }

    #[test]
    fn test_popularity_ranking() {
        // s2: 3 listeners; s3: 2 listeners; s1: 1 listener
        assert_eq!(sample().popularity(), vec!["s2", "s3", "s1"]);
    }

    #[test]
    fn test_popularity_tiebreak_on_plays_then_id() {
        let ds = Dataset::from_listens(
            "ties",
            vec![
                Listen::new("u1", "b", 1),
                Listen::new("u2", "a", 1),
                Listen::new("u3", "c", 4),
            ],
        );
        assert_eq!(ds.popularity(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_item_set_unknown_user() {
        assert!(sample().item_set("nobody").is_empty());
        assert_eq!(sample().item_set("bob").len(), 2);
    }

    #[test]
    fn test_listens_roundtrip_ordering() {
        let ds = sample();
        let rebuilt = Dataset::from_listens("sample", ds.listens());
        assert_eq!(rebuilt, ds);
        let first = ds.listens().next().expect("non-empty");
        assert_eq!(first, Listen::new("alice", "s1", 5));
    }

    #[test]
    fn test_insert_empty_history_ignored() {
        let mut ds = Dataset::new("x");
        ds.insert_history("ghost", History::new());
        assert!(ds.is_empty());
    }
}
