//! Set difference between two users' histories.

use std::collections::HashSet;
use std::hash::Hash;

/// Items in `candidates` that do not appear in `reference`.
///
/// Used to restrict scoring to items a user has not interacted with yet.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use aprender_knn_sweep::recommend::unexplored;
///
/// let seen: HashSet<&str> = ["a", "b"].into_iter().collect();
/// let neighbour = ["b", "c", "d"];
///
/// let fresh = unexplored(&seen, neighbour.iter());
/// assert_eq!(fresh.len(), 2);
/// assert!(fresh.contains("c") && fresh.contains("d"));
/// ```
#[must_use]
pub fn unexplored<'a, T, I>(reference: &HashSet<T>, candidates: I) -> HashSet<T>
where
    T: Eq + Hash + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    candidates
        .into_iter()
        .filter(|item| !reference.contains(*item))
        .cloned()
        .collect()
}
