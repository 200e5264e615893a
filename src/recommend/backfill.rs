//! Popularity backfill for short recommendation lists.

/// Fill `recommendations` up to `target_count` items from a popularity
/// ranking.
///
/// A list that already holds exactly `target_count` items comes back
/// untouched and the popularity list is never read. Otherwise the items of
/// `popularity` are walked in order and each one not yet in the list is
/// appended, until the target is reached or the ranking runs out. Existing
/// entries are never removed or reordered, and the result may be shorter
/// than `target_count` when there are too few distinct candidates.
///
/// `None` is treated as an empty list.
///
/// # Example
///
/// ```
/// use aprender_knn_sweep::recommend::backfill;
///
/// let recs = vec!["X".to_string(), "Y".to_string()];
/// let popular: Vec<String> = ["Y", "Z", "W", "X", "V"].iter().map(|s| s.to_string()).collect();
///
/// let filled = backfill(Some(recs), 4, &popular);
/// assert_eq!(filled, vec!["X", "Y", "Z", "W"]);
/// ```
#[must_use]
pub fn backfill<T>(recommendations: Option<Vec<T>>, target_count: usize, popularity: &[T]) -> Vec<T>
where
    T: PartialEq + Clone,
{
    let mut filled = recommendations.unwrap_or_default();
    if filled.len() == target_count {
        return filled;
    }

    for candidate in popularity {
        if filled.len() >= target_count {
            break;
        }
        // Linear scan; target_count is small.
        if !filled.contains(candidate) {
            filled.push(candidate.clone());
        }
    }

    filled
}
