//! Recommendation primitives and the user-based KNN recommender.
//!
//! # Components
//!
//! - [`TopNSelector`]: bounded top-N selection over scored items
//! - [`backfill`]: tops a short recommendation list up from a popularity ranking
//! - [`unexplored`]: items a user has not interacted with yet
//! - [`UserKnn`]: neighbour-based recommender built on the three above
//!
//! # Quick Start
//!
//! ```
//! use aprender_knn_sweep::recommend::{backfill, TopNSelector};
//!
//! let mut top = TopNSelector::new(2).expect("n > 0");
//! for (item, score) in [("a", 0.3), ("b", 0.8), ("c", 0.5)] {
//!     top.offer(item, score);
//! }
//! let ranked: Vec<String> = top.into_sorted_vec().into_iter().map(|s| s.item).collect();
//! assert_eq!(ranked, vec!["b", "c"]);
//!
//! let popular = vec!["b".to_string(), "z".to_string()];
//! assert_eq!(backfill(Some(ranked), 3, &popular), vec!["b", "c", "z"]);
//! ```

mod backfill;
pub mod knn;
mod top_n;
mod unexplored;

pub use backfill::backfill;
pub use knn::{Similarity, UserKnn};
pub use top_n::{ScoredItem, TopNSelector};
pub use unexplored::unexplored;
