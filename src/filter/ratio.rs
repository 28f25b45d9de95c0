//! Lowe ratio test.

use crate::matching::{Correspondence, KnnMatch};

/// Keeps the best candidate of every list whose distance is strictly below
/// `threshold` times the runner-up distance.
///
/// Lists with fewer than two candidates cannot be tested and are dropped.
pub fn ratio_filter(matches: &[KnnMatch], threshold: f32) -> Vec<Correspondence> {
    matches
        .iter()
        .filter_map(|m| {
            let (best, second) = m.best_pair()?;
            (best.distance < threshold * second.distance).then_some(*best)
        })
        .collect()
}
