//! Rayon-parallel k-NN search (feature-gated).
//!
//! Query rows are independent, so the scan parallelizes over queries. Output
//! order follows the query order, identical to the sequential scan.

use crate::features::Descriptors;
use crate::kernel::{knn_scan, DistanceKernel, Neighbor};
use rayon::prelude::*;

/// Runs [`knn_scan`] for every query row in parallel.
pub fn knn_scan_par<K: DistanceKernel>(
    query: &Descriptors,
    train: &Descriptors,
    k: usize,
) -> Vec<Vec<Neighbor>> {
    let rows: Vec<&[f32]> = query.rows().collect();
    rows.par_iter()
        .map(|row| knn_scan::<K>(row, train, k))
        .collect()
}
