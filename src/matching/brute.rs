//! Exact brute-force L2 matcher.

use crate::features::Descriptors;
#[cfg(feature = "rayon")]
use crate::kernel::rayon::knn_scan_par;
use crate::kernel::{knn_scan, Neighbor};
use crate::matching::{Correspondence, KnnMatch, KnnMatcher};
use crate::trace::{trace_event, trace_span};
use crate::util::{ObjLocError, ObjLocResult};

// Use the SIMD kernel when available.
#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::L2Scalar as L2;
#[cfg(feature = "simd")]
use crate::kernel::simd::L2Simd as L2;

/// Compares every query row against every train row.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForceMatcher {
    parallel: bool,
}

impl BruteForceMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests query-parallel search; ignored without the `rayon` feature.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    fn scan(&self, query: &Descriptors, train: &Descriptors, k: usize) -> Vec<Vec<Neighbor>> {
        #[cfg(feature = "rayon")]
        if self.parallel {
            return knn_scan_par::<L2>(query, train, k);
        }
        query.rows().map(|row| knn_scan::<L2>(row, train, k)).collect()
    }
}

impl KnnMatcher for BruteForceMatcher {
    fn knn_match(
        &self,
        query: &Descriptors,
        train: &Descriptors,
        k: usize,
    ) -> ObjLocResult<Vec<KnnMatch>> {
        if k == 0 {
            return Err(ObjLocError::InvalidInput("k must be at least 1"));
        }
        if !query.is_empty() && !train.is_empty() && query.dim() != train.dim() {
            return Err(ObjLocError::DescriptorDimension {
                expected: train.dim(),
                got: query.dim(),
            });
        }

        let _span = trace_span!("knn_match", queries = query.len(), train = train.len()).entered();

        let matches: Vec<KnnMatch> = self
            .scan(query, train, k)
            .into_iter()
            .enumerate()
            .map(|(reference_idx, neighbors)| {
                let candidates = neighbors
                    .into_iter()
                    .map(|n| Correspondence {
                        reference_idx,
                        scene_idx: n.train_idx,
                        distance: n.distance,
                    })
                    .collect();
                KnnMatch::new(0, candidates)
            })
            .collect();

        trace_event!("knn_matches", count = matches.len());
        Ok(matches)
    }
}
