//! Descriptor distance kernels and the exact k-NN scan built on them.

use crate::features::Descriptors;

/// Squared L2 distance between two equal-length descriptor rows.
pub trait DistanceKernel {
    fn squared_l2(a: &[f32], b: &[f32]) -> f32;
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

/// One neighbor found by the scan: train row and L2 distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub train_idx: usize,
    pub distance: f32,
}

/// Keeps the `k` closest neighbors in ascending distance order.
///
/// Ties keep the lower train index first.
struct Nearest {
    k: usize,
    items: Vec<Neighbor>,
}

impl Nearest {
    fn new(k: usize, train_len: usize) -> Self {
        Self {
            k,
            items: Vec::with_capacity(k.min(train_len).saturating_add(1)),
        }
    }

    fn push(&mut self, candidate: Neighbor) {
        if self.k == 0 {
            return;
        }
        if self.items.len() == self.k {
            match self.items.last() {
                Some(worst) if candidate.distance < worst.distance => {}
                _ => return,
            }
        }
        let pos = self
            .items
            .iter()
            .position(|n| candidate.distance < n.distance)
            .unwrap_or(self.items.len());
        self.items.insert(pos, candidate);
        self.items.truncate(self.k);
    }
}

/// Finds the `k` nearest train rows for `query` under kernel `K`.
///
/// Train rows are visited in index order, which together with the strict
/// comparison in the accumulator makes the result deterministic.
pub fn knn_scan<K: DistanceKernel>(query: &[f32], train: &Descriptors, k: usize) -> Vec<Neighbor> {
    let mut nearest = Nearest::new(k, train.len());
    for (train_idx, row) in train.rows().enumerate() {
        let d2 = K::squared_l2(query, row);
        nearest.push(Neighbor {
            train_idx,
            distance: d2.max(0.0).sqrt(),
        });
    }
    nearest.items
}

#[cfg(test)]
mod tests {
    use super::{knn_scan, scalar::L2Scalar};
    use crate::features::Descriptors;

    #[test]
    fn knn_scan_orders_by_distance_and_breaks_ties_by_index() {
        let train = Descriptors::from_rows(&[[3.0f32, 0.0], [1.0, 0.0], [0.0, 1.0], [5.0, 5.0]], 2)
            .unwrap();
        let found = knn_scan::<L2Scalar>(&[0.0, 0.0], &train, 2);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].train_idx, 1);
        assert_eq!(found[1].train_idx, 2);
        assert_eq!(found[0].distance, 1.0);
    }

    #[test]
    fn knn_scan_returns_fewer_when_train_is_small() {
        let train = Descriptors::from_rows(&[[1.0f32, 1.0]], 2).unwrap();
        let found = knn_scan::<L2Scalar>(&[0.0, 0.0], &train, 2);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn knn_scan_accepts_huge_k() {
        let train = Descriptors::from_rows(&[[1.0f32, 1.0], [2.0, 2.0]], 2).unwrap();
        let found = knn_scan::<L2Scalar>(&[0.0, 0.0], &train, usize::MAX);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].train_idx, 0);
    }
}
