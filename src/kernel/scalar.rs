//! Scalar reference kernel.

use crate::kernel::DistanceKernel;

/// Plain loop over descriptor entries.
pub struct L2Scalar;

impl DistanceKernel for L2Scalar {
    #[inline]
    fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::L2Scalar;
    use crate::kernel::DistanceKernel;

    #[test]
    fn squared_l2_matches_hand_computation() {
        assert_eq!(L2Scalar::squared_l2(&[1.0, 2.0, 3.0], &[1.0, 0.0, 7.0]), 20.0);
    }
}
