//! SIMD distance kernel using the `wide` crate.
//!
//! Processes 8 descriptor entries per step with `f32x8`; the tail is handled
//! with scalar arithmetic.

use crate::kernel::DistanceKernel;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// Horizontal sum of f32x8.
#[inline]
fn hsum(v: f32x8) -> f32 {
    v.to_array().iter().sum()
}

/// `f32x8` squared L2 kernel.
pub struct L2Simd;

impl DistanceKernel for L2Simd {
    #[inline]
    fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len().min(b.len());
        let simd_end = len / LANES * LANES;

        let mut acc = f32x8::ZERO;
        let mut i = 0;
        while i < simd_end {
            let d = load_f32x8(&a[i..]) - load_f32x8(&b[i..]);
            acc += d * d;
            i += LANES;
        }

        let mut tail = 0.0f32;
        while i < len {
            let d = a[i] - b[i];
            tail += d * d;
            i += 1;
        }
        hsum(acc) + tail
    }
}
