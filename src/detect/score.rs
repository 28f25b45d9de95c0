//! Density scoring of a localized cluster.

use crate::geometry::BoundingBox;

/// Area unit for densities: points per 100x100 px.
pub const DENSITY_SCALE: f64 = 10_000.0;

/// Points per [`DENSITY_SCALE`] square pixels of `tight`; 0 for a
/// zero-area box.
pub fn density(count: usize, tight: &BoundingBox) -> f64 {
    let area = tight.area();
    if area <= 0 {
        return 0.0;
    }
    count as f64 / (area as f64 / DENSITY_SCALE)
}

/// Density and size of a cluster, compared against class thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Score {
    pub density: f64,
    pub count: usize,
}

impl Score {
    pub fn new(count: usize, tight: &BoundingBox) -> Self {
        Self {
            density: density(count, tight),
            count,
        }
    }

    /// Both gates must hold.
    pub fn passes(&self, min_density: f64, min_points: usize) -> bool {
        self.density >= min_density && self.count >= min_points
    }
}
