//! Distance-to-center filter.

use crate::geometry::{Point2f, Point2i};

/// Inclusive disc test shared with the neighbor filter.
///
/// Compares squared distances so integer offsets on the boundary are exact.
#[inline]
pub(crate) fn within(p: Point2i, center: Point2f, radius: f64) -> bool {
    let dx = f64::from(p.x) - center.x;
    let dy = f64::from(p.y) - center.y;
    dx * dx + dy * dy <= radius * radius
}

/// Points whose Euclidean distance to `center` is at most `radius`.
///
/// Input order is preserved. A negative or NaN radius keeps nothing.
pub fn radius_filter(points: &[Point2i], center: Point2f, radius: f64) -> Vec<Point2i> {
    if radius.is_nan() || radius < 0.0 {
        return Vec::new();
    }
    points
        .iter()
        .copied()
        .filter(|&p| within(p, center, radius))
        .collect()
}
