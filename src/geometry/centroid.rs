//! Center of mass of a point set.

use crate::geometry::{Point2f, Point2i};

/// Arithmetic mean of `points`, or `None` for an empty set.
///
/// Sums are accumulated in `i64`, so the result is exact up to the final
/// division regardless of input order.
pub fn centroid(points: &[Point2i]) -> Option<Point2f> {
    if points.is_empty() {
        return None;
    }
    let (sum_x, sum_y) = points.iter().fold((0i64, 0i64), |(sx, sy), p| {
        (sx + i64::from(p.x), sy + i64::from(p.y))
    });
    let n = points.len() as f64;
    Some(Point2f::new(sum_x as f64 / n, sum_y as f64 / n))
}
