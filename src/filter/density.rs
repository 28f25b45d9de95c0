//! Neighbor-density filter.
//!
//! A point's neighbor count is the number of points of the input set within
//! the radius, using the same inclusive disc as [`radius_filter`]. The point
//! itself is at distance 0 and is always counted. Counts are taken against
//! the unfiltered input, so the result does not depend on iteration order.
//!
//! [`radius_filter`]: crate::filter::radius_filter

use crate::filter::radius::within;
use crate::geometry::{Point2f, Point2i};
use crate::trace::trace_event;

/// Number of input points within `radius` of each point, self included.
pub fn neighbor_counts(points: &[Point2i], radius: f64) -> Vec<usize> {
    if radius.is_nan() || radius < 0.0 {
        return vec![0; points.len()];
    }
    points
        .iter()
        .map(|&p| {
            let center = Point2f::from(p);
            points.iter().filter(|&&q| within(q, center, radius)).count()
        })
        .collect()
}

/// Keeps points whose neighbor count is strictly greater than
/// `min_neighbors`.
///
/// O(n²) in the number of points.
pub fn neighbor_filter(points: &[Point2i], radius: f64, min_neighbors: usize) -> Vec<Point2i> {
    let counts = neighbor_counts(points, radius);
    let kept: Vec<Point2i> = points
        .iter()
        .zip(counts)
        .filter_map(|(&p, count)| (count > min_neighbors).then_some(p))
        .collect();
    trace_event!("neighbor_filter", input = points.len(), kept = kept.len());
    kept
}
