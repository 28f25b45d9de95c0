//! Pixel-space geometry: integer scene points, float centroids and
//! axis-aligned bounding boxes.
//!
//! Scene points are integer pixel locations (`Point2i`); keypoint positions
//! are rounded to the nearest pixel when they enter the pipeline. Centroids
//! are kept in `f64` so repeated averaging does not drift.

mod bbox;
mod centroid;

pub use bbox::BoundingBox;
pub use centroid::centroid;

use crate::util::math::{euclidean, round_px};

/// Integer pixel location in the scene image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point2i {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point2i {
    /// Creates a point from pixel coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds a sub-pixel position to the nearest pixel.
    pub fn from_subpixel(x: f32, y: f32) -> Self {
        Self {
            x: round_px(f64::from(x)),
            y: round_px(f64::from(y)),
        }
    }

    /// Euclidean distance to `center` in pixels.
    pub fn distance_to(&self, center: Point2f) -> f64 {
        euclidean(f64::from(self.x), f64::from(self.y), center.x, center.y)
    }
}

/// Floating-point location, used for centroids.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point2f {
    pub x: f64,
    pub y: f64,
}

impl Point2f {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Nearest integer pixel.
    pub fn round(&self) -> Point2i {
        Point2i::new(round_px(self.x), round_px(self.y))
    }
}

impl From<Point2i> for Point2f {
    fn from(p: Point2i) -> Self {
        Self::new(f64::from(p.x), f64::from(p.y))
    }
}
