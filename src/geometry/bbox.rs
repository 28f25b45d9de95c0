//! Axis-aligned bounding boxes in scene pixel coordinates.
//!
//! A box is stored as its top-left and bottom-right corners. Width and height
//! are corner differences (`max - min`), so a box around a single point has
//! zero area. Label files and IoU use the same convention.

use crate::geometry::Point2i;
use crate::util::math::round_px;
use crate::util::{ObjLocError, ObjLocResult};

/// Bounding box with `min.x <= max.x` and `min.y <= max.y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    min: Point2i,
    max: Point2i,
}

impl BoundingBox {
    /// Creates a box from its corners, rejecting inverted corners.
    pub fn new(min: Point2i, max: Point2i) -> ObjLocResult<Self> {
        if min.x > max.x || min.y > max.y {
            return Err(ObjLocError::InvalidInput(
                "bounding box corners are inverted",
            ));
        }
        Ok(Self { min, max })
    }

    /// Tight box around `points`, or `None` when the set is empty.
    pub fn from_points(points: &[Point2i]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self { min, max })
    }

    /// Top-left corner.
    pub fn min(&self) -> Point2i {
        self.min
    }

    /// Bottom-right corner.
    pub fn max(&self) -> Point2i {
        self.max
    }

    pub fn width(&self) -> i64 {
        i64::from(self.max.x) - i64::from(self.min.x)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.max.y) - i64::from(self.min.y)
    }

    /// Area in square pixels; zero for degenerate boxes.
    ///
    /// Widened to `i128` so any pair of `i32` corners fits.
    pub fn area(&self) -> i128 {
        i128::from(self.width()) * i128::from(self.height())
    }

    /// Returns true if `p` lies inside or on the border.
    pub fn contains(&self, p: Point2i) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Grows every side outward by `ratio` times the box dimension.
    ///
    /// The horizontal margin is `round(ratio * width)` and the vertical one
    /// `round(ratio * height)`, applied to both sides so the box stays
    /// centered. Negative or non-finite ratios leave the box unchanged.
    pub fn expand(&self, ratio: f64) -> Self {
        if !ratio.is_finite() || ratio <= 0.0 {
            return *self;
        }
        let dx = round_px(ratio * self.width() as f64);
        let dy = round_px(ratio * self.height() as f64);
        Self {
            min: Point2i::new(self.min.x.saturating_sub(dx), self.min.y.saturating_sub(dy)),
            max: Point2i::new(self.max.x.saturating_add(dx), self.max.y.saturating_add(dy)),
        }
    }

    /// Clips the box to an image of `width` x `height` pixels.
    ///
    /// Zero-sized images leave the box unchanged.
    pub fn clamp_to(&self, width: usize, height: usize) -> Self {
        if width == 0 || height == 0 {
            return *self;
        }
        let max_x = i32::try_from(width - 1).unwrap_or(i32::MAX);
        let max_y = i32::try_from(height - 1).unwrap_or(i32::MAX);
        let clamp = |p: Point2i| Point2i::new(p.x.clamp(0, max_x), p.y.clamp(0, max_y));
        Self {
            min: clamp(self.min),
            max: clamp(self.max),
        }
    }

    /// Overlapping region, or `None` when the boxes are disjoint.
    ///
    /// Boxes that only touch along an edge intersect in a zero-area box.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = Point2i::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = Point2i::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y));
        if min.x > max.x || min.y > max.y {
            return None;
        }
        Some(Self { min, max })
    }

    /// Intersection over union in `[0, 1]`.
    ///
    /// Returns 0 when the union has zero area.
    pub fn iou(&self, other: &Self) -> f64 {
        let inter = self.intersection(other).map_or(0, |b| b.area());
        let union = self.area() + other.area() - inter;
        if union <= 0 {
            return 0.0;
        }
        inter as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::BoundingBox;
    use crate::geometry::Point2i;

    fn bx(x0: i32, y0: i32, x1: i32, y1: i32) -> BoundingBox {
        BoundingBox::new(Point2i::new(x0, y0), Point2i::new(x1, y1)).unwrap()
    }

    #[test]
    fn rejects_inverted_corners() {
        assert!(BoundingBox::new(Point2i::new(5, 0), Point2i::new(4, 10)).is_err());
        assert!(BoundingBox::new(Point2i::new(0, 5), Point2i::new(4, 4)).is_err());
    }

    #[test]
    fn single_point_box_is_degenerate() {
        let b = BoundingBox::from_points(&[Point2i::new(3, 4)]).unwrap();
        assert_eq!(b.min(), b.max());
        assert_eq!(b.area(), 0);
    }

    #[test]
    fn expand_keeps_box_centered() {
        let b = bx(100, 100, 200, 150).expand(0.1);
        assert_eq!(b, bx(90, 95, 210, 155));
    }

    #[test]
    fn clamp_clips_to_image() {
        let b = bx(-20, 5, 700, 900).clamp_to(640, 480);
        assert_eq!(b, bx(0, 5, 639, 479));
    }

    #[test]
    fn touching_boxes_have_zero_iou() {
        let a = bx(0, 0, 10, 10);
        let b = bx(10, 0, 20, 10);
        assert_eq!(a.intersection(&b).map(|i| i.area()), Some(0));
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn half_overlap_iou() {
        let a = bx(0, 0, 10, 10);
        let b = bx(5, 0, 15, 10);
        assert!((a.iou(&b) - 50.0 / 150.0).abs() < 1e-12);
    }

    #[test]
    fn extreme_corners_do_not_overflow() {
        let huge = bx(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        let side = i128::from(u32::MAX);
        assert_eq!(huge.area(), side * side);
        assert_eq!(huge.iou(&huge), 1.0);

        let small = bx(0, 0, 10, 10);
        let iou = huge.iou(&small);
        assert!(iou > 0.0 && iou < 1e-15);
        assert_eq!(small.iou(&huge), iou);
    }
}
