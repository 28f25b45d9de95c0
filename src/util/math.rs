//! Numeric helpers shared by the geometry and filter stages.

/// Euclidean distance between `(ax, ay)` and `(bx, by)`.
pub(crate) fn euclidean(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    (ax - bx).hypot(ay - by)
}

/// Rounds to the nearest integer pixel, saturating at the `i32` range.
///
/// Non-finite input maps to 0.
pub(crate) fn round_px(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let rounded = value.round();
    if rounded >= i32::MAX as f64 {
        i32::MAX
    } else if rounded <= i32::MIN as f64 {
        i32::MIN
    } else {
        rounded as i32
    }
}

/// Returns true when `value` lies in the open interval (0, 1).
pub(crate) fn in_open_unit(value: f32) -> bool {
    value > 0.0 && value < 1.0
}
