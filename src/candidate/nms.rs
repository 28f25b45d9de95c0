//! Non-maximum suppression for corner peaks.

use crate::candidate::topk::{sort_peaks_desc, Peak};

/// Applies 2D non-maximum suppression using Chebyshev distance.
///
/// Peaks are sorted by descending score and kept if they are farther than
/// `radius` from every previously kept peak. Peaks from different pyramid
/// levels never suppress each other.
pub fn nms_2d(peaks: &mut [Peak], radius: usize) -> Vec<Peak> {
    sort_peaks_desc(peaks);
    if radius == 0 {
        return peaks.to_owned();
    }

    let mut kept: Vec<Peak> = Vec::new();
    'outer: for peak in peaks.iter().copied() {
        for other in kept.iter().filter(|k| k.level == peak.level) {
            let dx = peak.x.abs_diff(other.x);
            let dy = peak.y.abs_diff(other.y);
            if dx.max(dy) <= radius {
                continue 'outer;
            }
        }
        kept.push(peak);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::nms_2d;
    use crate::candidate::topk::Peak;

    #[test]
    fn suppresses_weaker_neighbors() {
        let mut peaks = vec![
            Peak { x: 10, y: 10, score: 0.5, level: 0 },
            Peak { x: 12, y: 11, score: 0.9, level: 0 },
            Peak { x: 30, y: 30, score: 0.4, level: 0 },
            Peak { x: 11, y: 10, score: 0.3, level: 1 },
        ];
        let kept = nms_2d(&mut peaks, 3);
        let coords: Vec<(usize, usize, usize)> = kept.iter().map(|p| (p.x, p.y, p.level)).collect();
        assert_eq!(coords, vec![(12, 11, 0), (30, 30, 0), (11, 10, 1)]);
    }
}
