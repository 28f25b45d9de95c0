//! Top-K tracking for corner-response peaks.

use std::cmp::Ordering;

/// Local maximum of the corner response at one pyramid level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// Column at the peak's pyramid level.
    pub x: usize,
    /// Row at the peak's pyramid level.
    pub y: usize,
    /// Corner response.
    pub score: f32,
    /// Pyramid level the peak was found at.
    pub level: usize,
}

fn peak_cmp_desc(a: &Peak, b: &Peak) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.level.cmp(&b.level))
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
}

/// Sorts peaks by descending score with deterministic tie-breaking.
pub(crate) fn sort_peaks_desc(peaks: &mut [Peak]) {
    peaks.sort_by(peak_cmp_desc);
}

/// Bounded collector that keeps the `k` strongest peaks.
pub struct TopK {
    k: usize,
    items: Vec<Peak>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            items: Vec::with_capacity(k.min(4096)),
        }
    }

    /// Pushes a peak, evicting the weakest one when full.
    pub fn push(&mut self, peak: Peak) {
        if self.k == 0 {
            return;
        }
        if self.items.len() < self.k {
            self.items.push(peak);
            return;
        }

        let mut worst_idx = 0usize;
        for (idx, item) in self.items.iter().enumerate().skip(1) {
            if peak_cmp_desc(item, &self.items[worst_idx]) == Ordering::Greater {
                worst_idx = idx;
            }
        }
        if peak_cmp_desc(&peak, &self.items[worst_idx]) == Ordering::Less {
            self.items[worst_idx] = peak;
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the retained peaks, strongest first.
    pub fn into_sorted_desc(mut self) -> Vec<Peak> {
        sort_peaks_desc(&mut self.items);
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::{Peak, TopK};

    fn peak(x: usize, score: f32) -> Peak {
        Peak {
            x,
            y: 0,
            score,
            level: 0,
        }
    }

    #[test]
    fn keeps_strongest_peaks() {
        let mut topk = TopK::new(2);
        for (x, score) in [(0, 0.1), (1, 0.9), (2, 0.5), (3, 0.7)] {
            topk.push(peak(x, score));
        }
        let kept: Vec<usize> = topk.into_sorted_desc().iter().map(|p| p.x).collect();
        assert_eq!(kept, vec![1, 3]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut topk = TopK::new(0);
        topk.push(peak(0, 1.0));
        assert!(topk.is_empty());
    }
}
