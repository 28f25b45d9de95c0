//! Multi-scale Harris corners with normalized intensity-patch descriptors.
//!
//! Each pyramid level is scanned for local maxima of the Harris response
//! `det(M) - k * trace(M)^2`, where `M` is the gradient structure tensor
//! summed over a square window. Peaks are capped with Top-K, thinned with
//! NMS, and described by a `grid x grid` sampling of the surrounding patch,
//! made zero-mean and unit-norm so the L2 distance between two descriptors
//! is a monotone function of their correlation.
//!
//! The descriptor is not rotation invariant. It is a baseline for running
//! the pipeline without an external detector.

use crate::candidate::nms::nms_2d;
use crate::candidate::topk::{Peak, TopK};
use crate::features::{Descriptors, FeatureExtractor, FeatureSet, Keypoint};
use crate::image::pyramid::ImagePyramid;
use crate::image::ImageView;
use crate::trace::{trace_event, trace_span};
use crate::util::{ObjLocError, ObjLocResult};

/// Tuning for [`CornerExtractor`].
#[derive(Clone, Debug)]
pub struct CornerConfig {
    /// Maximum pyramid levels to scan.
    pub max_levels: usize,
    /// Levels smaller than this on either side are not built.
    pub min_level_side: usize,
    /// Half-size of the structure-tensor window.
    pub window_radius: usize,
    /// Harris sensitivity `k`.
    pub harris_k: f32,
    /// Peaks below `quality * max_response` of their level are dropped.
    pub quality: f32,
    /// Chebyshev radius for non-maximum suppression.
    pub nms_radius: usize,
    /// Maximum keypoints kept per level.
    pub max_per_level: usize,
    /// Half-size of the described patch.
    pub patch_radius: usize,
    /// Samples per patch side; the descriptor has `patch_grid^2` entries.
    pub patch_grid: usize,
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            max_levels: 3,
            min_level_side: 32,
            window_radius: 2,
            harris_k: 0.04,
            quality: 0.01,
            nms_radius: 3,
            max_per_level: 800,
            patch_radius: 8,
            patch_grid: 8,
        }
    }
}

/// Built-in Harris/patch feature extractor.
#[derive(Clone, Debug)]
pub struct CornerExtractor {
    cfg: CornerConfig,
}

impl CornerExtractor {
    /// Validates the configuration and builds an extractor.
    pub fn new(cfg: CornerConfig) -> ObjLocResult<Self> {
        if cfg.window_radius == 0 {
            return Err(ObjLocError::InvalidParameter {
                name: "window_radius",
                reason: "must be at least 1",
            });
        }
        if !(cfg.harris_k > 0.0 && cfg.harris_k < 0.25) {
            return Err(ObjLocError::InvalidParameter {
                name: "harris_k",
                reason: "must lie in (0, 0.25)",
            });
        }
        if !(cfg.quality >= 0.0 && cfg.quality < 1.0) {
            return Err(ObjLocError::InvalidParameter {
                name: "quality",
                reason: "must lie in [0, 1)",
            });
        }
        if cfg.patch_grid < 2 || cfg.patch_radius == 0 {
            return Err(ObjLocError::InvalidParameter {
                name: "patch_grid",
                reason: "patch needs a radius and at least 2 samples per side",
            });
        }
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &CornerConfig {
        &self.cfg
    }

    /// Descriptor length produced by this extractor.
    pub fn descriptor_dim(&self) -> usize {
        self.cfg.patch_grid * self.cfg.patch_grid
    }

    fn level_peaks(&self, view: ImageView<'_, u8>, level: usize) -> Vec<Peak> {
        let width = view.width();
        let height = view.height();
        let margin = self.cfg.window_radius + 1;
        if width <= 2 * margin || height <= 2 * margin {
            return Vec::new();
        }

        let response = harris_response(view, self.cfg.window_radius, self.cfg.harris_k);
        let max_response = response.iter().copied().fold(0.0f32, f32::max);
        if max_response <= f32::EPSILON {
            return Vec::new();
        }
        let threshold = (self.cfg.quality * max_response).max(f32::EPSILON);

        let mut topk = TopK::new(self.cfg.max_per_level.saturating_mul(4));
        for y in margin..height - margin {
            for x in margin..width - margin {
                let r = response[y * width + x];
                if r < threshold || !is_local_max(&response, width, x, y) {
                    continue;
                }
                topk.push(Peak {
                    x,
                    y,
                    score: r,
                    level,
                });
            }
        }

        let mut peaks = topk.into_sorted_desc();
        let mut kept = nms_2d(&mut peaks, self.cfg.nms_radius);
        kept.truncate(self.cfg.max_per_level);
        kept
    }

    /// Zero-mean, unit-norm patch around `(x, y)`; `None` for flat patches.
    fn describe(&self, view: ImageView<'_, u8>, x: usize, y: usize) -> Option<Vec<f32>> {
        let grid = self.cfg.patch_grid;
        let radius = self.cfg.patch_radius as f32;
        let step = 2.0 * radius / (grid - 1) as f32;

        let mut values = Vec::with_capacity(grid * grid);
        for gy in 0..grid {
            let sy = y as f32 - radius + gy as f32 * step;
            for gx in 0..grid {
                let sx = x as f32 - radius + gx as f32 * step;
                values.push(view.sample_clamped(sx.round() as isize, sy.round() as isize));
            }
        }

        let mean = values.iter().sum::<f32>() / values.len() as f32;
        let mut norm_sq = 0.0f32;
        for v in values.iter_mut() {
            *v -= mean;
            norm_sq += *v * *v;
        }
        let norm = norm_sq.sqrt();
        if norm <= 1e-3 {
            return None;
        }
        let inv = 1.0 / norm;
        values.iter_mut().for_each(|v| *v *= inv);
        Some(values)
    }
}

impl FeatureExtractor for CornerExtractor {
    fn extract(&self, image: ImageView<'_, u8>) -> ObjLocResult<FeatureSet> {
        let _span = trace_span!(
            "extract_features",
            width = image.width(),
            height = image.height()
        )
        .entered();

        let pyramid =
            ImagePyramid::build_u8(image, self.cfg.max_levels, self.cfg.min_level_side)?;
        let dim = self.descriptor_dim();
        let mut keypoints = Vec::new();
        let mut data = Vec::new();

        for level in 0..pyramid.len() {
            let Some(view) = pyramid.level(level) else {
                continue;
            };
            for peak in self.level_peaks(view, level) {
                let Some(desc) = self.describe(view, peak.x, peak.y) else {
                    continue;
                };
                let (x, y) = ImagePyramid::to_base(level, peak.x as f32, peak.y as f32);
                keypoints.push(Keypoint {
                    x,
                    y,
                    response: peak.score,
                    level,
                });
                data.extend_from_slice(&desc);
            }
        }

        trace_event!("keypoints", count = keypoints.len(), levels = pyramid.len());
        FeatureSet::new(keypoints, Descriptors::new(data, dim)?)
    }
}

fn is_local_max(response: &[f32], width: usize, x: usize, y: usize) -> bool {
    let center = response[y * width + x];
    for ny in y - 1..=y + 1 {
        for nx in x - 1..=x + 1 {
            if (nx, ny) != (x, y) && response[ny * width + nx] > center {
                return false;
            }
        }
    }
    true
}

/// Harris response per pixel, computed with summed-area tables.
fn harris_response(view: ImageView<'_, u8>, radius: usize, k: f32) -> Vec<f32> {
    let width = view.width();
    let height = view.height();
    let stride = width + 1;

    // Summed-area tables of Ix^2, Iy^2, IxIy with a zero first row/column.
    let mut sxx = vec![0.0f64; stride * (height + 1)];
    let mut syy = vec![0.0f64; stride * (height + 1)];
    let mut sxy = vec![0.0f64; stride * (height + 1)];
    for y in 0..height {
        let (yi, row_above, row) = (y as isize, y * stride, (y + 1) * stride);
        let mut acc = (0.0f64, 0.0f64, 0.0f64);
        for x in 0..width {
            let xi = x as isize;
            let ix = f64::from(view.sample_clamped(xi + 1, yi) - view.sample_clamped(xi - 1, yi))
                / 510.0;
            let iy = f64::from(view.sample_clamped(xi, yi + 1) - view.sample_clamped(xi, yi - 1))
                / 510.0;
            acc.0 += ix * ix;
            acc.1 += iy * iy;
            acc.2 += ix * iy;
            sxx[row + x + 1] = sxx[row_above + x + 1] + acc.0;
            syy[row + x + 1] = syy[row_above + x + 1] + acc.1;
            sxy[row + x + 1] = sxy[row_above + x + 1] + acc.2;
        }
    }

    let box_sum = |table: &[f64], x0: usize, y0: usize, x1: usize, y1: usize| {
        table[y1 * stride + x1] - table[y0 * stride + x1] - table[y1 * stride + x0]
            + table[y0 * stride + x0]
    };

    let k = f64::from(k);
    let mut out = vec![0.0f32; width * height];
    for y in 0..height {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius + 1).min(height);
        for x in 0..width {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius + 1).min(width);
            let a = box_sum(&sxx, x0, y0, x1, y1);
            let b = box_sum(&syy, x0, y0, x1, y1);
            let c = box_sum(&sxy, x0, y0, x1, y1);
            let trace = a + b;
            out[y * width + x] = (a * b - c * c - k * trace * trace) as f32;
        }
    }
    out
}
