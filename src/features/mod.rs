//! Keypoints, descriptors and the feature-extractor seam.
//!
//! The pipeline only needs a keypoint's position and a fixed-length
//! descriptor per keypoint. Any detector can be plugged in through
//! [`FeatureExtractor`]; [`CornerExtractor`] is the built-in baseline.

mod corners;

pub use corners::{CornerConfig, CornerExtractor};

use crate::image::ImageView;
use crate::util::{ObjLocError, ObjLocResult};

/// A detected point of interest in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keypoint {
    /// Column, sub-pixel, in base-level pixels.
    pub x: f32,
    /// Row, sub-pixel, in base-level pixels.
    pub y: f32,
    /// Detector response; larger is stronger.
    pub response: f32,
    /// Pyramid level the keypoint was detected at.
    pub level: usize,
}

impl Keypoint {
    /// Keypoint at `(x, y)` with unit response on the base level.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            response: 1.0,
            level: 0,
        }
    }
}

/// Row-major descriptor matrix, one row per keypoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Descriptors {
    data: Vec<f32>,
    dim: usize,
}

impl Descriptors {
    /// Wraps `data` as rows of `dim` values.
    pub fn new(data: Vec<f32>, dim: usize) -> ObjLocResult<Self> {
        if dim == 0 {
            return Err(ObjLocError::InvalidInput("descriptor dimension must be > 0"));
        }
        if data.len() % dim != 0 {
            return Err(ObjLocError::InvalidInput(
                "descriptor buffer is not a whole number of rows",
            ));
        }
        Ok(Self { data, dim })
    }

    /// Builds a matrix from individual rows, which must share one length.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R], dim: usize) -> ObjLocResult<Self> {
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(ObjLocError::DescriptorDimension {
                    expected: dim,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(data, dim)
    }

    /// Empty matrix with the given row length.
    pub fn empty(dim: usize) -> Self {
        Self {
            data: Vec::new(),
            dim: dim.max(1),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row `idx`, or `None` past the end.
    pub fn row(&self, idx: usize) -> Option<&[f32]> {
        let start = idx.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }

    /// Iterates over rows in order.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.dim)
    }
}

/// Keypoints with their descriptors; row `i` describes keypoint `i`.
#[derive(Clone, Debug)]
pub struct FeatureSet {
    keypoints: Vec<Keypoint>,
    descriptors: Descriptors,
}

impl FeatureSet {
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Descriptors) -> ObjLocResult<Self> {
        if keypoints.len() != descriptors.len() {
            return Err(ObjLocError::InvalidInput(
                "keypoint and descriptor counts differ",
            ));
        }
        Ok(Self {
            keypoints,
            descriptors,
        })
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &Descriptors {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Detects keypoints and computes one descriptor per keypoint.
pub trait FeatureExtractor {
    fn extract(&self, image: ImageView<'_, u8>) -> ObjLocResult<FeatureSet>;
}

#[cfg(test)]
mod tests {
    use super::{Descriptors, FeatureSet, Keypoint};
    use crate::util::ObjLocError;

    #[test]
    fn descriptors_validate_row_length() {
        let err = Descriptors::from_rows(&[vec![1.0f32, 2.0], vec![3.0f32]], 2).err();
        assert_eq!(
            err,
            Some(ObjLocError::DescriptorDimension {
                expected: 2,
                got: 1
            })
        );
        let d = Descriptors::from_rows(&[[1.0f32, 2.0], [3.0, 4.0]], 2).unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(d.row(1), Some(&[3.0f32, 4.0][..]));
        assert_eq!(d.row(2), None);
    }

    #[test]
    fn feature_set_requires_matching_counts() {
        let d = Descriptors::new(vec![0.0; 4], 2).unwrap();
        assert!(FeatureSet::new(vec![Keypoint::at(0.0, 0.0)], d).is_err());
    }
}
