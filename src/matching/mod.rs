//! Descriptor correspondences and the k-NN matcher seam.
//!
//! A [`KnnMatch`] holds the ranked candidates for one reference descriptor
//! against the scene. The ratio filter consumes the first two candidates.

mod brute;

pub use brute::BruteForceMatcher;

use crate::features::Descriptors;
use crate::util::ObjLocResult;

/// One candidate pairing of a reference descriptor with a scene descriptor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Correspondence {
    /// Row in the reference view's descriptors.
    pub reference_idx: usize,
    /// Row in the scene descriptors (and index into the scene keypoints).
    pub scene_idx: usize,
    /// L2 descriptor distance.
    pub distance: f32,
}

/// Ranked candidates for one reference descriptor, best first.
#[derive(Clone, Debug, PartialEq)]
pub struct KnnMatch {
    /// Reference view the query descriptor came from.
    pub view: usize,
    pub candidates: Vec<Correspondence>,
}

impl KnnMatch {
    pub fn new(view: usize, candidates: Vec<Correspondence>) -> Self {
        Self { view, candidates }
    }

    /// Best candidate, if any.
    pub fn best(&self) -> Option<&Correspondence> {
        self.candidates.first()
    }

    /// Best and runner-up; `None` with fewer than two candidates.
    pub fn best_pair(&self) -> Option<(&Correspondence, &Correspondence)> {
        match self.candidates.as_slice() {
            [best, second, ..] => Some((best, second)),
            _ => None,
        }
    }
}

/// Produces the `k` nearest train descriptors for every query descriptor.
///
/// The output has one entry per query row, in query order; entries may hold
/// fewer than `k` candidates when the train set is small.
pub trait KnnMatcher {
    fn knn_match(
        &self,
        query: &Descriptors,
        train: &Descriptors,
        k: usize,
    ) -> ObjLocResult<Vec<KnnMatch>>;
}
