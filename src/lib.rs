//! objloc finds known rigid objects in a scene photograph from keypoint
//! matches against banks of reference views.
//!
//! Raw k-NN correspondences are refined to a spatially coherent cluster
//! (ratio test, distance to centroid, neighbor density), boxed, gated by
//! density and size, and evaluated against ground truth with IoU.
//! Feature extraction and descriptor matching sit behind the
//! [`FeatureExtractor`] and [`KnnMatcher`] traits; a Harris-corner extractor
//! and a brute-force L2 matcher are built in, with optional parallelism via
//! the `rayon` feature and SIMD distances via `simd`.

mod candidate;
pub mod class;
pub mod detect;
pub mod eval;
pub mod features;
pub mod filter;
pub mod geometry;
pub mod image;
pub mod kernel;
pub mod label;
pub mod lowlevel;
pub mod matching;
mod trace;
pub mod util;

pub use class::ObjectClass;
pub use detect::{
    locate, ClassParams, Detection, Outcome, ParamTable, PipelineConfig, ReferenceSet,
    SceneDetector, Score, Stage,
};
pub use eval::{Evaluation, IouResult, Parsed, Report, Scored, TRUE_POSITIVE_IOU};
pub use features::{CornerConfig, CornerExtractor, Descriptors, FeatureExtractor, FeatureSet, Keypoint};
pub use geometry::{centroid, BoundingBox, Point2f, Point2i};
pub use image::pyramid::ImagePyramid;
pub use image::{ImageView, OwnedImage};
pub use label::{Label, LabelSet};
pub use matching::{BruteForceMatcher, Correspondence, KnnMatch, KnnMatcher};
pub use util::{ObjLocError, ObjLocResult};
