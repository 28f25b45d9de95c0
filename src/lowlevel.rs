//! Low-level building blocks for custom localization pipelines.
//!
//! These expose the individual filter stages, distance kernels and the
//! candidate helpers used by the corner extractor. Most users should prefer
//! [`locate`](crate::detect::locate) or [`SceneDetector`](crate::SceneDetector).

pub use crate::candidate::nms::nms_2d;
pub use crate::candidate::topk::{Peak, TopK};
pub use crate::filter::{
    neighbor_counts, neighbor_filter, radius_filter, ratio_filter, scene_points,
};
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::knn_scan_par;
pub use crate::kernel::scalar::L2Scalar;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::L2Simd;
pub use crate::kernel::{knn_scan, DistanceKernel, Neighbor};
