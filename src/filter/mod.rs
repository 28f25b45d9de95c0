//! Correspondence and point-set filters.
//!
//! Every stage is a pure function that returns a new collection; inputs are
//! never modified. Stage order in the detector:
//! ratio test, scene-point extraction, distance to centroid, neighbor
//! density.

pub mod density;
pub mod points;
pub mod radius;
pub mod ratio;

pub use density::{neighbor_counts, neighbor_filter};
pub use points::scene_points;
pub use radius::radius_filter;
pub use ratio::ratio_filter;
