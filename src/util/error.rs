//! Error types for objloc.

use thiserror::Error;

/// Result alias for objloc operations.
pub type ObjLocResult<T> = std::result::Result<T, ObjLocError>;

/// Errors that can occur while loading inputs or running the pipeline.
///
/// Empty filter results are not errors; they surface as
/// [`Outcome::NotDetected`](crate::detect::Outcome::NotDetected).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ObjLocError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A tuning parameter is outside its valid range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is too small for the requested view.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Descriptor rows do not share the expected dimension.
    #[error("descriptor dimension mismatch: expected {expected}, got {got}")]
    DescriptorDimension { expected: usize, got: usize },
    /// A reference-view directory contains no images.
    #[error("no reference views for {class}")]
    EmptyReferenceSet { class: &'static str },
    /// Image decoding failed.
    #[error("image I/O error: {reason}")]
    ImageIo { reason: String },
    /// A file could not be read or written.
    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },
    /// A label line for a recognized class is malformed.
    #[error("label parse error on line {line}: {reason}")]
    LabelParse { line: usize, reason: &'static str },
}

impl ObjLocError {
    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}
