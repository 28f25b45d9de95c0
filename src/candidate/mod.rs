//! Corner candidate selection: Top-K collection and spatial non-maximum
//! suppression.

pub(crate) mod nms;
pub(crate) mod topk;
