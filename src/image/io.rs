//! Image loading via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::OwnedImage;
use crate::util::{ObjLocError, ObjLocResult};
use std::path::Path;

/// Converts a decoded image of any color type to grayscale.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> ObjLocResult<OwnedImage> {
    let gray = img.to_luma8();
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Loads an image from disk as grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> ObjLocResult<OwnedImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|err| ObjLocError::ImageIo {
        reason: format!("{}: {err}", path.display()),
    })?;
    owned_from_dynamic_image(&img)
}
