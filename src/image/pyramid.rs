//! Image pyramid construction for grayscale `u8` images.
//!
//! Downsampling uses a 2x2 box filter with integer rounding:
//! `dst = ((a + b + c + d) + 2) / 4`. Level `l` has scale `2^l` relative to
//! the base, which the corner extractor uses to map detections back.

use crate::image::{ImageView, OwnedImage};
use crate::util::{ObjLocError, ObjLocResult};

/// Owned image pyramid built from a base level.
pub struct ImagePyramid {
    levels: Vec<OwnedImage>,
}

impl ImagePyramid {
    /// Builds up to `max_levels` levels (at least the base).
    ///
    /// Stops early once a level would be smaller than `min_side` pixels on
    /// either axis.
    pub fn build_u8(
        base: ImageView<'_, u8>,
        max_levels: usize,
        min_side: usize,
    ) -> ObjLocResult<Self> {
        let max_levels = max_levels.max(1);
        let mut levels = vec![OwnedImage::from_view(base)?];

        while levels.len() < max_levels {
            let src = match levels.last() {
                Some(prev) => prev.view(),
                None => break,
            };
            let dst_width = src.width() / 2;
            let dst_height = src.height() / 2;
            if dst_width < min_side.max(1) || dst_height < min_side.max(1) {
                break;
            }

            let mut dst = Vec::with_capacity(dst_width * dst_height);
            for y in 0..dst_height {
                let row0 = src.row(y * 2).ok_or(ObjLocError::InvalidDimensions {
                    width: src.width(),
                    height: src.height(),
                })?;
                let row1 = src.row(y * 2 + 1).ok_or(ObjLocError::InvalidDimensions {
                    width: src.width(),
                    height: src.height(),
                })?;
                for x in 0..dst_width {
                    let sum = u16::from(row0[2 * x])
                        + u16::from(row0[2 * x + 1])
                        + u16::from(row1[2 * x])
                        + u16::from(row1[2 * x + 1]);
                    dst.push(((sum + 2) / 4) as u8);
                }
            }

            levels.push(OwnedImage::new(dst, dst_width, dst_height)?);
        }

        Ok(Self { levels })
    }

    /// Number of levels, including the base.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// View of level `index` (0 is the base resolution).
    pub fn level(&self, index: usize) -> Option<ImageView<'_, u8>> {
        self.levels.get(index).map(|level| level.view())
    }

    /// Maps a coordinate at `level` back to base-level pixels.
    ///
    /// Pixel centers are aligned, so `x_base = (x + 0.5) * 2^level - 0.5`.
    pub fn to_base(level: usize, x: f32, y: f32) -> (f32, f32) {
        let scale = (1u32 << level.min(31)) as f32;
        ((x + 0.5) * scale - 0.5, (y + 0.5) * scale - 0.5)
    }
}
