//! Grayscale image buffers consumed by the feature extractor.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride
//! (elements between row starts). `OwnedImage` is the contiguous owned
//! counterpart produced by decoding and by pyramid downsampling.

use crate::util::{ObjLocError, ObjLocResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod pyramid;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> ObjLocResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> ObjLocResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(ObjLocError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Returns row `y` without padding.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }
}

impl ImageView<'_, u8> {
    /// Intensity at `(x, y)` with coordinates clamped to the border.
    ///
    /// Gradient and patch sampling read past the edges through this, which
    /// replicates the outermost pixels.
    pub fn sample_clamped(&self, x: isize, y: isize) -> f32 {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.data[cy * self.stride + cx] as f32
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> ObjLocResult<usize> {
    if width == 0 || height == 0 {
        return Err(ObjLocError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(ObjLocError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(ObjLocError::InvalidDimensions { width, height })
}

/// Owned contiguous grayscale image.
#[derive(Clone, Debug)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a row-major buffer of exactly `width * height` pixels.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> ObjLocResult<Self> {
        if width == 0 || height == 0 {
            return Err(ObjLocError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(ObjLocError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(ObjLocError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(ObjLocError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Copies a (possibly strided) view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, u8>) -> ObjLocResult<Self> {
        let mut data = Vec::with_capacity(view.width() * view.height());
        for y in 0..view.height() {
            let row = view.row(y).ok_or(ObjLocError::BufferTooSmall {
                needed: (y + 1) * view.stride(),
                got: view.data.len(),
            })?;
            data.extend_from_slice(row);
        }
        Self::new(data, view.width(), view.height())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageView, OwnedImage};
    use crate::util::ObjLocError;

    #[test]
    fn view_rejects_bad_geometry() {
        let data = [0u8; 8];
        assert_eq!(
            ImageView::from_slice(&data, 0, 2).err(),
            Some(ObjLocError::InvalidDimensions {
                width: 0,
                height: 2
            })
        );
        assert_eq!(
            ImageView::new(&data, 4, 1, 3).err(),
            Some(ObjLocError::InvalidStride {
                width: 4,
                stride: 3
            })
        );
        assert_eq!(
            ImageView::new(&data, 3, 3, 3).err(),
            Some(ObjLocError::BufferTooSmall { needed: 9, got: 8 })
        );
    }

    #[test]
    fn clamped_sampling_replicates_border() {
        let data: Vec<u8> = (0u8..9).collect();
        let view = ImageView::from_slice(&data, 3, 3).unwrap();
        assert_eq!(view.sample_clamped(-5, 0), 0.0);
        assert_eq!(view.sample_clamped(10, 1), 5.0);
        assert_eq!(view.sample_clamped(1, 99), 7.0);
    }

    #[test]
    fn owned_from_strided_view_drops_padding() {
        let data: Vec<u8> = (0u8..8).collect();
        let view = ImageView::new(&data, 3, 2, 4).unwrap();
        let owned = OwnedImage::from_view(view).unwrap();
        assert_eq!(owned.data(), &[0, 1, 2, 4, 5, 6]);
    }
}
