//! Grayscale image views and owned buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. Views with zero width
//! or height are valid and describe an empty image; detectors return no
//! regions for them.

use crate::util::{MserError, MserResult};
use std::borrow::Cow;

#[cfg(feature = "image-io")]
pub mod io;
mod owned;
pub mod resize;

pub use owned::OwnedImage;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> MserResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> MserResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(MserError::BufferTooSmall {
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

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns `width * height`.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Returns true when the view has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns a zero-copy view of the `width x height` window at `(x, y)`.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> MserResult<ImageView<'a, T>> {
        let out_of_bounds = MserError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or(out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or(out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }
        if width == 0 || height == 0 {
            return Ok(ImageView {
                data: &[],
                width,
                height,
                stride: self.stride,
            });
        }
        let start = y * self.stride + x;
        Ok(ImageView {
            data: &self.data[start..],
            width,
            height,
            stride: self.stride,
        })
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }
}

impl ImageView<'_, u8> {
    /// Counts pixels per gray level.
    pub fn histogram(&self) -> [u32; 256] {
        let mut hist = [0u32; 256];
        for y in 0..self.height {
            if let Some(row) = self.row(y) {
                for &value in row {
                    hist[value as usize] += 1;
                }
            }
        }
        hist
    }
}

/// Row-major samples of `view` without padding, borrowed when the view is
/// already contiguous.
pub(crate) fn contiguous_samples<'a>(view: ImageView<'a, u8>) -> MserResult<Cow<'a, [u8]>> {
    let len = view.pixel_count();
    if view.stride() == view.width() || view.height() <= 1 {
        return Ok(Cow::Borrowed(&view.as_slice()[..len]));
    }
    Ok(Cow::Owned(OwnedImage::from_view(view)?.into_data()))
}

fn required_len(width: usize, height: usize, stride: usize) -> MserResult<usize> {
    if stride < width {
        return Err(MserError::InvalidStride { width, stride });
    }
    if width == 0 || height == 0 {
        return Ok(0);
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(MserError::InvalidDimensions { width, height })?;
    Ok(needed)
}
