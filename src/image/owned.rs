//! Owned contiguous grayscale buffers.

use crate::image::ImageView;
use crate::util::{try_filled_vec, MserError, MserResult};

/// Owned contiguous grayscale image buffer (`stride == width`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a row-major buffer of exactly `width * height` samples.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> MserResult<Self> {
        let needed = width
            .checked_mul(height)
            .ok_or(MserError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(MserError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(MserError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Copies a (possibly strided) view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, u8>) -> MserResult<Self> {
        Self::from_view_map(view, |v| v)
    }

    /// Copies a view while inverting every sample (`255 - v`).
    ///
    /// Running a dark-region detector on the negated image yields the bright
    /// regions of the original.
    pub fn negated(view: ImageView<'_, u8>) -> MserResult<Self> {
        Self::from_view_map(view, |v| 255 - v)
    }

    fn from_view_map(view: ImageView<'_, u8>, map: impl Fn(u8) -> u8) -> MserResult<Self> {
        let width = view.width();
        let height = view.height();
        let len = width
            .checked_mul(height)
            .ok_or(MserError::InvalidDimensions { width, height })?;
        let mut data = try_filled_vec(len, 0u8, "image copy")?;
        for y in 0..height {
            let row = view.row(y).ok_or(MserError::BufferTooSmall {
                needed: y * view.stride() + width,
                got: view.as_slice().len(),
            })?;
            let dst = &mut data[y * width..(y + 1) * width];
            for (d, &s) in dst.iter_mut().zip(row) {
                *d = map(s);
            }
        }
        Ok(Self {
            data,
            width,
            height,
        })
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

    /// Returns the row-major samples.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Consumes the image and returns its row-major samples.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
