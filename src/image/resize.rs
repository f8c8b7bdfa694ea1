//! Box downsampling for grayscale `u8` images.
//!
//! Each output pixel is the rounded mean of a `factor x factor` block:
//! `dst = (sum + factor² / 2) / factor²`. Trailing rows and columns that do
//! not fill a whole block are dropped. For `factor == 2` this is the
//! familiar `(a + b + c + d + 2) / 4` pyramid filter.

use crate::image::{ImageView, OwnedImage};
use crate::util::{try_filled_vec, MserError, MserResult};

/// Downsamples `src` by an integer `factor` using box averaging.
///
/// `factor == 1` returns a contiguous copy. The result may be empty when the
/// source is smaller than one block.
pub fn downsample_box(src: ImageView<'_, u8>, factor: usize) -> MserResult<OwnedImage> {
    if factor == 0 {
        return Err(MserError::InvalidParameter {
            name: "factor",
            reason: "downscaling factor must be at least 1",
        });
    }
    if factor == 1 {
        return OwnedImage::from_view(src);
    }

    let dst_width = src.width() / factor;
    let dst_height = src.height() / factor;
    let block = factor
        .checked_mul(factor)
        .ok_or(MserError::InvalidParameter {
            name: "factor",
            reason: "downscaling factor overflows",
        })?;
    let mut dst = try_filled_vec(dst_width * dst_height, 0u8, "downsampled image")?;
    let mut sums = try_filled_vec(dst_width, 0u64, "downsampling row sums")?;

    for y in 0..dst_height {
        sums.iter_mut().for_each(|s| *s = 0);
        for sy in 0..factor {
            let row = src.row(y * factor + sy).ok_or(MserError::BufferTooSmall {
                needed: (y * factor + sy) * src.stride() + src.width(),
                got: src.as_slice().len(),
            })?;
            for (x, sum) in sums.iter_mut().enumerate() {
                let start = x * factor;
                *sum += row[start..start + factor]
                    .iter()
                    .map(|&v| u64::from(v))
                    .sum::<u64>();
            }
        }
        let half = (block / 2) as u64;
        for (x, &sum) in sums.iter().enumerate() {
            dst[y * dst_width + x] = ((sum + half) / block as u64) as u8;
        }
    }

    OwnedImage::new(dst, dst_width, dst_height)
}
