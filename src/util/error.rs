//! Error types for mser.

use thiserror::Error;

/// Result alias for mser operations.
pub type MserResult<T> = std::result::Result<T, MserError>;

/// Errors that can occur when building views or running detectors.
///
/// Contract violations inside the detectors (out-of-range union-find
/// queries, overfull boundary buckets, misordered component pushes) are
/// bugs, not data errors, and panic instead of surfacing here.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MserError {
    /// Image dimensions overflow the addressable range.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Region of interest does not fit inside the image.
    #[error("roi out of bounds: x={x} y={y} width={width} height={height} in {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A detector or contour parameter is out of its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
    /// A per-image working buffer could not be allocated.
    #[error("failed to allocate {what} for {elements} elements")]
    AllocationFailed { what: &'static str, elements: usize },
    /// Image decoding failed (only with the `image-io` feature).
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}

/// Allocates a vector of `len` copies of `value`, reporting allocation
/// failure instead of aborting.
pub(crate) fn try_filled_vec<T: Clone>(
    len: usize,
    value: T,
    what: &'static str,
) -> MserResult<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| MserError::AllocationFailed {
            what,
            elements: len,
        })?;
    out.resize(len, value);
    Ok(out)
}
