//! Adapters between the `image` crate and mser views.
//!
//! Available when the `image-io` feature is enabled. Color inputs are
//! converted to 8-bit luma; the detectors never see other formats.

use crate::image::{ImageView, OwnedImage};
use crate::util::{MserError, MserResult};
use std::path::Path;

/// Borrows a grayscale image buffer as a view.
pub fn view_from_gray_image(img: &image::GrayImage) -> MserResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Converts any decoded image to an owned 8-bit grayscale buffer.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> MserResult<OwnedImage> {
    let gray = img.to_luma8();
    let (width, height) = (gray.width() as usize, gray.height() as usize);
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Loads an image from disk as grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> MserResult<OwnedImage> {
    let img = image::open(path).map_err(|err| MserError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}
