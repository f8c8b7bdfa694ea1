//! Detector trait and two-polarity detection.

use crate::image::{ImageView, OwnedImage};
use crate::region::{Connectivity, MserRegion, Polarity};
use crate::trace::{trace_event, trace_span};
use crate::util::MserResult;

/// Common interface of the MSER detectors.
///
/// Detectors report dark regions (`I(p) <= threshold`); bright regions come
/// from running the same detector on the negated image, see
/// [`detect_both_polarities`].
pub trait RegionDetector: Send + Sync {
    /// Detects dark regions in `image`.
    fn detect(&self, image: ImageView<'_, u8>) -> MserResult<Vec<MserRegion>>;

    /// Pixel adjacency the detector grows regions with. Contours of its
    /// regions must be traced with the same adjacency.
    fn connectivity(&self) -> Connectivity;
}

/// Runs `detector` on `image` and on its negation.
///
/// Dark regions come first. Bright regions carry `Polarity::Bright` and a
/// threshold mapped back to the original gray scale (`255 - t`), so they
/// describe `{p : I(p) >= threshold}`. With the `rayon` feature both passes
/// run concurrently.
pub fn detect_both_polarities<D: RegionDetector + ?Sized>(
    detector: &D,
    image: ImageView<'_, u8>,
) -> MserResult<Vec<MserRegion>> {
    let _span = trace_span!(
        "detect_both_polarities",
        width = image.width(),
        height = image.height()
    )
    .entered();
    let negated = OwnedImage::negated(image)?;

    #[cfg(feature = "rayon")]
    let (dark, bright) = rayon::join(
        || detector.detect(image),
        || detector.detect(negated.view()),
    );
    #[cfg(not(feature = "rayon"))]
    let (dark, bright) = (detector.detect(image), detector.detect(negated.view()));

    let mut regions = dark?;
    let dark_count = regions.len();
    regions.extend(bright?.into_iter().map(|region| MserRegion {
        threshold: 255 - region.threshold,
        polarity: Polarity::Bright,
        ..region
    }));

    trace_event!(
        "both_polarities",
        dark = dark_count,
        bright = regions.len() - dark_count
    );
    Ok(regions)
}
