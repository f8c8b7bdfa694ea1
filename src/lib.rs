//! MSER is a CPU-first detector of maximally stable extremal regions.
//!
//! Two detectors share one stability test: a linear-time flood
//! ([`detect_regions_linear_time`]) driven by a bucket queue and a component
//! stack, and a classic detector ([`detect_regions_classic`]) that scans the
//! nodes of a component tree. Regions can be turned into closed pixel-edge
//! polygons with [`extract_contours_for_regions`]. Optional features add
//! `rayon` parallelism, `tracing` spans, `serde` derives and `image` crate
//! adapters.

pub mod classic;
pub mod contour;
mod detect;
mod disjoint_set;
pub mod image;
pub mod linear;
pub mod lowlevel;
mod region;
mod stability;
mod trace;
pub mod util;

pub use classic::{detect_regions_classic, ClassicConfig, ClassicMser};
pub use contour::{
    extract_contour, extract_contours_for_regions, extract_region_contour, ContourTracer, Polygon,
};
#[cfg(feature = "rayon")]
pub use contour::extract_contours_for_regions_par;
pub use detect::{detect_both_polarities, RegionDetector};
pub use image::{ImageView, OwnedImage};
pub use linear::{detect_regions_linear_time, LinearTimeConfig, LinearTimeMser};
pub use region::{Connectivity, MserRegion, Polarity};
pub use util::{MserError, MserResult};
