//! Classic MSER detection over a component tree.
//!
//! The tree is built once per image; afterwards every node's
//! area-versus-threshold curve is scanned for minima of the normalized area
//! derivative. This variant keeps whole histories in memory and is mostly
//! useful as a reference for the linear-time detector.

mod tree;

pub use tree::{ComponentTree, TreeNode};

use crate::detect::RegionDetector;
use crate::image::ImageView;
use crate::region::{Connectivity, MserRegion, Polarity};
use crate::stability::{check_threshold, scan_history, StabilityParams};
use crate::trace::{trace_event, trace_span};
use crate::util::{MserError, MserResult};

/// Parameters of the classic detector.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassicConfig {
    /// Half-width of the stability window in gray levels.
    pub delta: usize,
    /// Smallest reported area in pixels.
    pub min_area: usize,
    /// Largest reported area in pixels.
    pub max_area: usize,
    /// Relative area difference below which minima of one node are
    /// clustered.
    pub diff_area_threshold: f32,
    /// Pixel adjacency used to build the tree.
    pub connectivity: Connectivity,
}

impl Default for ClassicConfig {
    fn default() -> Self {
        Self {
            delta: 10,
            min_area: 10,
            max_area: 10_000,
            diff_area_threshold: 0.01,
            connectivity: Connectivity::Eight,
        }
    }
}

/// Classic detector bound to a configuration.
#[derive(Clone, Debug, Default)]
pub struct ClassicMser {
    config: ClassicConfig,
}

impl ClassicMser {
    pub fn new(config: ClassicConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassicConfig {
        &self.config
    }
}

impl RegionDetector for ClassicMser {
    fn detect(&self, image: ImageView<'_, u8>) -> MserResult<Vec<MserRegion>> {
        detect_regions_classic(image, &self.config)
    }

    fn connectivity(&self) -> Connectivity {
        self.config.connectivity
    }
}

/// Detects dark MSERs by scanning every component-tree node.
///
/// Empty images, `delta > 255` and `min_area > max_area` yield no regions.
pub fn detect_regions_classic(
    image: ImageView<'_, u8>,
    config: &ClassicConfig,
) -> MserResult<Vec<MserRegion>> {
    if config.delta == 0 {
        return Err(MserError::InvalidParameter {
            name: "delta",
            reason: "must be at least 1",
        });
    }
    check_threshold("diff_area_threshold", config.diff_area_threshold)?;
    let _span = trace_span!(
        "detect_regions_classic",
        width = image.width(),
        height = image.height()
    )
    .entered();
    if image.is_empty() || config.delta > 255 || config.min_area > config.max_area {
        return Ok(Vec::new());
    }

    let tree = ComponentTree::build(image, config.connectivity)?;
    let params = StabilityParams {
        delta: config.delta,
        min_area: config.min_area,
        max_area: config.max_area,
        max_merit: f64::INFINITY,
        diff_area_threshold: f64::from(config.diff_area_threshold),
    };
    let width = tree.width();
    let mut regions = Vec::new();
    let mut stable = Vec::new();
    for node in tree.nodes() {
        scan_history(node.birth(), node.areas(), &params, &mut stable);
        regions.extend(stable.drain(..).map(|level| MserRegion {
            seed_x: node.seed() % width,
            seed_y: node.seed() / width,
            threshold: level.threshold,
            area: level.area,
            merit: level.merit,
            polarity: Polarity::Dark,
        }));
    }

    trace_event!(
        "classic_regions",
        nodes = tree.len(),
        count = regions.len()
    );
    Ok(regions)
}
