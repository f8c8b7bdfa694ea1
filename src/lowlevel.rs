//! Low-level building blocks for custom region pipelines.
//!
//! These types expose the union-find forest, the boundary bucket queue and
//! the component tree used by the detectors. Most users should prefer the
//! top-level detector functions and `RegionDetector` implementations.

pub use crate::classic::{ComponentTree, TreeNode};
pub use crate::disjoint_set::DisjointSet;
pub use crate::image::resize::downsample_box;
pub use crate::linear::BoundaryQueue;
