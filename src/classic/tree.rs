//! Component tree of dark extremal regions.
//!
//! Pixels are activated in order of increasing gray level and joined to
//! already active neighbors with a `DisjointSet`. Every connected set at a
//! level is owned by one tree node. When two owned sets meet, the node with
//! the deeper seed keeps growing and the other one ends one level earlier
//! with the survivor as its parent. Each node records its area for every
//! level it lives through.

use crate::disjoint_set::DisjointSet;
use crate::image::{contiguous_samples, ImageView};
use crate::region::Connectivity;
use crate::util::{try_filled_vec, MserResult};

const NO_NODE: u32 = u32::MAX;

/// One lineage of the component tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNode {
    birth: u8,
    seed: usize,
    seed_gray: u8,
    parent: Option<usize>,
    areas: Vec<u32>,
}

impl TreeNode {
    /// Gray level at which the node appears.
    pub fn birth(&self) -> u8 {
        self.birth
    }

    /// Last level of the node's history.
    pub fn last_level(&self) -> u8 {
        self.birth + (self.areas.len() - 1) as u8
    }

    /// Row-major index of the darkest pixel (first among ties).
    pub fn seed(&self) -> usize {
        self.seed
    }

    /// Node that absorbed this one, `None` for the root.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Areas for levels `birth..=last_level`.
    pub fn areas(&self) -> &[u32] {
        &self.areas
    }

    /// Area at `level`, if the node lives at that level.
    pub fn area_at(&self, level: u8) -> Option<u32> {
        let idx = level.checked_sub(self.birth)? as usize;
        self.areas.get(idx).copied()
    }

    fn seed_key(&self) -> (u8, usize) {
        (self.seed_gray, self.seed)
    }

    fn record(&mut self, level: u8, area: u32) {
        let idx = (level - self.birth) as usize;
        self.extend_to(idx);
        if self.areas.len() == idx {
            self.areas.push(area);
        } else {
            self.areas[idx] = area;
        }
    }

    /// Flat-lines the history up to (excluding) index `len`.
    fn extend_to(&mut self, len: usize) {
        if let Some(&last) = self.areas.last() {
            while self.areas.len() < len {
                self.areas.push(last);
            }
        }
    }

    fn close(&mut self, last_level: u8) {
        self.extend_to((last_level - self.birth) as usize + 1);
    }
}

/// Component tree of an 8-bit image for dark regions.
#[derive(Clone, Debug)]
pub struct ComponentTree {
    nodes: Vec<TreeNode>,
    width: usize,
    height: usize,
}

impl ComponentTree {
    /// Builds the tree of `image` with the given pixel adjacency.
    pub fn build(image: ImageView<'_, u8>, connectivity: Connectivity) -> MserResult<Self> {
        let (width, height) = (image.width(), image.height());
        let mut tree = Self {
            nodes: Vec::new(),
            width,
            height,
        };
        if image.is_empty() {
            return Ok(tree);
        }
        let samples = contiguous_samples(image)?;
        let n = samples.len();
        let mut sets = DisjointSet::new(n)?;
        let mut owner = try_filled_vec(n, NO_NODE, "node owners")?;

        let histogram = image.histogram();
        let mut offsets = [0usize; 257];
        for level in 0..256 {
            offsets[level + 1] = offsets[level] + histogram[level] as usize;
        }
        let mut order = try_filled_vec(n, 0u32, "pixel order")?;
        let mut fill = offsets;
        for (idx, &value) in samples.iter().enumerate() {
            order[fill[value as usize]] = idx as u32;
            fill[value as usize] += 1;
        }

        let mut last_level = 0u8;
        for level in 0..=u8::MAX {
            let band = &order[offsets[level as usize]..offsets[level as usize + 1]];
            if band.is_empty() {
                continue;
            }
            last_level = level;

            for &p in band {
                let p = p as usize;
                connectivity.for_each_neighbor(p % width, p / width, width, height, |nx, ny| {
                    let q = ny * width + nx;
                    if samples[q] > level {
                        return;
                    }
                    let (rp, rq) = (sets.find(p), sets.find(q));
                    if rp == rq {
                        return;
                    }
                    let (a, b) = (owner[rp], owner[rq]);
                    let root = sets.unify(rp, rq);
                    owner[root] = tree.join(a, b, level);
                });
            }

            for &p in band {
                let p = p as usize;
                let root = sets.find(p);
                if owner[root] == NO_NODE {
                    owner[root] = tree.nodes.len() as u32;
                    tree.nodes.push(TreeNode {
                        birth: level,
                        seed: p,
                        seed_gray: level,
                        parent: None,
                        areas: Vec::new(),
                    });
                }
            }

            for &p in band {
                let root = sets.find(p as usize);
                let area = sets.set_cardinality(root) as u32;
                tree.nodes[owner[root] as usize].record(level, area);
            }
        }

        for node in tree.nodes.iter_mut().filter(|node| node.parent.is_none()) {
            node.close(last_level);
        }
        Ok(tree)
    }

    /// Resolves the owner of a union of two sets at `level`.
    fn join(&mut self, a: u32, b: u32, level: u8) -> u32 {
        match (a, b) {
            (NO_NODE, other) | (other, NO_NODE) => other,
            (a, b) if a == b => a,
            (a, b) => {
                let (winner, loser) =
                    if self.nodes[a as usize].seed_key() < self.nodes[b as usize].seed_key() {
                        (a, b)
                    } else {
                        (b, a)
                    };
                let node = &mut self.nodes[loser as usize];
                node.close(level - 1);
                node.parent = Some(winner as usize);
                winner
            }
        }
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the node that is never absorbed.
    pub fn root(&self) -> Option<usize> {
        self.nodes.iter().position(|node| node.parent.is_none())
    }

    /// Image width the tree was built for.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height the tree was built for.
    pub fn height(&self) -> usize {
        self.height
    }
}
