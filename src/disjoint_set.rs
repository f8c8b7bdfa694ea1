//! Union-find forest over a fixed universe with per-root set sizes.
//!
//! Union is by rank and `find` never rewrites parents, so queries take
//! `&self`. Rank-based linking alone bounds tree height by `log2(N)`, which
//! is enough for the detectors: every pixel is unified a bounded number of
//! times and sets never split.

use crate::util::{try_filled_vec, MserError, MserResult};

/// Disjoint sets over the elements `0..len`.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<u32>,
    rank: Vec<u8>,
    size: Vec<u32>,
    sets: usize,
}

impl DisjointSet {
    /// Creates `len` singleton sets.
    pub fn new(len: usize) -> MserResult<Self> {
        if len > u32::MAX as usize {
            return Err(MserError::InvalidParameter {
                name: "len",
                reason: "disjoint set supports at most u32::MAX elements",
            });
        }
        let mut parent = try_filled_vec(len, 0u32, "disjoint set parents")?;
        for (i, p) in parent.iter_mut().enumerate() {
            *p = i as u32;
        }
        Ok(Self {
            parent,
            rank: try_filled_vec(len, 0u8, "disjoint set ranks")?,
            size: try_filled_vec(len, 1u32, "disjoint set sizes")?,
            sets: len,
        })
    }

    /// Number of elements in the universe.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns true for an empty universe.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of live sets.
    pub fn set_count(&self) -> usize {
        self.sets
    }

    /// Returns true when `x` is the representative of its set.
    pub fn is_root(&self, x: usize) -> bool {
        self.parent[x] as usize == x
    }

    /// Returns the representative of the set containing `x`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= self.len()`.
    pub fn find(&self, x: usize) -> usize {
        assert!(
            x < self.parent.len(),
            "DisjointSet::find: element {x} out of range 0..{}",
            self.parent.len()
        );
        let mut cur = x;
        loop {
            let p = self.parent[cur] as usize;
            if p == cur {
                return cur;
            }
            cur = p;
        }
    }

    /// Merges the sets containing `a` and `b` and returns the new root.
    ///
    /// The root with the lower rank is attached below the other one; on a tie
    /// the root of `b` survives and its rank grows by one. Unifying elements
    /// that already share a set returns the common root and changes nothing.
    pub fn unify(&mut self, a: usize, b: usize) -> usize {
        let mut child = self.find(a);
        let mut root = self.find(b);
        if child == root {
            return root;
        }
        if self.rank[child] > self.rank[root] {
            std::mem::swap(&mut child, &mut root);
        }
        if self.rank[child] == self.rank[root] {
            self.rank[root] += 1;
        }
        self.parent[child] = root as u32;
        self.size[root] += self.size[child];
        self.sets -= 1;
        root
    }

    /// Number of elements in the set rooted at `root`.
    ///
    /// # Panics
    ///
    /// Panics if `root` is not a representative.
    pub fn set_cardinality(&self, root: usize) -> usize {
        assert!(
            self.is_root(root),
            "DisjointSet::set_cardinality: {root} is not a root"
        );
        self.size[root] as usize
    }
}
