//! Detector output records and pixel neighborhoods.

/// Pixel adjacency used when growing regions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Connectivity {
    /// Edge-adjacent neighbors only.
    #[default]
    Four,
    /// Edge- and corner-adjacent neighbors.
    Eight,
}

const OFFSETS_4: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const OFFSETS_8: [(isize, isize); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

impl Connectivity {
    /// Neighbor offsets `(dx, dy)` in clockwise order starting north.
    pub fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &OFFSETS_4,
            Connectivity::Eight => &OFFSETS_8,
        }
    }

    /// Visits the in-bounds neighbors of `(x, y)`.
    #[inline]
    pub(crate) fn for_each_neighbor(
        self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize),
    ) {
        for &(dx, dy) in self.offsets() {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
                continue;
            }
            f(nx as usize, ny as usize);
        }
    }
}

/// Which side of the threshold a region lies on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Polarity {
    /// Region pixels satisfy `value <= threshold` (MSER-).
    #[default]
    Dark,
    /// Region pixels satisfy `value >= threshold` (MSER+).
    Bright,
}

impl Polarity {
    /// Returns true when `value` belongs to a region thresholded at `threshold`.
    #[inline]
    pub fn accepts(self, value: u8, threshold: u8) -> bool {
        match self {
            Polarity::Dark => value <= threshold,
            Polarity::Bright => value >= threshold,
        }
    }
}

/// A maximally stable extremal region.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MserRegion {
    /// Column of the darkest (for bright regions: brightest) region pixel.
    pub seed_x: usize,
    /// Row of the seed pixel.
    pub seed_y: usize,
    /// Gray level bounding the region.
    pub threshold: u8,
    /// Pixel count at `threshold`.
    pub area: usize,
    /// Relative area growth `q` at `threshold`; lower is more stable.
    pub merit: f32,
    /// Side of the threshold the region occupies.
    pub polarity: Polarity,
}

impl MserRegion {
    /// Seed as `(x, y)`.
    pub fn seed(&self) -> (usize, usize) {
        (self.seed_x, self.seed_y)
    }
}

#[cfg(test)]
mod tests {
    use super::{Connectivity, Polarity};

    #[test]
    fn corner_pixel_has_clipped_neighborhood() {
        let mut seen = Vec::new();
        Connectivity::Four.for_each_neighbor(0, 0, 3, 3, |x, y| seen.push((x, y)));
        assert_eq!(seen, vec![(1, 0), (0, 1)]);

        let mut count = 0;
        Connectivity::Eight.for_each_neighbor(0, 0, 3, 3, |_, _| count += 1);
        assert_eq!(count, 3);
    }

    #[test]
    fn polarity_predicates_include_threshold() {
        assert!(Polarity::Dark.accepts(10, 10));
        assert!(!Polarity::Dark.accepts(11, 10));
        assert!(Polarity::Bright.accepts(10, 10));
        assert!(!Polarity::Bright.accepts(9, 10));
    }
}
