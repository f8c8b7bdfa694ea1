//! Region contours as closed polygons.
//!
//! A region is recovered by flood-filling from its seed over the pixels that
//! pass the threshold test, then its outer border is followed along pixel
//! edges. Polygon vertices lie on the pixel-corner lattice: point `(x, y)` is
//! the top-left corner of pixel `(x, y)`. The border is walked clockwise in
//! image coordinates (y pointing down), so region pixels are always on the
//! right-hand side, and only turning points are kept.

use crate::image::ImageView;
use crate::region::{Connectivity, MserRegion, Polarity};
use crate::trace::{trace_event, trace_span};
use crate::util::{try_filled_vec, MserResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Closed polygon on the pixel-corner lattice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    /// Turning points in walking order; the last one connects to the first.
    pub points: Vec<(usize, usize)>,
    /// False only for the empty polygon of a failed extraction.
    pub closed: bool,
}

impl Polygon {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Even-odd test of the centre of pixel `(x, y)`.
    pub fn contains_pixel(&self, x: usize, y: usize) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (self.points[i].0 as f64, self.points[i].1 as f64);
            let (xj, yj) = (self.points[j].0 as f64, self.points[j].1 as f64);
            if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Area enclosed by the polygon in pixels (shoelace formula).
    pub fn enclosed_area(&self) -> usize {
        let n = self.points.len();
        let mut twice = 0i128;
        for i in 0..n {
            let (x0, y0) = self.points[i];
            let (x1, y1) = self.points[(i + 1) % n];
            twice += x0 as i128 * y1 as i128 - x1 as i128 * y0 as i128;
        }
        (twice.unsigned_abs() / 2) as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Heading {
    East,
    South,
    West,
    North,
}

impl Heading {
    fn turn_right(self) -> Self {
        match self {
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
            Heading::North => Heading::East,
        }
    }

    fn turn_left(self) -> Self {
        match self {
            Heading::East => Heading::North,
            Heading::South => Heading::East,
            Heading::West => Heading::South,
            Heading::North => Heading::West,
        }
    }

    fn step(self, (x, y): (usize, usize)) -> (usize, usize) {
        match self {
            Heading::East => (x + 1, y),
            Heading::South => (x, y + 1),
            Heading::West => (x - 1, y),
            Heading::North => (x, y - 1),
        }
    }

    /// Pixels ahead-left and ahead-right of vertex `(x, y)`, as signed
    /// coordinates so that pixels outside the image can be named.
    fn ahead(self, x: usize, y: usize) -> ((isize, isize), (isize, isize)) {
        let (x, y) = (x as isize, y as isize);
        match self {
            Heading::East => ((x, y - 1), (x, y)),
            Heading::South => ((x, y), (x - 1, y)),
            Heading::West => ((x - 1, y), (x - 1, y - 1)),
            Heading::North => ((x - 1, y - 1), (x, y - 1)),
        }
    }
}

/// Reusable scratch state for contour extraction on images of one size.
///
/// Region membership is recorded with a generation stamp per pixel, so the
/// buffer is not cleared between regions.
#[derive(Clone, Debug)]
pub struct ContourTracer {
    stamp: Vec<u32>,
    generation: u32,
    pending: Vec<usize>,
    width: usize,
    height: usize,
}

impl ContourTracer {
    pub fn new(width: usize, height: usize) -> MserResult<Self> {
        let len = width.saturating_mul(height);
        Ok(Self {
            stamp: try_filled_vec(len, 0u32, "contour stamps")?,
            generation: 0,
            pending: Vec::new(),
            width,
            height,
        })
    }

    /// Traces the outer border of the region containing `seed`.
    ///
    /// The region is `{p : I(p) <= threshold}` for `Polarity::Dark` and
    /// `{p : I(p) >= threshold}` for `Polarity::Bright`, grown with
    /// `connectivity`. Returns an empty, non-closed polygon when the seed is
    /// outside the image or fails the threshold test.
    pub fn trace(
        &mut self,
        image: ImageView<'_, u8>,
        seed: (usize, usize),
        threshold: u8,
        polarity: Polarity,
        connectivity: Connectivity,
    ) -> MserResult<Polygon> {
        if image.width() != self.width || image.height() != self.height {
            *self = Self::new(image.width(), image.height())?;
        }
        let accepted = |x: usize, y: usize| {
            image
                .get(x, y)
                .is_some_and(|&value| polarity.accepts(value, threshold))
        };
        let (sx, sy) = seed;
        if !accepted(sx, sy) {
            return Ok(Polygon::default());
        }

        let generation = self.next_generation();
        let (width, height) = (self.width, self.height);
        let mut first = sy * width + sx;
        self.stamp[first] = generation;
        self.pending.clear();
        self.pending.push(first);
        while let Some(p) = self.pending.pop() {
            first = first.min(p);
            let stamp = &mut self.stamp;
            let pending = &mut self.pending;
            connectivity.for_each_neighbor(p % width, p / width, width, height, |nx, ny| {
                let q = ny * width + nx;
                if stamp[q] != generation && accepted(nx, ny) {
                    stamp[q] = generation;
                    pending.push(q);
                }
            });
        }

        Ok(self.walk((first % width, first / width), generation, connectivity))
    }

    fn next_generation(&mut self) -> u32 {
        if self.generation == u32::MAX {
            self.stamp.iter_mut().for_each(|s| *s = 0);
            self.generation = 0;
        }
        self.generation += 1;
        self.generation
    }

    fn inside(&self, (x, y): (isize, isize), generation: u32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.stamp[y as usize * self.width + x as usize] == generation
    }

    /// Walks the border starting at the top-left corner of the first region
    /// pixel in row-major order.
    fn walk(&self, start: (usize, usize), generation: u32, connectivity: Connectivity) -> Polygon {
        let mut points = vec![start];
        let mut vertex = start;
        let mut heading = Heading::East;
        loop {
            vertex = heading.step(vertex);
            if vertex == start {
                break;
            }
            let (left, right) = heading.ahead(vertex.0, vertex.1);
            let next = match (self.inside(left, generation), self.inside(right, generation)) {
                (true, true) => heading.turn_left(),
                (false, true) => heading,
                (true, false) if connectivity == Connectivity::Eight => heading.turn_left(),
                _ => heading.turn_right(),
            };
            if next != heading {
                points.push(vertex);
                heading = next;
            }
        }
        Polygon {
            points,
            closed: true,
        }
    }

    /// Traces the contour of a detected region, honoring its polarity.
    pub fn trace_region(
        &mut self,
        image: ImageView<'_, u8>,
        region: &MserRegion,
        connectivity: Connectivity,
    ) -> MserResult<Polygon> {
        self.trace(
            image,
            region.seed(),
            region.threshold,
            region.polarity,
            connectivity,
        )
    }
}

/// Traces the dark region `{p : I(p) <= threshold}` containing `seed`.
pub fn extract_contour(
    image: ImageView<'_, u8>,
    seed: (usize, usize),
    threshold: u8,
    connectivity: Connectivity,
) -> MserResult<Polygon> {
    ContourTracer::new(image.width(), image.height())?.trace(
        image,
        seed,
        threshold,
        Polarity::Dark,
        connectivity,
    )
}

/// Traces one region using its seed, threshold and polarity.
pub fn extract_region_contour(
    image: ImageView<'_, u8>,
    region: &MserRegion,
    connectivity: Connectivity,
) -> MserResult<Polygon> {
    ContourTracer::new(image.width(), image.height())?.trace_region(image, region, connectivity)
}

/// Traces one polygon per region, in order, sharing one scratch buffer.
pub fn extract_contours_for_regions(
    image: ImageView<'_, u8>,
    regions: &[MserRegion],
    connectivity: Connectivity,
) -> MserResult<Vec<Polygon>> {
    let _span = trace_span!("extract_contours", regions = regions.len()).entered();
    let mut tracer = ContourTracer::new(image.width(), image.height())?;
    let polygons = regions
        .iter()
        .map(|region| tracer.trace_region(image, region, connectivity))
        .collect::<MserResult<Vec<_>>>()?;
    trace_event!(
        "contours",
        count = polygons.len(),
        vertices = polygons.iter().map(Polygon::len).sum::<usize>()
    );
    Ok(polygons)
}

/// Parallel variant of [`extract_contours_for_regions`]; each worker owns a
/// scratch buffer. Output order matches `regions`.
#[cfg(feature = "rayon")]
pub fn extract_contours_for_regions_par(
    image: ImageView<'_, u8>,
    regions: &[MserRegion],
    connectivity: Connectivity,
) -> MserResult<Vec<Polygon>> {
    let _span = trace_span!("extract_contours_par", regions = regions.len()).entered();
    regions
        .par_iter()
        .map_init(
            || ContourTracer::new(image.width(), image.height()),
            |tracer, region| match tracer {
                Ok(tracer) => tracer.trace_region(image, region, connectivity),
                Err(err) => Err(err.clone()),
            },
        )
        .collect()
}
