//! Linear-time MSER extraction.
//!
//! The flood visits pixels in order of increasing gray level using a bucket
//! queue of boundary pixels. Whenever a darker neighbor is found the flood
//! descends into it and opens a new component; whenever the next queued
//! pixel lies above the current level the component stack is raised and
//! merged. Each component streams its area history into the stability test,
//! so regions are reported while the flood runs and memory stays
//! proportional to the image.

mod boundary;
mod component;

pub use boundary::BoundaryQueue;

use crate::detect::RegionDetector;
use crate::image::resize::downsample_box;
use crate::image::{contiguous_samples, ImageView};
use crate::region::{Connectivity, MserRegion, Polarity};
use crate::stability::{check_threshold, StabilityParams};
use crate::trace::{trace_event, trace_span};
use crate::util::{try_filled_vec, MserError, MserResult};
use component::{ComponentStack, FoundRegion};

/// Parameters of the linear-time detector.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinearTimeConfig {
    /// Smallest reported area in pixels of the input image.
    pub min_area: usize,
    /// Largest reported area in pixels of the input image.
    pub max_area: usize,
    /// Half-width of the stability window in gray levels.
    pub delta: usize,
    /// Largest accepted relative area growth `q`.
    pub max_merit: f32,
    /// Relative area difference below which minima of one lineage are
    /// clustered.
    pub diff_area_threshold: f32,
    /// Integer box-downsampling factor applied before the flood.
    pub downscaling: usize,
    /// Pixel adjacency of the flood.
    pub connectivity: Connectivity,
}

impl Default for LinearTimeConfig {
    fn default() -> Self {
        Self {
            min_area: 20,
            max_area: 100_000,
            delta: 15,
            max_merit: 0.03,
            diff_area_threshold: 0.1,
            downscaling: 1,
            connectivity: Connectivity::Four,
        }
    }
}

impl LinearTimeConfig {
    fn validate(&self) -> MserResult<()> {
        if self.delta == 0 {
            return Err(MserError::InvalidParameter {
                name: "delta",
                reason: "must be at least 1",
            });
        }
        if self.downscaling == 0 {
            return Err(MserError::InvalidParameter {
                name: "downscaling",
                reason: "must be at least 1",
            });
        }
        check_threshold("max_merit", self.max_merit)?;
        check_threshold("diff_area_threshold", self.diff_area_threshold)
    }
}

/// Linear-time detector bound to a configuration.
#[derive(Clone, Debug, Default)]
pub struct LinearTimeMser {
    config: LinearTimeConfig,
}

impl LinearTimeMser {
    pub fn new(config: LinearTimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LinearTimeConfig {
        &self.config
    }
}

impl RegionDetector for LinearTimeMser {
    fn detect(&self, image: ImageView<'_, u8>) -> MserResult<Vec<MserRegion>> {
        detect_regions_linear_time(image, &self.config)
    }

    fn connectivity(&self) -> Connectivity {
        self.config.connectivity
    }
}

/// Detects dark MSERs (`I(p) <= threshold`) with the linear-time flood.
///
/// With `downscaling = d > 1` the flood runs on a `d x d` box-downsampled
/// copy: area limits are divided by `d²`, reported areas multiplied by `d²`
/// and each seed is moved to the darkest pixel of its block in `image`.
///
/// Empty images, `delta > 255` and `min_area > max_area` yield no regions.
pub fn detect_regions_linear_time(
    image: ImageView<'_, u8>,
    config: &LinearTimeConfig,
) -> MserResult<Vec<MserRegion>> {
    config.validate()?;
    let _span = trace_span!(
        "detect_regions_linear_time",
        width = image.width(),
        height = image.height(),
        downscaling = config.downscaling
    )
    .entered();
    if image.is_empty() || config.delta > 255 || config.min_area > config.max_area {
        return Ok(Vec::new());
    }

    let factor = config.downscaling;
    let block = factor * factor;
    let params = StabilityParams {
        delta: config.delta,
        min_area: config.min_area / block,
        max_area: config.max_area / block,
        max_merit: f64::from(config.max_merit),
        diff_area_threshold: f64::from(config.diff_area_threshold),
    };

    let regions: Vec<MserRegion> = if factor == 1 {
        let samples = contiguous_samples(image)?;
        let found = flood(&samples, image.width(), image.height(), config.connectivity, params)?;
        found
            .into_iter()
            .map(|f| to_region(f, image.width(), 1))
            .collect()
    } else {
        let small = downsample_box(image, factor)?;
        if small.view().is_empty() {
            return Ok(Vec::new());
        }
        let found = flood(
            small.data(),
            small.width(),
            small.height(),
            config.connectivity,
            params,
        )?;
        found
            .into_iter()
            .map(|f| {
                let mut region = to_region(f, small.width(), block);
                let (x, y) = darkest_in_block(image, region.seed_x, region.seed_y, factor);
                region.seed_x = x;
                region.seed_y = y;
                region
            })
            .collect()
    };

    trace_event!("linear_time_regions", count = regions.len());
    Ok(regions)
}

fn to_region(found: FoundRegion, width: usize, area_scale: usize) -> MserRegion {
    MserRegion {
        seed_x: found.seed % width,
        seed_y: found.seed / width,
        threshold: found.stable.threshold,
        area: found.stable.area * area_scale,
        merit: found.stable.merit,
        polarity: Polarity::Dark,
    }
}

/// Darkest pixel of the `factor x factor` block covering downsampled pixel
/// `(bx, by)`; ties go to the first pixel in row-major order.
fn darkest_in_block(image: ImageView<'_, u8>, bx: usize, by: usize, factor: usize) -> (usize, usize) {
    let (x0, y0) = (bx * factor, by * factor);
    let mut best = (x0, y0);
    let mut best_value = u8::MAX;
    for y in y0..(y0 + factor).min(image.height()) {
        let Some(row) = image.row(y) else { break };
        for (x, &value) in row
            .iter()
            .enumerate()
            .take((x0 + factor).min(image.width()))
            .skip(x0)
        {
            if value < best_value {
                best = (x, y);
                best_value = value;
            }
        }
    }
    best
}

/// Runs the flood over contiguous row-major samples.
fn flood(
    pixels: &[u8],
    width: usize,
    height: usize,
    connectivity: Connectivity,
    params: StabilityParams,
) -> MserResult<Vec<FoundRegion>> {
    let n = width * height;
    let mut stack = ComponentStack::new(n, params)?;
    let mut queue = BoundaryQueue::new(n)?;
    let mut visited = try_filled_vec(n, false, "visited mask")?;
    let mut next_edge = try_filled_vec(n, 0u8, "edge cursors")?;

    let mut histogram = [0u32; 256];
    for &value in pixels {
        histogram[value as usize] += 1;
    }
    queue.initialize(&histogram);

    let offsets = connectivity.offsets();
    let mut current = 0usize;
    let mut level = pixels[0];
    visited[0] = true;
    stack.push_component(level, current);
    let mut max_depth = 1usize;

    loop {
        let (x, y) = (current % width, current / width);
        let mut descended = false;
        while let Some(&(dx, dy)) = offsets.get(next_edge[current] as usize) {
            next_edge[current] += 1;
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
                continue;
            }
            let neighbor = ny as usize * width + nx as usize;
            if visited[neighbor] {
                continue;
            }
            visited[neighbor] = true;
            let gray = pixels[neighbor];
            if gray >= level {
                queue.push(gray, neighbor);
            } else {
                queue.push(level, current);
                stack.push_component(gray, neighbor);
                max_depth = max_depth.max(stack.len());
                current = neighbor;
                level = gray;
                descended = true;
                break;
            }
        }
        if descended {
            continue;
        }

        stack.add_pixel(current, level);
        match queue.pop_min() {
            Some((gray, pixel)) => {
                if gray > level {
                    stack.process_stack(gray);
                    level = gray;
                }
                current = pixel;
            }
            None => {
                stack.finish_top();
                break;
            }
        }
    }

    trace_event!(
        "linear_time_flood",
        pixels = n,
        components = stack.created(),
        max_stack_depth = max_depth
    );
    Ok(stack.into_found())
}

#[cfg(test)]
mod tests {
    use super::{darkest_in_block, detect_regions_linear_time, LinearTimeConfig};
    use crate::image::ImageView;
    use crate::region::Connectivity;
    use crate::util::MserError;

    fn square_image() -> Vec<u8> {
        let mut data = vec![255u8; 60 * 60];
        for y in 20..30 {
            for x in 25..35 {
                data[y * 60 + x] = 0;
            }
        }
        data
    }

    fn config() -> LinearTimeConfig {
        LinearTimeConfig {
            min_area: 10,
            max_area: 1000,
            delta: 5,
            ..LinearTimeConfig::default()
        }
    }

    #[test]
    fn finds_dark_square() {
        let data = square_image();
        let view = ImageView::from_slice(&data, 60, 60).unwrap();
        let regions = detect_regions_linear_time(view, &config()).unwrap();
        assert_eq!(regions.len(), 1);
        let r = regions[0];
        assert_eq!(r.seed(), (25, 20));
        assert_eq!(r.area, 100);
        assert_eq!(r.threshold, 127);
    }

    #[test]
    fn eight_connectivity_joins_diagonal_pixels() {
        // Two 3x3 blocks touching at one corner.
        let mut data = vec![200u8; 12 * 12];
        for y in 2..5 {
            for x in 2..5 {
                data[y * 12 + x] = 10;
            }
        }
        for y in 5..8 {
            for x in 5..8 {
                data[y * 12 + x] = 10;
            }
        }
        let view = ImageView::from_slice(&data, 12, 12).unwrap();
        let base = LinearTimeConfig {
            min_area: 5,
            max_area: 100,
            delta: 3,
            max_merit: f32::INFINITY,
            ..LinearTimeConfig::default()
        };
        let four = detect_regions_linear_time(view, &base).unwrap();
        let eight = detect_regions_linear_time(
            view,
            &LinearTimeConfig {
                connectivity: Connectivity::Eight,
                ..base.clone()
            },
        )
        .unwrap();
        assert!(four.iter().all(|r| r.area == 9));
        assert_eq!(four.len(), 2);
        assert_eq!(eight.len(), 1);
        assert_eq!(eight[0].area, 18);
    }

    #[test]
    fn degenerate_parameters_yield_nothing() {
        let data = square_image();
        let view = ImageView::from_slice(&data, 60, 60).unwrap();
        let wide = LinearTimeConfig {
            delta: 256,
            ..config()
        };
        assert!(detect_regions_linear_time(view, &wide).unwrap().is_empty());
        let inverted = LinearTimeConfig {
            min_area: 500,
            max_area: 100,
            ..config()
        };
        assert!(detect_regions_linear_time(view, &inverted).unwrap().is_empty());
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let data = square_image();
        let view = ImageView::from_slice(&data, 60, 60).unwrap();
        let zero_delta = LinearTimeConfig {
            delta: 0,
            ..config()
        };
        assert!(matches!(
            detect_regions_linear_time(view, &zero_delta),
            Err(MserError::InvalidParameter { name: "delta", .. })
        ));
        let nan = LinearTimeConfig {
            max_merit: f32::NAN,
            ..config()
        };
        assert!(matches!(
            detect_regions_linear_time(view, &nan),
            Err(MserError::InvalidParameter {
                name: "max_merit",
                ..
            })
        ));
    }

    #[test]
    fn padded_view_matches_contiguous_copy() {
        let data = square_image();
        let mut padded = vec![7u8; 64 * 60];
        for y in 0..60 {
            padded[y * 64..y * 64 + 60].copy_from_slice(&data[y * 60..(y + 1) * 60]);
        }
        let flat = ImageView::from_slice(&data, 60, 60).unwrap();
        let strided = ImageView::new(&padded, 60, 60, 64).unwrap();
        assert_eq!(
            detect_regions_linear_time(flat, &config()).unwrap(),
            detect_regions_linear_time(strided, &config()).unwrap()
        );
    }

    #[test]
    fn block_seed_picks_first_darkest_pixel() {
        let data = [9u8, 3, 3, 9, 9, 9, 1, 1, 9];
        let view = ImageView::from_slice(&data, 3, 3).unwrap();
        assert_eq!(darkest_in_block(view, 0, 0, 2), (1, 0));
        assert_eq!(darkest_in_block(view, 0, 1, 2), (0, 2));
    }
}
