use mser::{
    detect_regions_classic, detect_regions_linear_time, ClassicConfig, Connectivity, ImageView,
    LinearTimeConfig, MserRegion,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Blocky random image: coarse random cells with mild per-pixel noise.
fn make_image(width: usize, height: usize, cell: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let cells_x = width.div_ceil(cell);
    let cells_y = height.div_ceil(cell);
    let levels: Vec<u8> = (0..cells_x * cells_y)
        .map(|_| rng.random_range(0..=255u8))
        .collect();
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let base = levels[(y / cell) * cells_x + x / cell] as i32;
            let noise = rng.random_range(-3..=3i32);
            data.push((base + noise).clamp(0, 255) as u8);
        }
    }
    data
}

fn keys(regions: &[MserRegion]) -> Vec<(usize, usize, u8, usize)> {
    let mut keys: Vec<_> = regions
        .iter()
        .map(|r| (r.seed_x, r.seed_y, r.threshold, r.area))
        .collect();
    keys.sort_unstable();
    keys
}

fn run_both(
    data: &[u8],
    width: usize,
    height: usize,
    delta: usize,
    connectivity: Connectivity,
) -> (Vec<MserRegion>, Vec<MserRegion>) {
    let view = ImageView::from_slice(data, width, height).unwrap();
    let linear = LinearTimeConfig {
        min_area: 1,
        max_area: width * height,
        delta,
        max_merit: f32::INFINITY,
        diff_area_threshold: 0.2,
        downscaling: 1,
        connectivity,
    };
    let classic = ClassicConfig {
        delta,
        min_area: 1,
        max_area: width * height,
        diff_area_threshold: 0.2,
        connectivity,
    };
    (
        detect_regions_linear_time(view, &linear).unwrap(),
        detect_regions_classic(view, &classic).unwrap(),
    )
}

#[test]
fn random_blocky_images_agree() {
    for seed in 0..6u64 {
        for connectivity in [Connectivity::Four, Connectivity::Eight] {
            let (w, h) = (48, 36);
            let data = make_image(w, h, 6, seed);
            let (linear, classic) = run_both(&data, w, h, 4, connectivity);
            assert!(!classic.is_empty(), "seed {seed}: no regions");
            assert_eq!(
                keys(&linear),
                keys(&classic),
                "seed {seed} connectivity {connectivity:?}"
            );
        }
    }
}

#[test]
fn pure_noise_agrees() {
    let mut rng = StdRng::seed_from_u64(99);
    let (w, h) = (32, 32);
    let data: Vec<u8> = (0..w * h).map(|_| rng.random::<u8>()).collect();
    for delta in [1, 3, 8] {
        let (linear, classic) = run_both(&data, w, h, delta, Connectivity::Four);
        assert_eq!(keys(&linear), keys(&classic), "delta {delta}");
    }
}

#[test]
fn merits_agree_exactly() {
    let data = make_image(40, 40, 8, 1234);
    let (mut linear, mut classic) = run_both(&data, 40, 40, 5, Connectivity::Eight);
    let order = |r: &MserRegion| (r.seed_x, r.seed_y, r.threshold, r.area);
    linear.sort_by_key(order);
    classic.sort_by_key(order);
    assert_eq!(linear, classic);
}

#[test]
fn plateau_ties_between_equal_pits_agree() {
    // Equal-depth pits force seed tie-breaking by row-major index.
    let (w, h) = (30, 10);
    let mut data = vec![180u8; w * h];
    for (x0, depth) in [(2usize, 20u8), (12, 20), (22, 60)] {
        for y in 3..7 {
            for x in x0..x0 + 4 {
                data[y * w + x] = depth;
            }
        }
    }
    let (linear, classic) = run_both(&data, w, h, 3, Connectivity::Four);
    assert_eq!(keys(&linear), keys(&classic));
    assert_eq!(linear.len(), 3);
}
