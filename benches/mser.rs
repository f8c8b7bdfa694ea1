use mser::{
    detect_both_polarities, detect_regions_classic, detect_regions_linear_time,
    extract_contours_for_regions, ClassicConfig, ImageView, LinearTimeConfig, LinearTimeMser,
    RegionDetector,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn make_image(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    data
}

fn bench_detectors(c: &mut Criterion) {
    let img_width = 512;
    let img_height = 512;
    let image = make_image(img_width, img_height);
    let view = ImageView::from_slice(&image, img_width, img_height).unwrap();

    let linear_cfg = LinearTimeConfig::default();
    c.bench_function("linear_time_512", |b| {
        b.iter(|| black_box(detect_regions_linear_time(view, &linear_cfg).unwrap()));
    });

    let downscaled_cfg = LinearTimeConfig {
        downscaling: 2,
        ..LinearTimeConfig::default()
    };
    c.bench_function("linear_time_512_downscaled", |b| {
        b.iter(|| black_box(detect_regions_linear_time(view, &downscaled_cfg).unwrap()));
    });

    let classic_cfg = ClassicConfig::default();
    c.bench_function("classic_512", |b| {
        b.iter(|| black_box(detect_regions_classic(view, &classic_cfg).unwrap()));
    });

    let detector = LinearTimeMser::default();
    c.bench_function("both_polarities_512", |b| {
        b.iter(|| black_box(detect_both_polarities(&detector, view).unwrap()));
    });

    let regions = detect_both_polarities(&detector, view).unwrap();
    c.bench_function("contours_512", |b| {
        b.iter(|| {
            black_box(
                extract_contours_for_regions(view, &regions, detector.connectivity()).unwrap(),
            )
        });
    });
}

criterion_group!(benches, bench_detectors);
criterion_main!(benches);
