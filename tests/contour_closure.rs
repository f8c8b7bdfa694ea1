use mser::{
    detect_both_polarities, detect_regions_linear_time, extract_contour,
    extract_contours_for_regions, extract_region_contour, Connectivity, ImageView,
    LinearTimeConfig, LinearTimeMser, Polarity, RegionDetector,
};

fn blob_image(width: usize, height: usize) -> Vec<u8> {
    let mut data = vec![200u8; width * height];
    // Dark cross.
    for y in 20..50 {
        for x in 30..40 {
            data[y * width + x] = 10;
        }
    }
    for y in 30..40 {
        for x in 20..50 {
            data[y * width + x] = 10;
        }
    }
    // Dark disc with a gentle gradient.
    for y in 0..height {
        for x in 0..width {
            let dx = x as i32 - 90;
            let dy = y as i32 - 40;
            let d2 = dx * dx + dy * dy;
            if d2 <= 15 * 15 {
                data[y * width + x] = (40 + d2 / 20) as u8;
            }
        }
    }
    data
}

#[test]
fn every_region_contour_is_closed_and_contains_seed() {
    let (w, h) = (120, 80);
    let data = blob_image(w, h);
    let view = ImageView::from_slice(&data, w, h).unwrap();
    let config = LinearTimeConfig {
        min_area: 30,
        max_area: 5_000,
        delta: 5,
        max_merit: 0.5,
        ..LinearTimeConfig::default()
    };
    let regions = detect_regions_linear_time(view, &config).unwrap();
    assert!(regions.len() >= 2);

    let polygons = extract_contours_for_regions(view, &regions, config.connectivity).unwrap();
    assert_eq!(polygons.len(), regions.len());
    for (region, poly) in regions.iter().zip(&polygons) {
        assert!(poly.closed);
        assert!(poly.len() >= 3);
        let (sx, sy) = region.seed();
        assert!(poly.contains_pixel(sx, sy), "{region:?}");
        assert!(poly.enclosed_area() >= region.area);
    }
}

#[test]
fn cross_contour_has_twelve_corners() {
    let (w, h) = (120, 80);
    let data = blob_image(w, h);
    let view = ImageView::from_slice(&data, w, h).unwrap();
    let poly = extract_contour(view, (35, 35), 100, Connectivity::Four).unwrap();
    assert_eq!(poly.len(), 12);
    assert_eq!(poly.points[0], (30, 20));
    assert_eq!(poly.enclosed_area(), 500);
    assert!(!poly.contains_pixel(25, 25));
    assert!(poly.contains_pixel(21, 35));
}

#[test]
fn region_contour_area_matches_hole_free_region() {
    let (w, h) = (120, 80);
    let data = blob_image(w, h);
    let view = ImageView::from_slice(&data, w, h).unwrap();
    let detector = LinearTimeMser::new(LinearTimeConfig {
        min_area: 100,
        max_area: 1_000,
        delta: 5,
        ..LinearTimeConfig::default()
    });
    let regions = detector.detect(view).unwrap();
    let cross = regions
        .iter()
        .find(|r| r.seed() == (30, 20))
        .expect("cross region");
    assert_eq!(cross.area, 500);
    let poly = extract_region_contour(view, cross, detector.connectivity()).unwrap();
    assert_eq!(poly.enclosed_area(), cross.area);
}

#[test]
fn bright_region_contour_uses_original_gray_levels() {
    let (w, h) = (60, 40);
    let mut data = vec![90u8; w * h];
    for y in 10..22 {
        for x in 15..30 {
            data[y * w + x] = 240;
        }
    }
    let view = ImageView::from_slice(&data, w, h).unwrap();
    let detector = LinearTimeMser::new(LinearTimeConfig {
        min_area: 50,
        max_area: 1_000,
        delta: 5,
        ..LinearTimeConfig::default()
    });
    let regions = detect_both_polarities(&detector, view).unwrap();
    let bright: Vec<_> = regions
        .iter()
        .filter(|r| r.polarity == Polarity::Bright)
        .collect();
    assert_eq!(bright.len(), 1);
    assert_eq!(bright[0].area, 180);
    let poly = extract_region_contour(view, bright[0], detector.connectivity()).unwrap();
    assert_eq!(poly.points, vec![(15, 10), (30, 10), (30, 22), (15, 22)]);
}
