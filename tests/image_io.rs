#![cfg(feature = "image-io")]

use mser::image::io::{owned_from_dynamic_image, view_from_gray_image};
use mser::{detect_regions_linear_time, LinearTimeConfig};

#[test]
fn gray_image_round_trips_through_view() {
    let mut img = image::GrayImage::from_pixel(64, 48, image::Luma([220u8]));
    for y in 10..30 {
        for x in 20..40 {
            img.put_pixel(x, y, image::Luma([15u8]));
        }
    }
    let view = view_from_gray_image(&img).unwrap();
    assert_eq!((view.width(), view.height()), (64, 48));

    let config = LinearTimeConfig {
        min_area: 100,
        max_area: 1_000,
        delta: 5,
        ..LinearTimeConfig::default()
    };
    let regions = detect_regions_linear_time(view, &config).unwrap();
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].seed(), (20, 10));
    assert_eq!(regions[0].area, 400);
}

#[test]
fn color_image_is_converted_to_luma() {
    let rgb = image::RgbImage::from_pixel(4, 3, image::Rgb([255u8, 255, 255]));
    let owned = owned_from_dynamic_image(&image::DynamicImage::ImageRgb8(rgb)).unwrap();
    assert_eq!((owned.width(), owned.height()), (4, 3));
    assert!(owned.data().iter().all(|&v| v == 255));
}
