//! Region cropping, OCR preprocessing and per-region OCR error handling.

mod common;

use cardglow::config::TEXT_BAND;
use cardglow::roi::ocr::prepare_for_ocr;
use cardglow::roi::{clamp_rect, extract_region};
use common::*;
use image::{DynamicImage, RgbImage};

fn frame() -> RgbImage {
    blank_frame()
}

#[test]
fn test_in_bounds_crop_has_exact_size() {
    let img = frame();
    for &(x1, y1, x2, y2) in &[(0, 0, 600, 500), (10, 20, 11, 21), (250, 100, 430, 333)] {
        let region = RegionConfig::new("r", x1, y1, x2, y2);
        let (crop, bbox) = extract_region(&img, &region).expect("valid region");
        assert_eq!(crop.dimensions(), ((x2 - x1) as u32, (y2 - y1) as u32));
        assert_eq!((bbox.x, bbox.y), (x1 as u32, y1 as u32));
    }
}

#[test]
fn test_out_of_bounds_corners_are_clamped() {
    let img = frame();
    let region = RegionConfig::new("edge", -30, 480, 650, 900);
    let (crop, bbox) = extract_region(&img, &region).expect("partly visible region");

    assert_eq!(bbox, BoundingBox::new(0, 480, 600, 20));
    assert_eq!(crop.dimensions(), (600, 20));
}

#[test]
fn test_degenerate_regions_are_rejected() {
    let img = frame();
    let degenerate = [
        RegionConfig::new("inverted", 50, 50, 40, 60),
        RegionConfig::new("flat", 50, 50, 80, 50),
        RegionConfig::new("off_right", 700, 10, 800, 40),
        RegionConfig::new("off_top", 10, -90, 40, -10),
    ];
    for region in &degenerate {
        assert!(extract_region(&img, region).is_none(), "{} accepted", region.name);
    }
}

#[test]
fn test_clamping_is_idempotent() {
    let once = clamp_rect(-5, 10, 700, 450, 600, 500).expect("clamped");
    let twice = clamp_rect(
        once.x as i64,
        once.y as i64,
        once.right() as i64,
        once.bottom() as i64,
        600,
        500,
    )
    .expect("still valid");
    assert_eq!(once, twice);
}

#[test]
fn test_degenerate_region_is_omitted_from_results() {
    let img = DynamicImage::ImageRgb8(frame());
    let pipeline = RoiPipeline::new(vec![
        RegionConfig::new("good", 10, 10, 60, 40),
        RegionConfig::new("bad", 100, 100, 90, 120),
    ]);

    let results = pipeline.extract(&img, &UnavailableRecognizer, &NullSink);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "good");
    assert_eq!((results[0].width, results[0].height), (50, 30));
    assert_eq!((results[0].x2, results[0].y2), (60, 40));
}

#[test]
fn test_region_without_ocr_has_neither_value_nor_error() {
    let img = DynamicImage::ImageRgb8(frame());
    let pipeline = RoiPipeline::new(vec![RegionConfig::new("plain", 10, 10, 60, 40)]);

    let results = pipeline.extract(&img, &FakeRecognizer::replying("ignored"), &NullSink);
    assert_eq!(results[0].value, None);
    assert_eq!(results[0].error, None);
}

#[test]
fn test_missing_engine_yields_error_marker() {
    let img = DynamicImage::ImageRgb8(frame());
    let pipeline = RoiPipeline::new(vec![
        RegionConfig::new("mana", 10, 10, 60, 40).with_ocr(OcrMode::Digits),
    ]);

    let results = pipeline.extract(&img, &UnavailableRecognizer, &NullSink);
    assert_eq!(results[0].value, None);
    assert!(results[0].error.as_deref().unwrap_or_default().contains("unavailable"));
}

#[test]
fn test_digits_mode_filters_recognized_text() {
    let img = DynamicImage::ImageRgb8(frame());
    let pipeline = RoiPipeline::new(vec![
        RegionConfig::new("mana", 10, 10, 60, 40).with_ocr(OcrMode::Digits),
    ]);

    let clean = pipeline.extract(&img, &FakeRecognizer::replying("3/10"), &NullSink);
    assert_eq!(clean[0].value.as_deref(), Some("3/10"));
    assert_eq!(clean[0].error, None);

    let noisy = pipeline.extract(&img, &FakeRecognizer::replying("3/1O"), &NullSink);
    assert_eq!(noisy[0].value.as_deref(), Some("3/1"));
}

#[test]
fn test_text_mode_only_trims() {
    let img = DynamicImage::ImageRgb8(frame());
    let pipeline = RoiPipeline::new(vec![
        RegionConfig::new("label", 10, 10, 60, 40).with_ocr(OcrMode::Text),
    ]);

    let results = pipeline.extract(&img, &FakeRecognizer::replying("  Mana 3/1O\n"), &NullSink);
    assert_eq!(results[0].value.as_deref(), Some("Mana 3/1O"));
}

#[test]
fn test_recognition_failure_is_isolated_to_its_region() {
    let img = DynamicImage::ImageRgb8(frame());
    let pipeline = RoiPipeline::new(vec![
        RegionConfig::new("first", 10, 10, 60, 40).with_ocr(OcrMode::Text),
        RegionConfig::new("broken", 100, 10, 133, 40).with_ocr(OcrMode::Text),
        RegionConfig::new("last", 200, 10, 260, 40).with_ocr(OcrMode::Digits),
    ]);
    let recognizer = FailForWidth {
        width: 33,
        text: "7".to_string(),
    };

    let results = pipeline.extract(&img, &recognizer, &NullSink);
    assert_eq!(results.len(), 3);

    assert_eq!(results[0].value.as_deref(), Some("7"));
    assert_eq!(results[1].name, "broken");
    assert_eq!(results[1].value, None);
    assert!(results[1].error.as_deref().unwrap_or_default().contains("crashed"));
    assert_eq!(results[2].value.as_deref(), Some("7"));
}

#[test]
fn test_preprocessing_isolates_light_text() {
    let mut crop = RgbImage::from_pixel(40, 20, BACKGROUND);
    // colourful but bright art that must not count as text
    fill_rect(&mut crop, 0, 0, 5, 20, image::Rgb([250, 200, 60]));
    fill_rect(&mut crop, 10, 5, 10, 10, TEXT_WHITE);

    let prepared = prepare_for_ocr(&crop, &TEXT_BAND);

    assert_eq!(prepared.mask.get_pixel(12, 8)[0], 255);
    assert_eq!(prepared.mask.get_pixel(2, 8)[0], 0);
    assert_eq!(prepared.foreground.get_pixel(2, 8).0, [0, 0, 0]);
    assert_eq!(prepared.binary.get_pixel(12, 8)[0], 255);
    assert_eq!(prepared.binary.get_pixel(30, 8)[0], 0);
    // recognizer input is dark text on white
    assert_eq!(prepared.inverted.get_pixel(12, 8)[0], 0);
    assert_eq!(prepared.inverted.get_pixel(30, 8)[0], 255);
}
