use image::{DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, dilate};

use crate::models::BoundingBox;

/// Close small holes in a mask (dilate then erode) and optionally grow it.
///
/// Radii are L-infinity, so radius `r` is a `(2r+1)x(2r+1)` square.
/// A radius of 0 skips that operation.
pub fn clean_mask(mask: &GrayImage, close_radius: u8, dilate_radius: u8) -> GrayImage {
    let closed = if close_radius > 0 {
        close(mask, Norm::LInf, close_radius)
    } else {
        mask.clone()
    };

    if dilate_radius > 0 {
        dilate(&closed, Norm::LInf, dilate_radius)
    } else {
        closed
    }
}

/// Full-width band covering the lower `fraction` of a frame
pub fn hand_region(width: u32, height: u32, fraction: f32) -> Option<BoundingBox> {
    let top = (height as f32 * (1.0 - fraction.clamp(0.0, 1.0))).round() as u32;
    BoundingBox::new(0, top, width, height.saturating_sub(top)).clamp_to(width, height)
}

/// Crop a mask to `region`
pub fn crop_mask(mask: &GrayImage, region: &BoundingBox) -> GrayImage {
    image::imageops::crop_imm(mask, region.x, region.y, region.width, region.height).to_image()
}

/// Convert to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Binarize with a histogram-derived (Otsu) split point.
/// Returns the binary image and the level that was picked.
pub fn binarize_otsu(gray: &GrayImage) -> (GrayImage, u8) {
    let level = otsu_level(gray);
    (threshold(gray, level, ThresholdType::Binary), level)
}

/// Invert a grayscale image (light text on dark becomes dark on light)
pub fn invert(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    image::imageops::invert(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn closing_bridges_a_narrow_gap() {
        let mut mask = GrayImage::new(40, 20);
        for y in 5..15 {
            for x in (5..15).chain(18..30) {
                mask.put_pixel(x, y, Luma([255]));
            }
        }

        let cleaned = clean_mask(&mask, 2, 0);
        for x in 15..18 {
            assert_eq!(cleaned.get_pixel(x, 10)[0], 255, "column {x} not bridged");
        }
        assert_eq!(cleaned.get_pixel(35, 10)[0], 0);
    }

    #[test]
    fn hand_region_is_the_bottom_band() {
        let region = hand_region(600, 500, 0.30).unwrap();
        assert_eq!(region, BoundingBox::new(0, 350, 600, 150));
        assert!(hand_region(600, 500, 0.0).is_none());
    }

    #[test]
    fn otsu_separates_two_levels() {
        let mut gray = GrayImage::from_pixel(10, 10, Luma([30]));
        for x in 0..5 {
            for y in 0..10 {
                gray.put_pixel(x, y, Luma([220]));
            }
        }
        let (binary, level) = binarize_otsu(&gray);
        assert!((30..220).contains(&level));
        assert_eq!(binary.get_pixel(0, 0)[0], 255);
        assert_eq!(binary.get_pixel(9, 9)[0], 0);
    }
}
