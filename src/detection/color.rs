use image::{GrayImage, Luma, RgbImage};

use crate::config::HsvBand;

/// Convert one RGB pixel to 8-bit HSV (hue halved into 0..=180, as OpenCV does)
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f32;
    let g = rgb[1] as f32;
    let b = rgb[2] as f32;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    [
        (h / 2.0).round().min(180.0) as u8,
        s.round().min(255.0) as u8,
        max as u8,
    ]
}

/// Binary mask (0/255) of pixels whose HSV value falls inside `band`
pub fn hsv_mask(img: &RgbImage, band: &HsvBand) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut mask = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        if band.contains(rgb_to_hsv(pixel.0)) {
            mask.put_pixel(x, y, Luma([255u8]));
        }
    }

    mask
}

/// Keep only the pixels set in `mask`; everything else turns black
pub fn apply_mask(img: &RgbImage, mask: &GrayImage) -> RgbImage {
    let mut out = RgbImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        if mask.get_pixel(x, y)[0] > 0 {
            out.put_pixel(x, y, *pixel);
        }
    }
    out
}
