use super::{BoundingBox, OcrMode};
use cardglow::TextRecognizer;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

/// Dark table background, outside both HSV bands
pub const BACKGROUND: Rgb<u8> = Rgb([20, 20, 30]);
/// Saturated green inside the glow band
pub const GLOW: Rgb<u8> = Rgb([40, 230, 60]);
/// Light gray inside the text band
pub const TEXT_WHITE: Rgb<u8> = Rgb([230, 230, 230]);

/// 600x500 frame; the hand region (lower 30%) starts at y = 350
pub const FRAME_WIDTH: u32 = 600;
pub const FRAME_HEIGHT: u32 = 500;
pub const HAND_TOP: u32 = 350;

pub fn blank_frame() -> RgbImage {
    RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, BACKGROUND)
}

pub fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for yy in y..(y + height).min(img.height()) {
        for xx in x..(x + width).min(img.width()) {
            img.put_pixel(xx, yy, color);
        }
    }
}

/// Frame with one glowing card per `(x, width)`, all 100 px tall starting at y = 370
pub fn frame_with_cards(cards: &[(u32, u32)]) -> DynamicImage {
    let mut img = blank_frame();
    for &(x, width) in cards {
        fill_rect(&mut img, x, 370, width, 100, GLOW);
    }
    DynamicImage::ImageRgb8(img)
}

/// Binary mask with the given rectangles set
pub fn mask_with_rects(width: u32, height: u32, rects: &[BoundingBox]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for r in rects {
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }
    mask
}

pub fn assert_near(actual: u32, expected: u32, tolerance: u32, what: &str) {
    assert!(
        actual.abs_diff(expected) <= tolerance,
        "{} was {}, expected {} ± {}",
        what,
        actual,
        expected,
        tolerance
    );
}

/// Recognizer returning a canned reply, or failing with a canned message
pub struct FakeRecognizer {
    reply: Result<String, String>,
}

impl FakeRecognizer {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
        }
    }
}

impl TextRecognizer for FakeRecognizer {
    fn recognize(&self, _image: &GrayImage, _mode: OcrMode) -> anyhow::Result<String> {
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}

/// Fails only for images of the given width, so one region can fail while
/// another succeeds
pub struct FailForWidth {
    pub width: u32,
    pub text: String,
}

impl TextRecognizer for FailForWidth {
    fn recognize(&self, image: &GrayImage, _mode: OcrMode) -> anyhow::Result<String> {
        if image.width() == self.width {
            anyhow::bail!("engine crashed on this crop");
        }
        Ok(self.text.clone())
    }
}
