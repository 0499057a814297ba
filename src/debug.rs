//! Optional persistence of intermediate images.
//!
//! A sink is passed explicitly into each pipeline call, so two runs writing
//! to different directories never share any location state. Nothing a sink
//! does feeds back into detection or OCR.

use anyhow::Result;
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

use crate::models::{BoundingBox, CardBox, RegionResult};

/// Receives named intermediate images
pub trait DebugSink: Send + Sync {
    /// Persist `image` under `name`; returns where it went, if anywhere
    fn save(&self, name: &str, image: &DynamicImage) -> Result<Option<PathBuf>>;

    fn is_enabled(&self) -> bool {
        true
    }

    /// Like [`DebugSink::save`], but a failed write is only logged
    fn save_quietly(&self, name: &str, image: &DynamicImage) -> Option<PathBuf> {
        match self.save(name, image) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(artifact = name, "failed to save debug image: {:#}", e);
                None
            }
        }
    }

    fn save_gray(&self, name: &str, image: &GrayImage) -> Option<PathBuf> {
        if !self.is_enabled() {
            return None;
        }
        self.save_quietly(name, &DynamicImage::ImageLuma8(image.clone()))
    }

    fn save_rgb(&self, name: &str, image: &RgbImage) -> Option<PathBuf> {
        if !self.is_enabled() {
            return None;
        }
        self.save_quietly(name, &DynamicImage::ImageRgb8(image.clone()))
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DebugSink for NullSink {
    fn save(&self, _name: &str, _image: &DynamicImage) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Writes `<name>.png` files into one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    output_dir: PathBuf,
}

impl DirectorySink {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl DebugSink for DirectorySink {
    fn save(&self, name: &str, image: &DynamicImage) -> Result<Option<PathBuf>> {
        let filename = format!("{}.png", name.to_lowercase().replace(' ', "_"));
        let output_path = self.output_dir.join(filename);
        image
            .save(&output_path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        tracing::debug!(path = %output_path.display(), "saved debug image");
        Ok(Some(output_path))
    }
}

const REGION_COLORS: [Rgb<u8>; 6] = [
    Rgb([0, 255, 0]),
    Rgb([0, 0, 255]),
    Rgb([255, 0, 0]),
    Rgb([0, 255, 255]),
    Rgb([255, 0, 255]),
    Rgb([255, 255, 0]),
];

const CARD_COLOR: Rgb<u8> = Rgb([255, 140, 0]);

/// Copy of `img` with region and card rectangles outlined (2 px)
pub fn draw_overlay(img: &DynamicImage, regions: &[RegionResult], cards: &[CardBox]) -> RgbImage {
    let mut overlay = img.to_rgb8();

    for (idx, region) in regions.iter().enumerate() {
        outline(&mut overlay, &region.bbox(), REGION_COLORS[idx % REGION_COLORS.len()]);
    }
    for card in cards {
        outline(&mut overlay, &card.bbox, CARD_COLOR);
    }

    overlay
}

fn outline(canvas: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
    let (x, y) = (bbox.x as i32, bbox.y as i32);
    draw_hollow_rect_mut(canvas, Rect::at(x, y).of_size(bbox.width, bbox.height), color);
    if bbox.width > 2 && bbox.height > 2 {
        draw_hollow_rect_mut(
            canvas,
            Rect::at(x + 1, y + 1).of_size(bbox.width - 2, bbox.height - 2),
            color,
        );
    }
}
