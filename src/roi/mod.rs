pub mod ocr;

use image::{DynamicImage, RgbImage};
use tracing::{debug, info, warn};

use crate::config::{OcrConfig, RegionConfig};
use crate::debug::DebugSink;
use crate::models::{BoundingBox, RegionResult};
use self::ocr::TextRecognizer;

/// Clamp raw corners into a `width` x `height` image.
/// None when the rectangle is empty after clamping.
pub fn clamp_rect(
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
    width: u32,
    height: u32,
) -> Option<BoundingBox> {
    let clamp = |v: i64, max: u32| v.clamp(0, max as i64) as u32;
    let (x1, x2) = (clamp(x1, width), clamp(x2, width));
    let (y1, y2) = (clamp(y1, height), clamp(y2, height));

    if x1 >= x2 || y1 >= y2 {
        return None;
    }
    Some(BoundingBox::new(x1, y1, x2 - x1, y2 - y1))
}

/// Crop a configured region. None (logged) when the region is degenerate
/// once clamped to the image.
pub fn extract_region(img: &RgbImage, region: &RegionConfig) -> Option<(RgbImage, BoundingBox)> {
    let (width, height) = img.dimensions();
    let Some(bbox) = clamp_rect(region.x1, region.y1, region.x2, region.y2, width, height) else {
        warn!(
            region = %region.name,
            x1 = region.x1, y1 = region.y1, x2 = region.x2, y2 = region.y2,
            "invalid coordinates, region skipped"
        );
        return None;
    };

    let crop = image::imageops::crop_imm(img, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
    Some((crop, bbox))
}

/// Crops the configured regions and reads text from the ones that ask for it
pub struct RoiPipeline {
    pub regions: Vec<RegionConfig>,
    pub config: OcrConfig,
}

impl RoiPipeline {
    pub fn new(regions: Vec<RegionConfig>) -> Self {
        Self {
            regions,
            config: OcrConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OcrConfig) -> Self {
        self.config = config;
        self
    }

    /// Results for every valid region, in declaration order. Degenerate
    /// regions are left out; OCR problems stay confined to their region.
    pub fn extract(
        &self,
        img: &DynamicImage,
        recognizer: &dyn TextRecognizer,
        sink: &dyn DebugSink,
    ) -> Vec<RegionResult> {
        let rgb = img.to_rgb8();
        info!(count = self.regions.len(), "extracting regions");

        self.regions
            .iter()
            .filter_map(|region| self.extract_one(&rgb, region, recognizer, sink))
            .collect()
    }

    fn extract_one(
        &self,
        img: &RgbImage,
        region: &RegionConfig,
        recognizer: &dyn TextRecognizer,
        sink: &dyn DebugSink,
    ) -> Option<RegionResult> {
        let (crop, bbox) = extract_region(img, region)?;
        debug!(
            region = %region.name,
            x = bbox.x, y = bbox.y, w = bbox.width, h = bbox.height,
            "extracted region"
        );

        let mut result = RegionResult::new(region.name.clone(), bbox);
        if !region.ocr {
            return Some(result);
        }

        if !recognizer.is_available() {
            warn!(region = %region.name, "OCR requested but no recognition engine is available");
            result.error = Some("text recognition engine unavailable".to_string());
            return Some(result);
        }

        let prepared = ocr::prepare_for_ocr(&crop, &self.config.text_band);
        prepared.save_debug(&region.name, &crop, sink);
        debug!(region = %region.name, level = prepared.otsu_level, "binarized region");

        match recognizer.recognize(&prepared.inverted, region.ocr_mode) {
            Ok(raw) => {
                let cleaned = region.ocr_mode.clean(&raw);
                debug!(region = %region.name, raw = ?raw, cleaned = %cleaned, "OCR result");
                result.value = Some(cleaned);
            }
            Err(e) => {
                warn!(region = %region.name, "OCR failed: {:?}", e);
                result.error = Some(e.to_string());
            }
        }

        Some(result)
    }
}
