//! Tunable thresholds and the static region configuration.
//!
//! Every constant here was calibrated against one game client at one
//! resolution. They are exposed through the config structs so a different
//! theme or resolution can be recalibrated without touching the algorithms.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive lower/upper bounds in 8-bit HSV space (hue 0..=180).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvBand {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvBand {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// True when every channel lies inside its bound (both ends inclusive)
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }
}

/// Highlight colour of playable cards
pub const GLOW_BAND: HsvBand = HsvBand::new([38, 110, 120], [95, 255, 255]);

/// Near-white / light-gray text pixels
pub const TEXT_BAND: HsvBand = HsvBand::new([0, 0, 180], [180, 40, 255]);

/// The hand occupies the lower part of the frame; this is the fraction of
/// the frame height searched for cards, measured from the bottom.
pub const HAND_REGION_FRACTION: f32 = 0.30;

/// Closing radius (L-infinity, so radius 2 is a 5x5 square)
pub const CLOSE_RADIUS: u8 = 2;

/// Extra dilation radius applied after closing (1 is a 3x3 square, 0 disables)
pub const DILATE_RADIUS: u8 = 1;

pub const MIN_CONTOUR_AREA: u32 = 2000;
pub const MIN_CONTOUR_HEIGHT: u32 = 50;

pub const VALLEY_RATIO: f32 = 0.18;
pub const WIDE_BOX_SMOOTHING_WINDOW: usize = 9;
pub const NARROW_BOX_SMOOTHING_WINDOW: usize = 7;
/// Boxes wider than this use the wide smoothing window
pub const WIDE_BOX_THRESHOLD: u32 = 120;
pub const MIN_VALLEY_RUN: usize = 10;
pub const MIN_NARROW_GAP_RUN: usize = 2;
pub const EDGE_MARGIN: usize = 12;

pub const MIN_WIDTH_RATIO: f32 = 0.55;
pub const MAX_WIDTH_RATIO: f32 = 1.25;

/// Card width relative to card height
pub const CARD_ASPECT: f32 = 0.65;
pub const MIN_CARD_WIDTH: f32 = 60.0;

/// Characters kept by the `digits` OCR mode
pub const DIGIT_CHARSET: &str = "0123456789/";

/// Parameters of the blob splitter and merger.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    pub valley_ratio: f32,
    pub wide_window: usize,
    pub narrow_window: usize,
    pub wide_box_threshold: u32,
    pub min_valley_run: usize,
    pub min_narrow_gap_run: usize,
    pub edge_margin: usize,
    pub min_width_ratio: f32,
    pub max_width_ratio: f32,
    pub card_aspect: f32,
    pub min_card_width: f32,
}

impl SplitConfig {
    /// Expected width of a single card whose glow box is `height` pixels tall.
    /// Height is the more stable signal near the hand, so width derives from it.
    pub fn expected_card_width(&self, height: u32) -> f32 {
        (self.card_aspect * height as f32).max(self.min_card_width)
    }

    pub fn min_width(&self, expected: f32) -> f32 {
        self.min_width_ratio * expected
    }

    pub fn max_width(&self, expected: f32) -> f32 {
        self.max_width_ratio * expected
    }

    pub fn smoothing_window(&self, box_width: u32) -> usize {
        if box_width > self.wide_box_threshold {
            self.wide_window
        } else {
            self.narrow_window
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            valley_ratio: VALLEY_RATIO,
            wide_window: WIDE_BOX_SMOOTHING_WINDOW,
            narrow_window: NARROW_BOX_SMOOTHING_WINDOW,
            wide_box_threshold: WIDE_BOX_THRESHOLD,
            min_valley_run: MIN_VALLEY_RUN,
            min_narrow_gap_run: MIN_NARROW_GAP_RUN,
            edge_margin: EDGE_MARGIN,
            min_width_ratio: MIN_WIDTH_RATIO,
            max_width_ratio: MAX_WIDTH_RATIO,
            card_aspect: CARD_ASPECT,
            min_card_width: MIN_CARD_WIDTH,
        }
    }
}

/// Parameters of the card detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub glow_band: HsvBand,
    pub hand_region_fraction: f32,
    pub close_radius: u8,
    pub dilate_radius: u8,
    pub min_area: u32,
    pub min_height: u32,
    pub split: SplitConfig,
}

impl DetectorConfig {
    pub fn with_glow_band(mut self, band: HsvBand) -> Self {
        self.glow_band = band;
        self
    }

    pub fn with_hand_region_fraction(mut self, fraction: f32) -> Self {
        self.hand_region_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            glow_band: GLOW_BAND,
            hand_region_fraction: HAND_REGION_FRACTION,
            close_radius: CLOSE_RADIUS,
            dilate_radius: DILATE_RADIUS,
            min_area: MIN_CONTOUR_AREA,
            min_height: MIN_CONTOUR_HEIGHT,
            split: SplitConfig::default(),
        }
    }
}

/// Parameters of the OCR preprocessor.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    pub text_band: HsvBand,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            text_band: TEXT_BAND,
        }
    }
}

/// How recognized text is cleaned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrMode {
    #[default]
    Text,
    Digits,
}

impl OcrMode {
    /// Trim whitespace, and in `Digits` mode drop anything outside [`DIGIT_CHARSET`]
    pub fn clean(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self {
            OcrMode::Text => trimmed.to_string(),
            OcrMode::Digits => trimmed
                .chars()
                .filter(|c| DIGIT_CHARSET.contains(*c))
                .collect(),
        }
    }
}

/// A fixed, named rectangle of the screen capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
    #[serde(default, alias = "ocr_enabled")]
    pub ocr: bool,
    #[serde(default, alias = "ocr_type")]
    pub ocr_mode: OcrMode,
}

impl RegionConfig {
    pub fn new(name: impl Into<String>, x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self {
            name: name.into(),
            x1,
            y1,
            x2,
            y2,
            ocr: false,
            ocr_mode: OcrMode::Text,
        }
    }

    pub fn with_ocr(mut self, mode: OcrMode) -> Self {
        self.ocr = true;
        self.ocr_mode = mode;
        self
    }
}

/// Built-in regions: the mana counter of the reference client layout
pub fn default_regions() -> Vec<RegionConfig> {
    vec![RegionConfig::new("mana", 1227, 414, 1285, 463).with_ocr(OcrMode::Text)]
}

/// Load a JSON array of regions
pub fn load_regions(path: &Path) -> anyhow::Result<Vec<RegionConfig>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read region file {}", path.display()))?;
    let regions: Vec<RegionConfig> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid region file {}", path.display()))?;
    Ok(regions)
}
