pub mod blobs;
pub mod color;
pub mod contours;
pub mod preprocessing;

use image::{DynamicImage, GrayImage, RgbImage};
use tracing::{debug, info};

use crate::config::DetectorConfig;
use crate::debug::{DebugSink, NullSink};
use crate::models::{BoundingBox, CardBox};

/// Finds the playable cards in the hand area by their highlight glow
pub struct CardDetector {
    pub config: DetectorConfig,
}

impl CardDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Detect playable cards, ranked left to right.
    ///
    /// Zero cards is a normal answer (empty hand, nothing playable), so this
    /// never fails; `sink` only receives intermediate masks.
    pub fn detect(&self, img: &DynamicImage, sink: &dyn DebugSink) -> Vec<CardBox> {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let (raw_mask, candidates) = self.hand_blobs(&rgb, sink);

        // Step 4: split multi-card blobs, repair over-splits
        let boxes = candidates
            .iter()
            .flat_map(|blob| blobs::separate_cards(&raw_mask, blob, &self.config.split))
            .filter_map(|b| b.clamp_to(width, height))
            .collect();

        let cards = rank_cards(boxes);
        info!(count = cards.len(), "playable cards detected");
        cards
    }

    /// Boxes of glow blobs in the hand area before splitting (for inspection)
    pub fn candidate_blobs(&self, img: &DynamicImage) -> Vec<BoundingBox> {
        self.hand_blobs(&img.to_rgb8(), &NullSink).1
    }

    /// Steps 1-3: the raw glow mask of the whole frame, and the cleaned
    /// blobs found inside the hand region
    fn hand_blobs(&self, rgb: &RgbImage, sink: &dyn DebugSink) -> (GrayImage, Vec<BoundingBox>) {
        let (width, height) = rgb.dimensions();

        // Step 1: glow mask over the whole frame
        let raw_mask = color::hsv_mask(rgb, &self.config.glow_band);
        sink.save_gray("cards_mask", &raw_mask);

        // Step 2: consolidate fragmented glow into solid blobs
        let cleaned = preprocessing::clean_mask(
            &raw_mask,
            self.config.close_radius,
            self.config.dilate_radius,
        );
        sink.save_gray("cards_mask_clean", &cleaned);

        // Step 3: only the hand area holds cards
        let Some(hand) =
            preprocessing::hand_region(width, height, self.config.hand_region_fraction)
        else {
            debug!("hand region is empty");
            return (raw_mask, Vec::new());
        };
        let hand_mask = preprocessing::crop_mask(&cleaned, &hand);

        let candidates = contours::find_card_candidates(
            &hand_mask,
            hand.y,
            self.config.min_area,
            self.config.min_height,
        );
        debug!(candidates = candidates.len(), hand_top = hand.y, "glow blobs in hand region");
        (raw_mask, candidates)
    }
}

impl Default for CardDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

/// Sort left to right and number from 1
pub fn rank_cards(mut boxes: Vec<BoundingBox>) -> Vec<CardBox> {
    boxes.sort_by_key(|b| (b.x, b.y));
    boxes
        .into_iter()
        .enumerate()
        .map(|(i, bbox)| CardBox { rank: i + 1, bbox })
        .collect()
}
