use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{default_regions, DetectorConfig, OcrConfig, RegionConfig};
use crate::debug::{self, DebugSink, DirectorySink, NullSink};
use crate::detection::CardDetector;
use crate::models::{ImageSize, PipelineResult};
use crate::roi::ocr::{TextRecognizer, UnavailableRecognizer};
use crate::roi::RoiPipeline;

/// Decode an image file. Failing here is fatal for the whole run.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))?;
    Ok(img)
}

/// One-image analysis: playable cards plus configured text regions.
///
/// Holds only read-only configuration, so one `Pipeline` can serve several
/// threads as long as each uses its own debug directory.
pub struct Pipeline {
    detector: CardDetector,
    rois: RoiPipeline,
    recognizer: Box<dyn TextRecognizer>,
    debug: Option<DirectorySink>,
}

impl Pipeline {
    /// Default thresholds, built-in regions, no OCR engine
    pub fn new() -> Self {
        Self {
            detector: CardDetector::default(),
            rois: RoiPipeline::new(default_regions()),
            recognizer: Box::new(UnavailableRecognizer),
            debug: None,
        }
    }

    pub fn with_detector_config(mut self, config: DetectorConfig) -> Self {
        self.detector = CardDetector::new(config);
        self
    }

    pub fn with_ocr_config(mut self, config: OcrConfig) -> Self {
        self.rois = self.rois.with_config(config);
        self
    }

    pub fn with_regions(mut self, regions: Vec<RegionConfig>) -> Self {
        self.rois.regions = regions;
        self
    }

    pub fn with_recognizer(mut self, recognizer: Box<dyn TextRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Enable debug output into `output_dir`, which must be empty or absent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.debug = Some(DirectorySink::new(output_dir)?);
        Ok(self)
    }

    /// Analyze `img` with this pipeline's own debug directory (if any)
    pub fn run(&self, img: &DynamicImage) -> PipelineResult {
        match &self.debug {
            Some(sink) => self.run_with_sink(img, sink),
            None => self.run_with_sink(img, &NullSink),
        }
    }

    /// Analyze `img`, sending intermediates to `sink`
    pub fn run_with_sink(&self, img: &DynamicImage, sink: &dyn DebugSink) -> PipelineResult {
        info!(width = img.width(), height = img.height(), "analyzing image");
        if sink.is_enabled() {
            sink.save_quietly("input", img);
        }

        let regions = self.rois.extract(img, self.recognizer.as_ref(), sink);
        let cards = self.detector.detect(img, sink);

        let debug_image = if sink.is_enabled() {
            let overlay = debug::draw_overlay(img, &regions, &cards);
            sink.save_rgb("debug_overlay", &overlay)
        } else {
            None
        };

        let rois: BTreeMap<_, _> = regions.into_iter().map(|r| (r.name.clone(), r)).collect();

        PipelineResult {
            image_size: ImageSize {
                width: img.width(),
                height: img.height(),
            },
            debug_image,
            rois,
            card_count: cards.len(),
            cards,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
