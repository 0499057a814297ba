use anyhow::Context;
use image::{DynamicImage, GrayImage, RgbImage};
pub use ocrs::{ImageSource, OcrEngine}; // Re-export for callers building their own engine
use ocrs::OcrEngineParams;
use rten::Model;
use std::path::{Path, PathBuf};

use crate::config::{HsvBand, OcrMode};
use crate::debug::DebugSink;
use crate::detection::{color, preprocessing};

/// Every stage of OCR preparation for one crop
pub struct PreparedRegion {
    /// Text-band mask
    pub mask: GrayImage,
    /// The crop with everything outside the mask blacked out
    pub foreground: RgbImage,
    pub gray: GrayImage,
    /// Otsu-binarized gray: light text on black
    pub binary: GrayImage,
    /// `binary` inverted: dark text on white, what the recognizer gets
    pub inverted: GrayImage,
    pub otsu_level: u8,
}

impl PreparedRegion {
    /// Store each stage as `roi_<name>_<n>_<stage>`
    pub fn save_debug(&self, name: &str, original: &RgbImage, sink: &dyn DebugSink) {
        if !sink.is_enabled() {
            return;
        }
        sink.save_rgb(&format!("roi_{name}_0_original"), original);
        sink.save_gray(&format!("roi_{name}_1_mask"), &self.mask);
        sink.save_rgb(&format!("roi_{name}_2_only_white_gray"), &self.foreground);
        sink.save_gray(&format!("roi_{name}_3_gray"), &self.gray);
        sink.save_gray(&format!("roi_{name}_4_binary"), &self.binary);
        sink.save_gray(&format!("roi_{name}_5_inverted"), &self.inverted);
    }
}

/// Isolate near-white text from background art and binarize it.
///
/// The Otsu split point adapts to each crop, since background brightness
/// changes between regions and game states.
pub fn prepare_for_ocr(crop: &RgbImage, text_band: &HsvBand) -> PreparedRegion {
    let mask = color::hsv_mask(crop, text_band);
    let foreground = color::apply_mask(crop, &mask);
    let gray = preprocessing::to_grayscale(&DynamicImage::ImageRgb8(foreground.clone()));
    let (binary, otsu_level) = preprocessing::binarize_otsu(&gray);
    let inverted = preprocessing::invert(&binary);

    PreparedRegion {
        mask,
        foreground,
        gray,
        binary,
        inverted,
        otsu_level,
    }
}

/// Text recognition capability, injected at construction time
pub trait TextRecognizer: Send + Sync {
    /// False for an engine that can never produce text
    fn is_available(&self) -> bool {
        true
    }

    /// Raw recognized text; cleaning per mode is the caller's job
    fn recognize(&self, image: &GrayImage, mode: OcrMode) -> anyhow::Result<String>;
}

/// Stand-in used when no OCR engine could be set up
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRecognizer;

impl TextRecognizer for UnavailableRecognizer {
    fn is_available(&self) -> bool {
        false
    }

    fn recognize(&self, _image: &GrayImage, _mode: OcrMode) -> anyhow::Result<String> {
        anyhow::bail!("text recognition engine unavailable")
    }
}

/// Recognizer backed by the `ocrs` engine
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

/// Default model location: `~/.cache/ocrs`
pub fn default_model_dir() -> anyhow::Result<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Neither HOME nor USERPROFILE is set")?;
    Ok(Path::new(&home_dir).join(".cache/ocrs"))
}

impl OcrsRecognizer {
    /// Load the detection and recognition models from `model_dir`
    pub fn from_dir(model_dir: &Path) -> anyhow::Result<Self> {
        let detection_model_path = model_dir.join("text-detection.rten");
        let recognition_model_path = model_dir.join("text-recognition.rten");

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            anyhow::bail!(
                "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
                 Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            );
        }

        let detection_model = Model::load_file(&detection_model_path)?;
        let recognition_model = Model::load_file(&recognition_model_path)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })?;

        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsRecognizer {
    // ocrs has no character whitelist, so digits mode reads like text mode
    fn recognize(&self, image: &GrayImage, _mode: OcrMode) -> anyhow::Result<String> {
        let img = DynamicImage::ImageLuma8(image.clone()).to_rgb8();

        let img_source = ImageSource::from_bytes(img.as_raw(), img.dimensions())
            .map_err(|e| anyhow::anyhow!("Invalid OCR input image: {:?}", e))?;
        let ocr_input = self.engine.prepare_input(img_source)?;
        let text = self.engine.get_text(&ocr_input)?;
        Ok(text)
    }
}

/// The ocrs engine from `model_dir` (or the default location), falling back
/// to [`UnavailableRecognizer`] when the models cannot be loaded
pub fn init_recognizer(model_dir: Option<&Path>) -> Box<dyn TextRecognizer> {
    let dir = match model_dir {
        Some(dir) => dir.to_path_buf(),
        None => match default_model_dir() {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("OCR disabled: {:#}", e);
                return Box::new(UnavailableRecognizer);
            }
        },
    };

    match OcrsRecognizer::from_dir(&dir) {
        Ok(recognizer) => {
            tracing::info!(models = %dir.display(), "OCR engine initialized");
            Box::new(recognizer)
        }
        Err(e) => {
            tracing::warn!("OCR disabled: {:#}", e);
            Box::new(UnavailableRecognizer)
        }
    }
}
