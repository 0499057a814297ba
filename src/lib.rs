pub mod config;
pub mod debug;
pub mod detection;
pub mod models;
pub mod pipeline;
pub mod roi;

pub use config::{DetectorConfig, HsvBand, OcrConfig, OcrMode, RegionConfig, SplitConfig};
pub use debug::{DebugSink, DirectorySink, NullSink};
pub use detection::CardDetector;
pub use models::{BoundingBox, CardBox, ImageSize, PipelineResult, RegionResult};
pub use pipeline::{load_image, Pipeline};
pub use roi::ocr::{OcrsRecognizer, TextRecognizer, UnavailableRecognizer};
pub use roi::RoiPipeline;
