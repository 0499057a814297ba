#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from cardglow for tests
#[allow(unused_imports)]
pub use cardglow::{
    BoundingBox, CardBox, CardDetector, DetectorConfig, NullSink, OcrMode, Pipeline,
    RegionConfig, RoiPipeline, SplitConfig, UnavailableRecognizer,
};
