use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Axis-aligned box in source-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Clip the box to a `width` x `height` image. Returns None when nothing
    /// of the box remains inside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<BoundingBox> {
        let x1 = self.x.min(width);
        let y1 = self.y.min(height);
        let x2 = self.right().min(width);
        let y2 = self.bottom().min(height);
        if x1 >= x2 || y1 >= y2 {
            return None;
        }
        Some(BoundingBox::new(x1, y1, x2 - x1, y2 - y1))
    }
}

/// A detected playable card and its left-to-right rank (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardBox {
    pub rank: usize,
    #[serde(flatten)]
    pub bbox: BoundingBox,
}

/// Extraction outcome for one configured region.
///
/// When OCR was requested exactly one of `value` / `error` is set; when it
/// was not, neither is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionResult {
    pub name: String,
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RegionResult {
    pub fn new(name: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            name: name.into(),
            x1: bbox.x,
            y1: bbox.y,
            x2: bbox.right(),
            y2: bbox.bottom(),
            width: bbox.width,
            height: bbox.height,
            value: None,
            error: None,
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.x1, self.y1, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Everything one invocation produces
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub image_size: ImageSize,
    pub debug_image: Option<PathBuf>,
    pub rois: BTreeMap<String, RegionResult>,
    pub cards: Vec<CardBox>,
    pub card_count: usize,
}
