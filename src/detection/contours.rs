use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::HashMap;

use crate::models::BoundingBox;

/// Bounding boxes of the external blobs in a binary mask, in mask-local
/// coordinates. Every connected component yields exactly one box, so holes
/// inside a blob never produce boxes of their own.
pub fn find_blob_boxes(mask: &GrayImage) -> Vec<BoundingBox> {
    let labeled = connected_components(mask, Connectivity::Eight, Luma([0]));

    let mut regions: HashMap<u32, (u32, u32, u32, u32)> = HashMap::new();

    for (x, y, label) in labeled.enumerate_pixels() {
        let label_val = label[0];
        if label_val == 0 {
            continue; // background
        }

        regions
            .entry(label_val)
            .and_modify(|(min_x, min_y, max_x, max_y)| {
                *min_x = (*min_x).min(x);
                *min_y = (*min_y).min(y);
                *max_x = (*max_x).max(x);
                *max_y = (*max_y).max(y);
            })
            .or_insert((x, y, x, y));
    }

    let mut boxes: Vec<BoundingBox> = regions
        .into_values()
        .map(|(min_x, min_y, max_x, max_y)| {
            BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
        })
        .collect();
    // HashMap order is arbitrary
    boxes.sort_by_key(|b| (b.x, b.y));
    boxes
}

/// Blob boxes of `mask` that are large enough to be cards, shifted down by
/// `y_offset` into full-image coordinates.
pub fn find_card_candidates(
    mask: &GrayImage,
    y_offset: u32,
    min_area: u32,
    min_height: u32,
) -> Vec<BoundingBox> {
    find_blob_boxes(mask)
        .into_iter()
        .filter(|b| {
            let keep = b.area() >= min_area && b.height >= min_height;
            if !keep {
                tracing::debug!(x = b.x, y = b.y, w = b.width, h = b.height, "dropping small blob");
            }
            keep
        })
        .map(|b| BoundingBox::new(b.x, b.y + y_offset, b.width, b.height))
        .collect()
}
