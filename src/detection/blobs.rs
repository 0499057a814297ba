//! Splitting glow blobs that cover several adjacent cards, and re-joining
//! fragments that were cut too finely.
//!
//! The splitter looks at how many glow pixels each column of a blob holds.
//! Between two cards whose glows touch, that count drops; a long enough
//! run of low columns is taken as the gap between them.

use image::GrayImage;

use crate::config::SplitConfig;
use crate::models::BoundingBox;

/// Number of set mask pixels in each column of `bbox`
pub fn column_profile(mask: &GrayImage, bbox: &BoundingBox) -> Vec<u32> {
    let Some(area) = bbox.clamp_to(mask.width(), mask.height()) else {
        return vec![0; bbox.width as usize];
    };

    let mut profile = vec![0u32; bbox.width as usize];
    for x in area.x..area.right() {
        let column = (x - bbox.x) as usize;
        profile[column] = (area.y..area.bottom())
            .filter(|&y| mask.get_pixel(x, y)[0] > 0)
            .count() as u32;
    }
    profile
}

/// Centered moving average; columns outside the profile count as zero
pub fn smooth_profile(profile: &[u32], window: usize) -> Vec<f32> {
    if window <= 1 {
        return profile.iter().map(|&v| v as f32).collect();
    }

    let half = window / 2;
    (0..profile.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + window - half).min(profile.len());
            let sum: u32 = profile[start..end].iter().sum();
            sum as f32 / window as f32
        })
        .collect()
}

/// Inclusive `(start, end)` column runs whose value stays below `limit`
/// for at least `min_run` columns
pub fn valley_runs(values: &[f32], limit: f32, min_run: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &v) in values.iter().enumerate() {
        match (v < limit, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_run {
                    runs.push((s, i - 1));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if values.len() - s >= min_run {
            runs.push((s, values.len() - 1));
        }
    }

    runs
}

/// Midpoints of the valley runs, minus those too close to either box edge
fn valley_cuts(values: &[f32], limit: f32, min_run: usize, edge_margin: usize) -> Vec<usize> {
    let width = values.len();
    valley_runs(values, limit, min_run)
        .into_iter()
        .map(|(s, e)| (s + e) / 2)
        .filter(|&cut| cut >= edge_margin && cut + edge_margin <= width)
        .collect()
}

/// Shrink `[start, end)` to the columns dense enough to belong to a card,
/// dropping gap columns and thin glow bridges at the segment ends
fn tighten(profile: &[u32], start: usize, end: usize, limit: f32) -> Option<(usize, usize)> {
    let dense = |i: &usize| profile[*i] as f32 >= limit;
    let first = (start..end).find(dense)?;
    let last = (start..end).rev().find(dense)?;
    Some((first, last + 1))
}

/// Cut one blob box into single-card boxes.
///
/// `mask` is the raw colour mask of the whole frame, before morphology:
/// closing fills exactly the gaps this function looks for. The box comes
/// back unchanged when it already has single-card width or when no cut
/// produces a plausible card. Otherwise every segment holding glow is
/// returned, whatever its width, so no covered column is lost.
pub fn split_blob(mask: &GrayImage, bbox: &BoundingBox, config: &SplitConfig) -> Vec<BoundingBox> {
    let expected = config.expected_card_width(bbox.height);
    let min_width = config.min_width(expected);
    let max_width = config.max_width(expected);

    if bbox.width as f32 <= max_width {
        return vec![*bbox];
    }

    let profile = column_profile(mask, bbox);
    let limit = config.valley_ratio * bbox.height as f32;

    let smoothed = smooth_profile(&profile, config.smoothing_window(bbox.width));
    let mut cuts = valley_cuts(&smoothed, limit, config.min_valley_run, config.edge_margin);

    if cuts.is_empty() {
        // Gaps narrower than the smoothing window vanish from the smoothed
        // profile, so look again at the raw one.
        let raw: Vec<f32> = profile.iter().map(|&v| v as f32).collect();
        cuts = valley_cuts(&raw, limit, config.min_narrow_gap_run, config.edge_margin);
    }

    if cuts.is_empty() {
        tracing::debug!(x = bbox.x, w = bbox.width, "no valley found, keeping wide blob");
        return vec![*bbox];
    }

    let mut bounds = Vec::with_capacity(cuts.len() + 2);
    bounds.push(0);
    bounds.extend(cuts);
    bounds.push(profile.len());

    let segments: Vec<BoundingBox> = bounds
        .windows(2)
        .filter_map(|pair| tighten(&profile, pair[0], pair[1], limit))
        .map(|(start, end)| {
            BoundingBox::new(bbox.x + start as u32, bbox.y, (end - start) as u32, bbox.height)
        })
        .collect();

    let card_sized = segments
        .iter()
        .filter(|b| {
            let width = b.width as f32;
            width >= min_width && width <= max_width
        })
        .count();
    if card_sized == 0 {
        tracing::debug!(x = bbox.x, w = bbox.width, "no plausible segment, keeping wide blob");
        return vec![*bbox];
    }

    // Oversized segments stay as one detection each; undersized ones are
    // left for merge_narrow.
    tracing::debug!(
        x = bbox.x,
        w = bbox.width,
        parts = segments.len(),
        card_sized,
        "split blob"
    );
    segments
}

/// Join each box narrower than `min_width` with its right-hand neighbour.
///
/// One left-to-right pass: a merge consumes both boxes, so a fragment is
/// corrected at most once per call.
pub fn merge_narrow(boxes: &[BoundingBox], min_width: f32) -> Vec<BoundingBox> {
    let mut sorted = boxes.to_vec();
    sorted.sort_by_key(|b| b.x);

    let mut merged = Vec::with_capacity(sorted.len());
    let mut i = 0;
    while i < sorted.len() {
        let current = sorted[i];
        if (current.width as f32) < min_width && i + 1 < sorted.len() {
            let next = sorted[i + 1];
            let right = next.right().max(current.right());
            let top = current.y.min(next.y);
            merged.push(BoundingBox::new(
                current.x,
                top,
                right - current.x,
                current.height.max(next.height),
            ));
            i += 2;
        } else {
            merged.push(current);
            i += 1;
        }
    }

    merged
}

/// Split a blob, then repair over-splitting with the blob's own expected width
pub fn separate_cards(mask: &GrayImage, bbox: &BoundingBox, config: &SplitConfig) -> Vec<BoundingBox> {
    let segments = split_blob(mask, bbox, config);
    let expected = config.expected_card_width(bbox.height);
    merge_narrow(&segments, config.min_width(expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_preserves_flat_interior() {
        let profile = vec![10u32; 20];
        let smoothed = smooth_profile(&profile, 7);
        assert_eq!(smoothed[10], 10.0);
        // zero padding pulls the ends down
        assert!(smoothed[0] < 10.0);
    }

    #[test]
    fn short_runs_are_not_valleys() {
        let mut values = vec![50.0f32; 40];
        for v in &mut values[10..14] {
            *v = 0.0;
        }
        for v in &mut values[20..32] {
            *v = 1.0;
        }
        assert_eq!(valley_runs(&values, 5.0, 10), vec![(20, 31)]);
        assert_eq!(valley_runs(&values, 5.0, 2), vec![(10, 13), (20, 31)]);
    }

    #[test]
    fn trailing_run_is_reported() {
        let values = [9.0, 9.0, 0.0, 0.0, 0.0];
        assert_eq!(valley_runs(&values, 1.0, 3), vec![(2, 4)]);
    }

    #[test]
    fn cuts_near_edges_are_dropped() {
        let mut values = vec![50.0f32; 100];
        for v in &mut values[0..12] {
            *v = 0.0;
        }
        for v in &mut values[45..57] {
            *v = 0.0;
        }
        assert_eq!(valley_cuts(&values, 5.0, 10, 12), vec![50]);
    }
}
