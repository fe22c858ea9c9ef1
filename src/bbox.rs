//! Bounding-box validation and clipping
//!
//! Boxes are `[x, y, width, height]` in absolute pixels. A box is clipped to its
//! image's bounds, rounded to a fixed precision, and dropped when nothing of it
//! is left inside the image.

use log::debug;
use std::collections::HashMap;

use crate::coco::Dataset;

/// Decimal places kept for box position and size
pub const BBOX_DECIMALS: usize = 2;
/// Decimal places kept for box area
pub const AREA_DECIMALS: usize = 4;

const FIX_TOLERANCE: f64 = 1e-6;

/// Counters reported by [`validate_and_clip_bboxes`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BBoxStats {
    /// Annotations whose geometry changed while clipping
    pub fixed: usize,
    /// Annotations removed (missing image, negative size or nothing left after clipping)
    pub dropped: usize,
}

/// Round `value` to `digits` decimal places.
///
/// Goes through correctly rounded decimal formatting, so the decision is made on
/// the exact binary value (`1.005` rounds down to `1.0`).
pub fn round_to(value: f64, digits: usize) -> f64 {
    format!("{:.*}", digits, value).parse().unwrap_or(value)
}

// min(value, upper) then max(0, .); NaN collapses to 0
fn clamp_coord(value: f64, upper: f64) -> f64 {
    let value = if upper < value { upper } else { value };
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Clip a box to a `width` x `height` image, without rounding
pub fn clip_bbox(bbox: [f64; 4], width: u32, height: u32) -> [f64; 4] {
    let [x, y, w, h] = bbox;
    let (img_w, img_h) = (width as f64, height as f64);

    let x0 = clamp_coord(x, img_w);
    let y0 = clamp_coord(y, img_h);
    let x1 = clamp_coord(x + w, img_w);
    let y1 = clamp_coord(y + h, img_h);

    [x0, y0, non_negative(x1 - x0), non_negative(y1 - y0)]
}

fn geometry_changed(before: [f64; 4], after: [f64; 4]) -> bool {
    after[0] != before[0]
        || after[1] != before[1]
        || (after[2] - before[2]).abs() > FIX_TOLERANCE
        || (after[3] - before[3]).abs() > FIX_TOLERANCE
}

/// Drop annotations that cannot be placed on an image and, when `clip` is set,
/// clip the rest to their image bounds.
///
/// Survivors keep their relative order. A box that had to be clipped counts as
/// fixed even when the clipped result turns out degenerate and is dropped. A box
/// whose rounded width or height is zero is dropped, so a second pass over the
/// output changes nothing.
pub fn validate_and_clip_bboxes(dataset: &mut Dataset, clip: bool) -> BBoxStats {
    let sizes: HashMap<u64, (u32, u32)> = dataset
        .images
        .iter()
        .map(|img| (img.id, (img.width, img.height)))
        .collect();

    let mut stats = BBoxStats::default();
    let mut kept = Vec::with_capacity(dataset.annotations.len());

    for mut ann in std::mem::take(&mut dataset.annotations) {
        let Some(&(width, height)) = sizes.get(&ann.image_id) else {
            debug!("Dropping annotation {}: image {} not found", ann.id, ann.image_id);
            stats.dropped += 1;
            continue;
        };

        let [_, _, w, h] = ann.bbox;
        if w < 0.0 || h < 0.0 {
            debug!("Dropping annotation {}: negative box size", ann.id);
            stats.dropped += 1;
            continue;
        }

        if clip {
            let clipped = clip_bbox(ann.bbox, width, height);
            if geometry_changed(ann.bbox, clipped) {
                stats.fixed += 1;
            }

            let [x, y, w, h] = clipped;
            ann.bbox = [
                round_to(x, BBOX_DECIMALS),
                round_to(y, BBOX_DECIMALS),
                round_to(w, BBOX_DECIMALS),
                round_to(h, BBOX_DECIMALS),
            ];
            ann.area = Some(round_to(w * h, AREA_DECIMALS));

            // Judged on the stored size, so a width below the rounding step is dropped
            if ann.bbox[2] <= 0.0 || ann.bbox[3] <= 0.0 {
                debug!("Dropping annotation {}: box lies outside its image", ann.id);
                stats.dropped += 1;
                continue;
            }
        }

        kept.push(ann);
    }

    dataset.annotations = kept;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coco::{Annotation, Image};

    fn dataset_with(boxes: &[[f64; 4]]) -> Dataset {
        let mut dataset = Dataset::default();
        dataset.images.push(Image::new(1, "a.jpg", 100, 100));
        dataset.annotations = boxes
            .iter()
            .enumerate()
            .map(|(i, b)| Annotation::new(i as u64, 1, 0, *b))
            .collect();
        dataset
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.005, 2), 1.0); // 1.005 is stored just below the tie
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(12.3456789, 4), 12.3457);
        assert_eq!(round_to(95.0, 2), 95.0);
    }

    #[test]
    fn test_partially_outside_box_is_clipped_and_kept() {
        let mut dataset = dataset_with(&[[95.0, 95.0, 20.0, 20.0]]);
        let stats = validate_and_clip_bboxes(&mut dataset, true);

        assert_eq!(stats, BBoxStats { fixed: 1, dropped: 0 });
        assert_eq!(dataset.annotations[0].bbox, [95.0, 95.0, 5.0, 5.0]);
        assert_eq!(dataset.annotations[0].area, Some(25.0));
    }

    #[test]
    fn test_box_outside_image_is_dropped() {
        let mut dataset = dataset_with(&[[200.0, 200.0, 10.0, 10.0]]);
        let stats = validate_and_clip_bboxes(&mut dataset, true);

        assert_eq!(stats.dropped, 1);
        assert!(dataset.annotations.is_empty());
    }

    #[test]
    fn test_negative_size_and_missing_image_are_dropped() {
        let mut dataset = dataset_with(&[[10.0, 10.0, -1.0, 5.0], [10.0, 10.0, 5.0, 5.0]]);
        dataset.annotations[1].image_id = 42;

        let stats = validate_and_clip_bboxes(&mut dataset, true);
        assert_eq!(stats, BBoxStats { fixed: 0, dropped: 2 });
        assert!(dataset.annotations.is_empty());
    }

    #[test]
    fn test_negative_origin_is_shifted() {
        assert_eq!(
            clip_bbox([-10.0, -5.0, 30.0, 20.0], 100, 100),
            [0.0, 0.0, 20.0, 15.0]
        );
    }

    #[test]
    fn test_inside_box_untouched_but_area_filled() {
        let mut dataset = dataset_with(&[[10.0, 20.0, 30.0, 40.0]]);
        let stats = validate_and_clip_bboxes(&mut dataset, true);

        assert_eq!(stats, BBoxStats::default());
        assert_eq!(dataset.annotations[0].bbox, [10.0, 20.0, 30.0, 40.0]);
        assert_eq!(dataset.annotations[0].area, Some(1200.0));
    }

    #[test]
    fn test_clipping_is_idempotent() {
        let mut dataset = dataset_with(&[
            [95.123, 95.456, 20.0, 20.0],
            [-3.333, 10.101, 50.505, 33.337],
            [12.3456, 7.891, 0.129, 80.004],
        ]);
        validate_and_clip_bboxes(&mut dataset, true);
        let first: Vec<_> = dataset.annotations.iter().map(|a| a.bbox).collect();

        let stats = validate_and_clip_bboxes(&mut dataset, true);
        let second: Vec<_> = dataset.annotations.iter().map(|a| a.bbox).collect();

        assert_eq!(stats, BBoxStats::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_sub_precision_boxes_dropped_in_one_pass() {
        let mut dataset = dataset_with(&[
            [10.0, 10.0, 0.004, 5.0],
            [99.996, 46.35, 54.83, 46.21],
            [95.123, 95.456, 20.0, 20.0],
        ]);
        let stats = validate_and_clip_bboxes(&mut dataset, true);

        // only the second and third boxes needed clipping
        assert_eq!(stats, BBoxStats { fixed: 2, dropped: 2 });
        assert_eq!(dataset.annotations.len(), 1);
        assert_eq!(dataset.annotations[0].id, 2);
        assert!(dataset
            .annotations
            .iter()
            .all(|a| a.bbox[2] > 0.0 && a.bbox[3] > 0.0));

        let first: Vec<_> = dataset.annotations.iter().map(|a| a.bbox).collect();
        let stats = validate_and_clip_bboxes(&mut dataset, true);
        let second: Vec<_> = dataset.annotations.iter().map(|a| a.bbox).collect();
        assert_eq!(stats, BBoxStats::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_clip_keeps_geometry() {
        let mut dataset = dataset_with(&[[95.0, 95.0, 20.0, 20.0], [1.0, 1.0, -2.0, 1.0]]);
        let stats = validate_and_clip_bboxes(&mut dataset, false);

        assert_eq!(stats, BBoxStats { fixed: 0, dropped: 1 });
        assert_eq!(dataset.annotations[0].bbox, [95.0, 95.0, 20.0, 20.0]);
        assert_eq!(dataset.annotations[0].area, None);
    }
}
