//! Mapping detector pixel boxes into normalized page-fraction rectangles.
//!
//! The layout detector reports corner boxes `(x0, y0, x1, y1)` in the pixel
//! space it actually ran inference on. When the rendered page image was
//! larger than the detector's maximum input size, the detector operated on
//! a scaled-down copy and its boxes must be scaled back up before use.
//! Omitting that correction silently misaligns every downstream text
//! extraction, so it lives here rather than in any caller.
//!
//! Rectangles come out as top-origin page fractions. The PDF character
//! layer uses a bottom-left origin; the extractor flips the character axis
//! (`1 - y / max_y`) so both sides compare in the same fraction space.

/// A normalized rectangle in page-fraction coordinates, top-left origin.
///
/// Invariant: `0 <= x <= x2 <= 1` and `0 <= y <= y2 <= 1`. Construction
/// through [`normalize_region`] clamps and orders the interval rather than
/// rejecting out-of-range input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormRect {
    pub x: f64,
    pub y: f64,
    pub x2: f64,
    pub y2: f64,
}

impl NormRect {
    /// True iff the point lies within the rectangle, boundaries included.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x <= x && x <= self.x2 && self.y <= y && y <= self.y2
    }
}

/// Scale a detector box back to rendered-image pixel space.
///
/// The detector downsamples its input when the longest image side exceeds
/// `input_cap`; boxes it reports are then in downsampled coordinates and
/// must be multiplied by `longest_side / input_cap`. Images at or below the
/// cap pass through unchanged.
#[must_use]
pub fn rescale_box(bbox: [f64; 4], image_width: u32, image_height: u32, input_cap: u32) -> [f64; 4] {
    let longest = f64::from(image_width.max(image_height));
    let cap = f64::from(input_cap);
    if longest <= cap || cap <= 0.0 {
        return bbox;
    }
    let scale = longest / cap;
    [
        bbox[0] * scale,
        bbox[1] * scale,
        bbox[2] * scale,
        bbox[3] * scale,
    ]
}

/// Convert a detector corner box into a normalized page rectangle.
///
/// Steps, in order:
/// 1. rescale to full image space when the detector ran downsampled
///    (see [`rescale_box`]);
/// 2. expand outward by `margin` pixels on all sides, compensating for
///    tight detector boxes that clip ascenders and descenders;
/// 3. divide by image width/height into page fractions;
/// 4. clamp into `[0, 1]` and order each interval.
///
/// There are no error conditions; degenerate images yield an empty
/// rectangle at the origin.
#[must_use]
pub fn normalize_region(
    bbox: [f64; 4],
    margin: f64,
    image_width: u32,
    image_height: u32,
    input_cap: u32,
) -> NormRect {
    if image_width == 0 || image_height == 0 {
        return NormRect {
            x: 0.0,
            y: 0.0,
            x2: 0.0,
            y2: 0.0,
        };
    }

    let [x0, y0, x1, y1] = rescale_box(bbox, image_width, image_height, input_cap);
    let w = f64::from(image_width);
    let h = f64::from(image_height);

    let x = ((x0 - margin) / w).clamp(0.0, 1.0);
    let y = ((y0 - margin) / h).clamp(0.0, 1.0);
    let x2 = ((x1 + margin) / w).clamp(0.0, 1.0);
    let y2 = ((y1 + margin) / h).clamp(0.0, 1.0);

    NormRect {
        x: x.min(x2),
        y: y.min(y2),
        x2: x.max(x2),
        y2: y.max(y2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_doubles_boxes_when_image_is_twice_the_cap() {
        // Longest side 2666 = 2x the 1333 cap, so every coordinate doubles.
        let out = rescale_box([10.0, 10.0, 20.0, 20.0], 2666, 2000, 1333);
        assert_eq!(out, [20.0, 20.0, 40.0, 40.0]);
    }

    #[test]
    fn rescale_is_identity_at_or_below_cap() {
        let bbox = [10.0, 10.0, 20.0, 20.0];
        assert_eq!(rescale_box(bbox, 1333, 1000, 1333), bbox);
        assert_eq!(rescale_box(bbox, 800, 600, 1333), bbox);
    }

    #[test]
    fn margin_expands_outward_on_all_sides() {
        // (50,50,100,100) with margin 10 becomes (40,40,110,110) before
        // division by the image dimensions.
        let rect = normalize_region([50.0, 50.0, 100.0, 100.0], 10.0, 1000, 1000, 1333);
        assert!((rect.x - 0.040).abs() < 1e-12);
        assert!((rect.y - 0.040).abs() < 1e-12);
        assert!((rect.x2 - 0.110).abs() < 1e-12);
        assert!((rect.y2 - 0.110).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_values_are_clamped_not_rejected() {
        // Box near the top-left corner: margin pushes it negative.
        let rect = normalize_region([2.0, 2.0, 999.0, 999.0], 10.0, 1000, 1000, 1333);
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 0.0);
        // Box past the bottom-right corner clamps to 1.
        let rect = normalize_region([900.0, 900.0, 1200.0, 1200.0], 10.0, 1000, 1000, 1333);
        assert_eq!(rect.x2, 1.0);
        assert_eq!(rect.y2, 1.0);
    }

    #[test]
    fn interval_is_ordered_after_adjustment() {
        // Inverted input corners still satisfy x <= x2, y <= y2.
        let rect = normalize_region([300.0, 300.0, 100.0, 100.0], 0.0, 1000, 1000, 1333);
        assert!(rect.x <= rect.x2);
        assert!(rect.y <= rect.y2);
    }

    #[test]
    fn rescale_applies_before_margin() {
        // With a 2x downsample, the 10px margin is applied after the box is
        // scaled back: (10,10,20,20) -> (20,20,40,40) -> (10,10,50,50).
        let rect = normalize_region([10.0, 10.0, 20.0, 20.0], 10.0, 2666, 2666, 1333);
        assert!((rect.x - 10.0 / 2666.0).abs() < 1e-12);
        assert!((rect.x2 - 50.0 / 2666.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_image_yields_empty_rect() {
        let rect = normalize_region([10.0, 10.0, 20.0, 20.0], 10.0, 0, 100, 1333);
        assert_eq!(rect.x, rect.x2);
        assert_eq!(rect.y, rect.y2);
    }

    #[test]
    fn contains_is_inclusive_on_boundaries() {
        let rect = NormRect {
            x: 0.1,
            y: 0.1,
            x2: 0.5,
            y2: 0.5,
        };
        assert!(rect.contains(0.1, 0.1));
        assert!(rect.contains(0.5, 0.5));
        assert!(rect.contains(0.3, 0.3));
        assert!(!rect.contains(0.0999, 0.3));
        assert!(!rect.contains(0.3, 0.5001));
    }
}
