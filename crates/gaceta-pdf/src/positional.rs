//! Position-filtered extraction over a page's character layer.

use gaceta_core::geometry::NormRect;

use crate::source::CharSpan;

/// Return the text of every character whose normalized position lies
/// within `rect`, in original stream order.
///
/// Character positions are in the page's native bottom-left space and are
/// normalized against the media-box dimensions with the vertical axis
/// flipped (`1 - y / page_height`), putting them in the same top-origin
/// fraction space as the rectangle. Inclusion is boundary-inclusive.
///
/// Order is intentionally preserved even though the filter is positional:
/// reading order within a text line is monotonic in the underlying stream.
/// Pure function, safe for concurrent and repeated invocation.
#[must_use]
pub fn extract_in_rect(
    chars: &[CharSpan],
    page_width: f64,
    page_height: f64,
    rect: &NormRect,
) -> String {
    if page_width <= 0.0 || page_height <= 0.0 {
        return String::new();
    }
    let mut text = String::new();
    for span in chars {
        let fx = span.x / page_width;
        let fy = 1.0 - span.y / page_height;
        if rect.contains(fx, fy) {
            text.push(span.ch);
        }
    }
    text
}
