//! The detection seam consumed by the pipeline.

use image::GrayImage;

use crate::error::LayoutError;

/// Default maximum input side length for the detection model.
///
/// Images whose longest side exceeds this are downsampled before
/// inference; the geometry mapper scales boxes back by the same ratio.
pub const DEFAULT_INPUT_CAP: u32 = 1333;

/// One detected layout region, in detector pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Region type label (e.g. `TextRegion`).
    pub label: String,
    /// Corner box `(x0, y0, x1, y1)` in the pixel space the detector ran
    /// inference on.
    pub bbox: [f32; 4],
    /// Confidence score in `[0, 1]`.
    pub score: f32,
}

/// Narrow interface over the pretrained layout model.
///
/// The pipeline calls `detect` once per preprocessed page image and treats
/// the result as an ordered sequence; region indices are fixed from this
/// point on.
pub trait LayoutDetector: Send {
    /// Detect layout regions on one page image.
    fn detect(&mut self, image: &GrayImage) -> Result<Vec<Detection>, LayoutError>;

    /// The model's maximum input side length, used for box rescaling.
    fn input_cap(&self) -> u32 {
        DEFAULT_INPUT_CAP
    }
}

/// Creates a detector per pool worker.
///
/// Detector configuration is shared read-only across folder workers; each
/// worker binds its own session to its own compute device before use, so
/// there is never concurrent mutation of a session.
pub trait DetectorFactory: Sync {
    /// Bind a fresh detector for the calling worker.
    fn create(&self) -> Result<Box<dyn LayoutDetector>, LayoutError>;
}
