//! Error types for layout detection.

use thiserror::Error;

/// Errors raised while loading or running the layout detector.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The detection model failed to load.
    ///
    /// Treated as a fatal configuration error: a worker that cannot bind
    /// its detector cannot process any document.
    #[error("failed to load layout model: {0}")]
    ModelLoad(String),

    /// Inference failed on one page image.
    #[error("layout inference failed: {0}")]
    Inference(String),

    /// The model produced outputs the adapter cannot interpret.
    #[error("unexpected model output: {0}")]
    OutputShape(String),

    /// The requested compute device could not be parsed or bound.
    #[error("invalid compute device: {0}")]
    Device(String),
}

impl From<ort::Error> for LayoutError {
    fn from(err: ort::Error) -> Self {
        Self::Inference(err.to_string())
    }
}
