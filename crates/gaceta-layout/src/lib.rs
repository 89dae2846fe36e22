//! # gaceta-layout - Layout region detection
//!
//! The pipeline consumes layout detection through the narrow
//! [`LayoutDetector`] trait: one `detect` call per preprocessed page image,
//! yielding labeled corner boxes with confidence scores. The concrete
//! [`OnnxLayoutDetector`] adapter runs a pretrained object-detection model
//! through ONNX Runtime; nothing else in the pipeline depends on detector
//! internals.
//!
//! [`preprocess::preprocess_page`] applies the fixed filter chain
//! (grayscale, histogram equalization, Gaussian blur) every page image
//! goes through before detection.

pub mod detector;
pub mod device;
pub mod error;
pub mod onnx;
pub mod preprocess;

pub use detector::{Detection, DetectorFactory, LayoutDetector, DEFAULT_INPUT_CAP};
pub use device::Device;
pub use error::LayoutError;
pub use onnx::{OnnxDetectorConfig, OnnxLayoutDetector};
pub use preprocess::preprocess_page;
