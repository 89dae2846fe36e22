//! ONNX Runtime adapter for the pretrained layout model.
//!
//! Wraps an exported object-detection model (boxes / labels / scores
//! outputs) behind the [`LayoutDetector`] trait. Boxes are returned in the
//! pixel space inference actually ran in; when the page image was larger
//! than [`OnnxDetectorConfig::max_input_size`] the caller is responsible
//! for the rescale correction (the geometry mapper does this).

// Image dimensions and coordinates are converted between usize (array
// indexing) and f32/u32 (model I/O). Precision loss is acceptable for
// dimensions < 10000.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use image::imageops::FilterType;
use image::GrayImage;
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::Session;

use crate::detector::{Detection, DetectorFactory, LayoutDetector, DEFAULT_INPUT_CAP};
use crate::device::Device;
use crate::error::LayoutError;

/// Default confidence threshold below which detections are dropped.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.8;

/// Region-type labels for the PRIMA layout model.
fn prima_label_map() -> BTreeMap<i64, String> {
    [
        (1, "TextRegion"),
        (2, "ImageRegion"),
        (3, "TableRegion"),
        (4, "MathsRegion"),
        (5, "SeparatorRegion"),
        (6, "OtherRegion"),
    ]
    .into_iter()
    .map(|(id, label)| (id, label.to_string()))
    .collect()
}

/// Configuration for [`OnnxLayoutDetector`].
///
/// Cloneable and shared read-only across folder workers; each worker binds
/// its own session from it (it doubles as the [`DetectorFactory`]).
#[derive(Debug, Clone)]
pub struct OnnxDetectorConfig {
    /// Path to the exported ONNX model.
    pub model_path: PathBuf,
    /// Class id to region-type label mapping.
    pub label_map: BTreeMap<i64, String>,
    /// Detections scoring below this are dropped.
    pub score_threshold: f32,
    /// Device the session is bound to.
    pub device: Device,
    /// Maximum input side length; larger images are downsampled before
    /// inference.
    pub max_input_size: u32,
}

impl OnnxDetectorConfig {
    /// Configuration with PRIMA labels and default thresholds.
    #[must_use]
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            label_map: prima_label_map(),
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            device: Device::Cpu,
            max_input_size: DEFAULT_INPUT_CAP,
        }
    }
}

impl DetectorFactory for OnnxDetectorConfig {
    fn create(&self) -> Result<Box<dyn LayoutDetector>, LayoutError> {
        Ok(Box::new(OnnxLayoutDetector::load(self.clone())?))
    }
}

/// Scale factor the input image is resized by before inference.
///
/// `1.0` when the longest side is at or below the cap.
fn input_scale(width: u32, height: u32, cap: u32) -> f32 {
    let longest = width.max(height).max(1);
    if longest <= cap {
        1.0
    } else {
        cap as f32 / longest as f32
    }
}

/// Flatten a grayscale image into a `[1, 3, H, W]` tensor, replicating the
/// gray channel and normalizing pixel values to `[0, 1]`.
fn image_to_chw(image: &GrayImage) -> (Vec<usize>, Vec<f32>) {
    let (width, height) = image.dimensions();
    let plane: Vec<f32> = image.pixels().map(|p| f32::from(p.0[0]) / 255.0).collect();
    let mut data = Vec::with_capacity(plane.len() * 3);
    for _ in 0..3 {
        data.extend_from_slice(&plane);
    }
    (vec![1, 3, height as usize, width as usize], data)
}

/// [`LayoutDetector`] backed by an ONNX Runtime session.
pub struct OnnxLayoutDetector {
    session: Session,
    config: OnnxDetectorConfig,
    output_names: Vec<String>,
}

impl OnnxLayoutDetector {
    /// Load the model and bind it to the configured device.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ModelLoad`] when the session cannot be
    /// created; this is fatal for the owning worker.
    pub fn load(config: OnnxDetectorConfig) -> Result<Self, LayoutError> {
        let num_threads = std::thread::available_parallelism()
            .map(|p| p.get() / 2)
            .unwrap_or(4)
            .clamp(1, 8);

        let session = match config.device {
            Device::Cpu => {
                log::debug!("creating layout session with CPU execution provider");
                Session::builder()
                    .and_then(|b| b.with_intra_threads(num_threads))
                    .and_then(|b| b.commit_from_file(&config.model_path))
            }
            Device::Cuda(index) => {
                log::debug!("creating layout session with CUDA execution provider (device {index})");
                Session::builder()
                    .and_then(|b| {
                        b.with_execution_providers([
                            CUDAExecutionProvider::default()
                                .with_device_id(index as i32)
                                .build(),
                            CPUExecutionProvider::default().build(),
                        ])
                    })
                    .and_then(|b| b.commit_from_file(&config.model_path))
            }
        }
        .map_err(|e| {
            LayoutError::ModelLoad(format!("{} ({})", e, config.model_path.display()))
        })?;

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        log::debug!(
            "loaded layout model on {}: outputs {:?}",
            config.device,
            output_names
        );

        Ok(Self {
            session,
            config,
            output_names,
        })
    }

    /// Pick the output tensor name for a role, falling back to position.
    fn output_name(&self, role: &str, position: usize) -> Result<&str, LayoutError> {
        if let Some(name) = self.output_names.iter().find(|n| n.contains(role)) {
            return Ok(name);
        }
        self.output_names
            .get(position)
            .map(String::as_str)
            .ok_or_else(|| {
                LayoutError::OutputShape(format!(
                    "model exposes {} outputs, no '{role}' tensor",
                    self.output_names.len()
                ))
            })
    }
}

impl LayoutDetector for OnnxLayoutDetector {
    fn detect(&mut self, image: &GrayImage) -> Result<Vec<Detection>, LayoutError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let scale = input_scale(width, height, self.config.max_input_size);
        let resized;
        let input = if scale < 1.0 {
            let new_w = ((width as f32 * scale).round() as u32).max(1);
            let new_h = ((height as f32 * scale).round() as u32).max(1);
            resized = image::imageops::resize(image, new_w, new_h, FilterType::Triangle);
            &resized
        } else {
            image
        };

        let (shape, data) = image_to_chw(input);
        let input_value = ort::value::Value::from_array((shape.as_slice(), data))?;

        let boxes_name = self.output_name("box", 0)?.to_string();
        let labels_name = self.output_name("label", 1)?.to_string();
        let scores_name = self.output_name("score", 2)?.to_string();

        let outputs = self.session.run(ort::inputs![input_value])?;
        let (boxes_shape, boxes) = outputs[boxes_name.as_str()].try_extract_tensor::<f32>()?;
        let (_, labels) = outputs[labels_name.as_str()].try_extract_tensor::<i64>()?;
        let (_, scores) = outputs[scores_name.as_str()].try_extract_tensor::<f32>()?;

        if boxes_shape.len() != 2 || boxes_shape[1] != 4 {
            return Err(LayoutError::OutputShape(format!(
                "expected boxes of shape [n, 4], got {boxes_shape:?}"
            )));
        }
        let count = boxes_shape[0] as usize;
        if labels.len() < count || scores.len() < count {
            return Err(LayoutError::OutputShape(format!(
                "boxes/labels/scores lengths disagree: {count}/{}/{}",
                labels.len(),
                scores.len()
            )));
        }

        let mut detections = Vec::new();
        for i in 0..count {
            let score = scores[i];
            if score < self.config.score_threshold {
                continue;
            }
            let class = labels[i];
            let label = self
                .config
                .label_map
                .get(&class)
                .cloned()
                .unwrap_or_else(|| format!("Class{class}"));
            detections.push(Detection {
                label,
                bbox: [
                    boxes[i * 4],
                    boxes[i * 4 + 1],
                    boxes[i * 4 + 2],
                    boxes[i * 4 + 3],
                ],
                score,
            });
        }
        log::debug!(
            "layout model returned {} detections above threshold {}",
            detections.len(),
            self.config.score_threshold
        );
        Ok(detections)
    }

    fn input_cap(&self) -> u32 {
        self.config.max_input_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_prima_labels() {
        let config = OnnxDetectorConfig::new(PathBuf::from("model.onnx"));
        assert_eq!(config.label_map.get(&1).unwrap(), "TextRegion");
        assert_eq!(config.label_map.get(&6).unwrap(), "OtherRegion");
        assert_eq!(config.score_threshold, DEFAULT_SCORE_THRESHOLD);
        assert_eq!(config.max_input_size, DEFAULT_INPUT_CAP);
        assert_eq!(config.device, Device::Cpu);
    }

    #[test]
    fn input_scale_shrinks_only_above_cap() {
        assert_eq!(input_scale(1000, 800, 1333), 1.0);
        assert_eq!(input_scale(1333, 1333, 1333), 1.0);
        let scale = input_scale(2666, 2000, 1333);
        assert!((scale - 0.5).abs() < 1e-6);
    }

    #[test]
    fn chw_tensor_replicates_gray_channel() {
        let mut image = GrayImage::new(2, 2);
        image.put_pixel(0, 0, image::Luma([255]));
        let (shape, data) = image_to_chw(&image);
        assert_eq!(shape, vec![1, 3, 2, 2]);
        assert_eq!(data.len(), 12);
        // Same plane three times, normalized to [0, 1].
        assert_eq!(data[0], 1.0);
        assert_eq!(data[4], 1.0);
        assert_eq!(data[8], 1.0);
        assert_eq!(data[1], 0.0);
    }
}
