//! Per-document processing: render, detect, extract, write once.

use std::path::{Path, PathBuf};

use image::GrayImage;
use gaceta_core::geometry::{normalize_region, rescale_box};
use gaceta_core::{CropTask, DocumentRecord, RegionRecord, TextRepairer};
use gaceta_layout::{preprocess_page, Detection, LayoutDetector};
use gaceta_ocr::OcrEngine;
use gaceta_pdf::{extract_in_rect, PageSource, PageSourceFactory};

use crate::crop_pool;
use crate::error::PipelineError;

/// Extraction and rendering settings shared by every document of a run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Additive pixel margin expanding each region box outward,
    /// compensating for tight detector boxes.
    pub margin: f64,
    /// Page render scale factor (1.0 = 72 DPI).
    pub render_scale: f32,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            margin: 10.0,
            render_scale: 2.0,
        }
    }
}

/// What happened to one document.
#[derive(Debug, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// Output already existed; the document was not touched.
    Skipped,
    /// The record was written to this path.
    Written(PathBuf),
}

/// Converts one PDF into one JSON record.
///
/// Owned by a single folder worker; the detector and OCR engine are bound
/// per worker, while the page-source factory and repairer are the shared
/// read-only parts of the run.
pub struct DocumentProcessor<'a> {
    /// Page access for rendering, metadata and character streams.
    pub pages: &'a dyn PageSource,
    /// Factory for the stateless page sources crop-pool tasks bind.
    pub page_factory: &'a dyn PageSourceFactory,
    /// This worker's layout detector.
    pub detector: &'a mut dyn LayoutDetector,
    /// This worker's OCR engine; `Some` switches region text recovery
    /// from positional extraction to OCR in inline mode.
    pub ocr: Option<&'a mut dyn OcrEngine>,
    /// Shared text repairer.
    pub repairer: &'a TextRepairer,
    /// Run-wide settings.
    pub options: &'a ProcessOptions,
}

impl DocumentProcessor<'_> {
    /// Process one document end to end.
    ///
    /// Skips immediately when the output path already exists (idempotent
    /// resume). Otherwise renders every page, detects regions, recovers
    /// region text inline or through a crop pool of `crop_parallelism`
    /// workers, and serializes the fully populated record in one write.
    /// Partial results are never flushed.
    ///
    /// # Errors
    ///
    /// Any render, detection or extraction failure aborts this document
    /// only; the caller decides whether siblings continue.
    pub fn process(
        &mut self,
        path: &Path,
        output_folder: &Path,
        crop_parallelism: usize,
    ) -> Result<DocumentOutcome, PipelineError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out_path = output_folder.join(file_name.to_lowercase().replace(".pdf", ".json"));
        if out_path.exists() {
            log::debug!("{} already digitized, skipping", path.display());
            return Ok(DocumentOutcome::Skipped);
        }

        let images = self.pages.render_pages(path, self.options.render_scale)?;
        let sizes = self.pages.page_sizes(path)?;
        let mut record = DocumentRecord::new(file_name, path.to_string_lossy());

        for (page_index, image) in images.iter().enumerate() {
            let page_index = page_index as u32;
            let gray = preprocess_page(image);
            let detections = self.detector.detect(&gray)?;
            log::debug!(
                "page {page_index} of {}: {} regions",
                path.display(),
                detections.len()
            );

            let (page_w, page_h) = match sizes.get(page_index as usize) {
                Some(&dims) => dims,
                None => {
                    // Media box missing from the page metadata; derive the
                    // point dimensions from the rendered size instead.
                    log::warn!(
                        "no media box for page {page_index} of {}, deriving from render",
                        path.display()
                    );
                    let scale = f64::from(self.options.render_scale.max(f32::EPSILON));
                    (
                        f64::from(gray.width()) / scale,
                        f64::from(gray.height()) / scale,
                    )
                }
            };

            let cap = self.detector.input_cap();
            let mut regions: Vec<RegionRecord> = Vec::with_capacity(detections.len());
            let mut rects = Vec::with_capacity(detections.len());
            for detection in &detections {
                regions.push(RegionRecord {
                    kind: detection.label.clone(),
                    bbox: detection.bbox.map(|v| f64::from(v) as i64),
                    confidence: f64::from(detection.score),
                    text: None,
                });
                rects.push(normalize_region(
                    detection.bbox.map(f64::from),
                    self.options.margin,
                    gray.width(),
                    gray.height(),
                    cap,
                ));
            }

            if crop_parallelism > 0 {
                let tasks: Vec<CropTask> = rects
                    .iter()
                    .map(|rect| CropTask {
                        source_path: path.to_path_buf(),
                        page_index,
                        page_width: page_w,
                        page_height: page_h,
                        rect: *rect,
                    })
                    .collect();
                let results =
                    crop_pool::dispatch(&tasks, crop_parallelism, self.repairer, self.page_factory)?;
                for (region, text) in regions.iter_mut().zip(results) {
                    region.text = text;
                }
            } else if let Some(engine) = self.ocr.as_deref_mut() {
                for (index, region) in regions.iter_mut().enumerate() {
                    let crop =
                        crop_region(&gray, &detections[index], cap, self.options.margin);
                    match engine.image_to_text(&crop) {
                        Ok(raw) => region.text = Some(self.repairer.repair(&raw)),
                        // Per-crop failure: this region keeps no text, the
                        // rest of the page is unaffected.
                        Err(e) => log::warn!(
                            "OCR failed for region {index} on page {page_index} of {}: {e}",
                            path.display()
                        ),
                    }
                }
            } else {
                // The character layer is parsed once per page and reused
                // across all of its regions.
                let chars = self.pages.char_spans(path, page_index)?;
                for (region, rect) in regions.iter_mut().zip(&rects) {
                    let raw = extract_in_rect(&chars, page_w, page_h, rect);
                    region.text = Some(self.repairer.repair(&raw));
                }
            }

            record.pages.insert(page_index, regions);
        }

        let json = serde_json::to_string(&record).map_err(|source| PipelineError::Serialize {
            path: out_path.clone(),
            source,
        })?;
        std::fs::write(&out_path, json).map_err(|source| PipelineError::OutputWrite {
            path: out_path.clone(),
            source,
        })?;
        Ok(DocumentOutcome::Written(out_path))
    }
}

/// Cut a region's crop out of the preprocessed page image.
///
/// The detection box is rescaled to image space, expanded by the margin
/// and clamped to the image bounds; degenerate boxes collapse to a 1x1
/// crop rather than failing.
fn crop_region(gray: &GrayImage, detection: &Detection, cap: u32, margin: f64) -> GrayImage {
    let (width, height) = gray.dimensions();
    let bbox = rescale_box(detection.bbox.map(f64::from), width, height, cap);
    let x0 = (bbox[0] - margin)
        .max(0.0)
        .min(f64::from(width.saturating_sub(1))) as u32;
    let y0 = (bbox[1] - margin)
        .max(0.0)
        .min(f64::from(height.saturating_sub(1))) as u32;
    let x1 = (bbox[2] + margin).clamp(0.0, f64::from(width)) as u32;
    let y1 = (bbox[3] + margin).clamp(0.0, f64::from(height)) as u32;
    let w = x1.saturating_sub(x0).max(1);
    let h = y1.saturating_sub(y0).max(1);
    image::imageops::crop_imm(gray, x0, y0, w, h).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockDetectorFactory, MockOcr, MockPageFactory};
    use gaceta_core::Vocabulary;
    use gaceta_layout::DetectorFactory;
    use std::sync::Arc;

    fn repairer() -> TextRepairer {
        TextRepairer::new(Arc::new(Vocabulary::from_words(["informacion"])))
    }

    /// One 100x100 page whose character layer spells "infor macion" in a
    /// single line; one full-page detection.
    fn page_factory() -> MockPageFactory {
        MockPageFactory::single_page_with_text("infor macion")
    }

    fn full_page_detection() -> Detection {
        Detection {
            label: "TextRegion".to_string(),
            bbox: [0.0, 0.0, 100.0, 100.0],
            score: 0.91,
        }
    }

    #[test]
    fn skips_without_touching_detector_when_output_exists() {
        let out_dir = tempfile::tempdir().unwrap();
        std::fs::write(out_dir.path().join("gaceta_01.json"), "{}").unwrap();

        let pages = page_factory();
        let detectors = MockDetectorFactory::new(vec![full_page_detection()]);
        let mut detector = detectors.create().unwrap();
        let source = pages.0.clone();
        let repairer = repairer();
        let options = ProcessOptions::default();
        let mut processor = DocumentProcessor {
            pages: &source,
            page_factory: &pages,
            detector: detector.as_mut(),
            ocr: None,
            repairer: &repairer,
            options: &options,
        };

        let outcome = processor
            .process(Path::new("/in/GACETA_01.PDF"), out_dir.path(), 0)
            .unwrap();
        assert_eq!(outcome, DocumentOutcome::Skipped);
        assert_eq!(detectors.detect_calls(), 0);
        // The pre-existing output is never overwritten.
        let contents = std::fs::read_to_string(out_dir.path().join("gaceta_01.json")).unwrap();
        assert_eq!(contents, "{}");
    }

    #[test]
    fn inline_positional_extraction_populates_and_repairs_text() {
        let out_dir = tempfile::tempdir().unwrap();
        let pages = page_factory();
        let detectors = MockDetectorFactory::new(vec![full_page_detection()]);
        let mut detector = detectors.create().unwrap();
        let source = pages.0.clone();
        let repairer = repairer();
        let options = ProcessOptions::default();
        let mut processor = DocumentProcessor {
            pages: &source,
            page_factory: &pages,
            detector: detector.as_mut(),
            ocr: None,
            repairer: &repairer,
            options: &options,
        };

        let outcome = processor
            .process(Path::new("/in/Boletin.pdf"), out_dir.path(), 0)
            .unwrap();
        let DocumentOutcome::Written(out_path) = outcome else {
            panic!("expected a written record");
        };
        assert_eq!(out_path.file_name().unwrap(), "boletin.json");

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
        assert_eq!(json["file"], "Boletin.pdf");
        assert_eq!(json["path"], "/in/Boletin.pdf");
        let region = &json["pages"]["0"][0];
        assert_eq!(region["type"], "TextRegion");
        assert_eq!(region["ocr"], "informacion");
    }

    #[test]
    fn region_order_matches_detection_order() {
        let out_dir = tempfile::tempdir().unwrap();
        let pages = page_factory();
        let detections = vec![
            Detection {
                label: "TextRegion".to_string(),
                bbox: [0.0, 0.0, 50.0, 100.0],
                score: 0.95,
            },
            Detection {
                label: "ImageRegion".to_string(),
                bbox: [50.0, 0.0, 100.0, 100.0],
                score: 0.85,
            },
            Detection {
                label: "TableRegion".to_string(),
                bbox: [0.0, 50.0, 100.0, 100.0],
                score: 0.90,
            },
        ];
        let detectors = MockDetectorFactory::new(detections);
        let mut detector = detectors.create().unwrap();
        let source = pages.0.clone();
        let repairer = repairer();
        let options = ProcessOptions::default();
        let mut processor = DocumentProcessor {
            pages: &source,
            page_factory: &pages,
            detector: detector.as_mut(),
            ocr: None,
            repairer: &repairer,
            options: &options,
        };

        // Crop-pool mode: completion order is unspecified, final order
        // must still match detection order.
        let DocumentOutcome::Written(out_path) = processor
            .process(Path::new("/in/tres.pdf"), out_dir.path(), 3)
            .unwrap()
        else {
            panic!("expected a written record");
        };
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
        let kinds: Vec<&str> = json["pages"]["0"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["type"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, ["TextRegion", "ImageRegion", "TableRegion"]);
    }

    #[test]
    fn ocr_mode_uses_engine_and_isolates_per_crop_failures() {
        let out_dir = tempfile::tempdir().unwrap();
        let pages = page_factory();
        let detectors = MockDetectorFactory::new(vec![
            full_page_detection(),
            Detection {
                label: "OtherRegion".to_string(),
                bbox: [10.0, 10.0, 40.0, 40.0],
                score: 0.88,
            },
        ]);
        let mut detector = detectors.create().unwrap();
        let source = pages.0.clone();
        let repairer = repairer();
        let options = ProcessOptions::default();
        // Second crop fails; its region must keep text = None.
        let mut ocr = MockOcr::new(vec![Ok("infor macion".to_string()), Err("blurry".to_string())]);
        let mut processor = DocumentProcessor {
            pages: &source,
            page_factory: &pages,
            detector: detector.as_mut(),
            ocr: Some(&mut ocr),
            repairer: &repairer,
            options: &options,
        };

        let DocumentOutcome::Written(out_path) = processor
            .process(Path::new("/in/ocr.pdf"), out_dir.path(), 0)
            .unwrap()
        else {
            panic!("expected a written record");
        };
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
        let regions = json["pages"]["0"].as_array().unwrap();
        assert_eq!(regions[0]["ocr"], "informacion");
        assert!(regions[1].get("ocr").is_none());
    }

    #[test]
    fn crop_region_handles_zero_dimension_image() {
        let gray = GrayImage::new(0, 0);
        let detection = Detection {
            label: "TextRegion".to_string(),
            bbox: [0.0, 0.0, 10.0, 10.0],
            score: 0.9,
        };
        // Must not panic; the crop collapses instead of failing.
        let crop = crop_region(&gray, &detection, 1333, 10.0);
        assert!(crop.width() <= 1);
        assert!(crop.height() <= 1);
    }

    #[test]
    fn crop_region_clamps_to_image_bounds() {
        let gray = GrayImage::new(100, 80);
        let detection = Detection {
            label: "TextRegion".to_string(),
            bbox: [90.0, 70.0, 150.0, 120.0],
            score: 0.9,
        };
        let crop = crop_region(&gray, &detection, 1333, 10.0);
        assert!(crop.width() <= 100);
        assert!(crop.height() <= 80);
        assert!(crop.width() >= 1 && crop.height() >= 1);
    }
}
