//! Shared mock implementations of the pipeline's worker seams.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{GrayImage, RgbImage};
use gaceta_layout::{Detection, DetectorFactory, LayoutDetector, LayoutError};
use gaceta_ocr::{OcrEngine, OcrError};
use gaceta_pdf::{CharSpan, PageSource, PageSourceFactory, PdfError};

/// In-memory document source: every path resolves to the same preset
/// pages unless listed as failing.
#[derive(Clone)]
pub struct MockPageSource {
    /// One entry per page: its embedded text, laid out on a single line.
    pub page_texts: Vec<String>,
    /// Paths whose documents refuse to open.
    pub failing: HashSet<PathBuf>,
}

impl MockPageSource {
    pub fn with_pages(page_texts: Vec<&str>) -> Self {
        Self {
            page_texts: page_texts.into_iter().map(str::to_string).collect(),
            failing: HashSet::new(),
        }
    }

    fn check(&self, path: &Path) -> Result<(), PdfError> {
        if self.failing.contains(path) {
            return Err(PdfError::DocumentOpen {
                path: path.to_path_buf(),
                reason: "simulated open failure".to_string(),
            });
        }
        Ok(())
    }
}

impl PageSource for MockPageSource {
    fn render_pages(&self, path: &Path, _scale: f32) -> Result<Vec<RgbImage>, PdfError> {
        self.check(path)?;
        Ok(self
            .page_texts
            .iter()
            .map(|_| RgbImage::new(100, 100))
            .collect())
    }

    fn page_sizes(&self, path: &Path) -> Result<Vec<(f64, f64)>, PdfError> {
        self.check(path)?;
        Ok(vec![(100.0, 100.0); self.page_texts.len()])
    }

    fn char_spans(&self, path: &Path, page_index: u32) -> Result<Vec<CharSpan>, PdfError> {
        self.check(path)?;
        let text = self
            .page_texts
            .get(page_index as usize)
            .ok_or_else(|| PdfError::Page {
                path: path.to_path_buf(),
                page_index,
                reason: "page out of range".to_string(),
            })?;
        // One line across the page middle, left to right in stream order.
        Ok(text
            .chars()
            .enumerate()
            .map(|(i, ch)| CharSpan {
                ch,
                x: 5.0 + i as f64 * 5.0,
                y: 50.0,
            })
            .collect())
    }
}

/// Factory handing every worker a clone of the same mock source.
pub struct MockPageFactory(pub MockPageSource);

impl MockPageFactory {
    /// A single 100x100-point page carrying the given text layer.
    pub fn single_page_with_text(text: &str) -> Self {
        Self(MockPageSource::with_pages(vec![text]))
    }
}

impl PageSourceFactory for MockPageFactory {
    fn create(&self) -> Result<Box<dyn PageSource>, PdfError> {
        Ok(Box::new(self.0.clone()))
    }
}

/// Detector returning the same preset detections on every page, with a
/// shared call counter so tests can assert how much work actually ran.
pub struct MockDetector {
    detections: Vec<Detection>,
    calls: Arc<AtomicUsize>,
}

impl LayoutDetector for MockDetector {
    fn detect(&mut self, _image: &GrayImage) -> Result<Vec<Detection>, LayoutError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.detections.clone())
    }
}

pub struct MockDetectorFactory {
    detections: Vec<Detection>,
    calls: Arc<AtomicUsize>,
}

impl MockDetectorFactory {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Total `detect` invocations across every detector this factory made.
    pub fn detect_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DetectorFactory for MockDetectorFactory {
    fn create(&self) -> Result<Box<dyn LayoutDetector>, LayoutError> {
        Ok(Box::new(MockDetector {
            detections: self.detections.clone(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

/// OCR engine replaying a scripted sequence of results, one per crop.
pub struct MockOcr {
    script: std::vec::IntoIter<Result<String, String>>,
}

impl MockOcr {
    pub fn new(script: Vec<Result<String, String>>) -> Self {
        Self {
            script: script.into_iter(),
        }
    }
}

impl OcrEngine for MockOcr {
    fn image_to_text(&mut self, _crop: &GrayImage) -> Result<String, OcrError> {
        match self.script.next() {
            Some(result) => result.map_err(OcrError::Recognition),
            None => Err(OcrError::Recognition("script exhausted".to_string())),
        }
    }
}
