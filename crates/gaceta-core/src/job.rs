//! Units of work for the two pool tiers.

use std::path::PathBuf;

use crate::geometry::NormRect;

/// One folder's worth of work, handed to a single folder-pool worker.
///
/// Created once before dispatch and owned exclusively by the worker that
/// receives it; a folder is never split across workers.
#[derive(Debug, Clone)]
pub struct Job {
    /// Folder containing the input PDFs (searched recursively).
    pub source_folder: PathBuf,
    /// Folder the per-document JSON records are written into.
    pub output_folder: PathBuf,
    /// Width of the per-page crop pool; `0` extracts inline.
    pub crop_parallelism: usize,
    /// Use the OCR engine instead of positional extraction.
    pub ocr_enabled: bool,
}

/// One region's text extraction, submitted to the crop pool.
///
/// Stateless and self-contained: a task carries everything needed to parse
/// the page's character layer and filter it by rectangle, so it is safe to
/// execute on any worker in any order.
#[derive(Debug, Clone)]
pub struct CropTask {
    /// Source PDF the region belongs to.
    pub source_path: PathBuf,
    /// Zero-based page index within the document.
    pub page_index: u32,
    /// Page media-box width in PDF points.
    pub page_width: f64,
    /// Page media-box height in PDF points.
    pub page_height: f64,
    /// Normalized region rectangle.
    pub rect: NormRect,
}
