//! Error types for the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while processing documents and folders.
///
/// Per-document and per-crop failures are recovered at their own boundary
/// (see `folder::run_job` and `crop_pool::dispatch`); only worker-setup
/// failures surface further.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// PDF rendering or parsing failed.
    #[error(transparent)]
    Pdf(#[from] gaceta_pdf::PdfError),

    /// Layout detection failed.
    #[error(transparent)]
    Layout(#[from] gaceta_layout::LayoutError),

    /// OCR failed.
    #[error(transparent)]
    Ocr(#[from] gaceta_ocr::OcrError),

    /// A source folder could not be scanned for documents.
    #[error("failed to scan {path}: {source}")]
    FolderScan {
        /// Folder that failed to scan
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A finished record could not be serialized.
    #[error("failed to serialize record for {path}: {source}")]
    Serialize {
        /// Output path the record was destined for
        path: PathBuf,
        /// Underlying serializer error
        source: serde_json::Error,
    },

    /// A finished record could not be written to disk.
    #[error("failed to write {path}: {source}")]
    OutputWrite {
        /// Output path that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A bounded worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    Pool(String),
}
