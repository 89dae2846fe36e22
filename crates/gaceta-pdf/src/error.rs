//! Error types for the PDF adapter.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while binding PDFium or reading a document.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The PDFium shared library could not be located or loaded.
    ///
    /// This is a fatal configuration error: nothing in the pipeline can
    /// run without a working PDFium binding.
    #[error("failed to bind PDFium library: {reason}")]
    LibraryBind {
        /// Description of the bind failure
        reason: String,
    },

    /// A document failed to open or parse.
    #[error("failed to open {path}: {reason}")]
    DocumentOpen {
        /// Path of the offending document
        path: PathBuf,
        /// Underlying PDFium error description
        reason: String,
    },

    /// A page failed to render or its text layer failed to parse.
    #[error("page {page_index} of {path}: {reason}")]
    Page {
        /// Path of the offending document
        path: PathBuf,
        /// Zero-based page index
        page_index: u32,
        /// Underlying PDFium error description
        reason: String,
    },
}
