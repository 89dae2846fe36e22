//! Error types for gaceta-core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by core components.
///
/// Everything in this enum is a configuration-time failure: the pipeline
/// treats these as fatal and refuses to start folder work.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The vocabulary word list could not be read.
    #[error("failed to load vocabulary from {path}: {source}")]
    VocabularyLoad {
        /// Path that was attempted
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The vocabulary file was read but contained no usable words.
    #[error("vocabulary at {path} is empty")]
    VocabularyEmpty {
        /// Path that was loaded
        path: PathBuf,
    },
}
