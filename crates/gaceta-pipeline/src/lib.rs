//! # gaceta-pipeline - Batch document digitization
//!
//! Orchestrates the conversion of folders of scanned PDFs into per-document
//! JSON layout records. Two independent, independently sized worker-pool
//! tiers coexist by configuration:
//!
//! - the **folder pool** ([`folder::run`]) distributes whole folders across
//!   a bounded pool; one folder is never split across workers;
//! - the **crop pool** ([`crop_pool::dispatch`]) distributes one page's
//!   region-extraction tasks across a second bounded pool, collecting
//!   results into index-stable slots.
//!
//! In between, the [`document::DocumentProcessor`] renders pages, invokes
//! layout detection, recovers region text (positional or OCR) and writes
//! each record exactly once. Documents whose output already exists are
//! skipped, which makes interrupted batch runs safely restartable.
//!
//! Failure domains: a crop failure costs one region's text, a document
//! failure costs one document, and only configuration errors (vocabulary,
//! model, PDFium) abort the run.

pub mod crop_pool;
pub mod document;
pub mod error;
pub mod folder;

#[cfg(test)]
pub(crate) mod testutil;

pub use document::{DocumentOutcome, DocumentProcessor, ProcessOptions};
pub use error::PipelineError;
pub use folder::{run, run_with_observer, JobSummary, RunContext, RunSummary};
