//! # gaceta-core - Data model and text utilities
//!
//! Core building blocks shared by every stage of the gaceta digitization
//! pipeline:
//!
//! - **Records** ([`DocumentRecord`], [`RegionRecord`]): the per-document
//!   JSON output schema, one record per input PDF.
//! - **Geometry** ([`geometry::normalize_region`], [`NormRect`]): mapping
//!   detector pixel boxes into normalized page-fraction rectangles.
//! - **Vocabulary + repair** ([`Vocabulary`], [`TextRepairer`]): the
//!   dictionary-backed heuristic that mends words split across extraction
//!   boundaries.
//! - **Jobs** ([`Job`], [`CropTask`]): the units of work handed to the
//!   folder pool and the crop pool respectively.
//!
//! This crate deliberately has no PDF, ML or OCR dependencies; those live
//! behind the seams in `gaceta-pdf`, `gaceta-layout` and `gaceta-ocr`.

pub mod error;
pub mod geometry;
pub mod job;
pub mod record;
pub mod repair;
pub mod vocab;

pub use error::CoreError;
pub use geometry::NormRect;
pub use job::{CropTask, Job};
pub use record::{DocumentRecord, RegionRecord};
pub use repair::TextRepairer;
pub use vocab::Vocabulary;
