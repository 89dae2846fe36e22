//! Per-document output records.
//!
//! One [`DocumentRecord`] is produced per input PDF and serialized to JSON
//! exactly once, after every page is fully populated. Partial records are
//! never flushed; a crash mid-document leaves no output file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A detected layout region on one page.
///
/// Created in detection order; the index of a region within its page never
/// changes after detection, and `text` is filled in-place by the extraction
/// stage regardless of extraction concurrency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    /// Region type label (e.g. `TextRegion`, `TableRegion`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Corner box `(x0, y0, x1, y1)` in detector pixel space.
    pub bbox: [i64; 4],
    /// Detector confidence score.
    #[serde(rename = "conf")]
    pub confidence: f64,
    /// Extracted (and repaired) text, absent when extraction was skipped
    /// or failed for this region.
    #[serde(rename = "ocr", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The full digitization result for one PDF document.
///
/// Pages are keyed by zero-based page index. The map is integer-keyed in
/// memory; `serde_json` renders the keys as strings only at the encoding
/// boundary, matching the on-disk schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Original file name, as found on disk.
    pub file: String,
    /// Full source path of the input document.
    pub path: String,
    /// Detected regions per page, in detection order.
    pub pages: BTreeMap<u32, Vec<RegionRecord>>,
}

impl DocumentRecord {
    /// Start an empty record for a document.
    #[must_use]
    pub fn new(file: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            path: path.into(),
            pages: BTreeMap::new(),
        }
    }
}
