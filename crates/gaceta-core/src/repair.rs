//! Recombining words erroneously split across extraction boundaries.
//!
//! Position-filtered extraction frequently splits a single word across two
//! adjacent regions or across a line-wrap boundary. The repairer merges two
//! adjacent tokens only when their concatenation is a known dictionary
//! word, which bounds false merges. The scan is greedy and non-backtracking:
//! once a merge is taken both tokens are consumed and cannot participate in
//! another merge.

use std::sync::Arc;

use crate::vocab::Vocabulary;

/// Minimum length of the leading token for a merge to fire.
const MIN_LEAD_LEN: usize = 2;
/// A merged word must be strictly longer than this.
const MIN_MERGED_LEN: usize = 4;

/// Post-processes extracted text against a shared vocabulary.
#[derive(Debug, Clone)]
pub struct TextRepairer {
    vocab: Arc<Vocabulary>,
}

impl TextRepairer {
    /// Create a repairer over an explicitly constructed vocabulary.
    #[must_use]
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    /// Clean up raw extracted text.
    ///
    /// Punctuation and underscores are stripped to spaces, the text is
    /// split into whitespace-separated tokens, and adjacent token pairs are
    /// merged when the combined form is a vocabulary word, the leading
    /// token has at least two characters and the combination more than
    /// four. The final token, if not consumed by a merge, is kept as-is.
    /// Output tokens are joined by single spaces.
    #[must_use]
    pub fn repair(&self, raw: &str) -> String {
        let stripped: String = raw
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        let tokens: Vec<&str> = stripped.split_whitespace().collect();

        let mut out: Vec<String> = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            if i + 1 < tokens.len() {
                let combined = format!("{}{}", tokens[i], tokens[i + 1]);
                if tokens[i].chars().count() >= MIN_LEAD_LEN
                    && combined.chars().count() > MIN_MERGED_LEN
                    && self.vocab.contains(&combined)
                {
                    out.push(combined);
                    i += 2;
                    continue;
                }
            }
            out.push(tokens[i].to_string());
            i += 1;
        }
        out.join(" ")
    }
}
