//! Static word list backing the text-repair heuristic.

use std::collections::HashSet;
use std::path::Path;

use crate::error::CoreError;

/// An immutable set of lowercase dictionary words.
///
/// Loaded once at startup and shared read-only across all workers for the
/// lifetime of the process. There is no implicit global; callers construct
/// one explicitly and pass it to [`crate::TextRepairer`].
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: HashSet<String>,
}

impl Vocabulary {
    /// Load a vocabulary from a newline-separated word list.
    ///
    /// Lines are trimmed and lowercased; empty lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::VocabularyLoad`] when the file cannot be read
    /// and [`CoreError::VocabularyEmpty`] when it yields no words. Both are
    /// fatal configuration errors.
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CoreError::VocabularyLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let vocab = Self::from_words(contents.lines());
        if vocab.is_empty() {
            return Err(CoreError::VocabularyEmpty {
                path: path.to_path_buf(),
            });
        }
        log::debug!("loaded {} vocabulary words from {}", vocab.len(), path.display());
        Ok(vocab)
    }

    /// Build a vocabulary from an iterator of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// True iff the lowercased form of `word` is a known dictionary word.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        if word.chars().any(char::is_uppercase) {
            self.words.contains(&word.to_lowercase())
        } else {
            self.words.contains(word)
        }
    }

    /// Number of words in the vocabulary.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True iff the vocabulary holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
