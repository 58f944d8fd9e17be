//! Pattern-based chunking of training text.
//!
//! Each regex match becomes one chunk. Merges never cross chunk
//! boundaries, and text between matches belongs to no chunk.

use crate::error::{Error, Result};

/// GPT-4 style split pattern: contractions, letter runs with an optional
/// leading non-letter, 1-3 digit groups, punctuation runs and whitespace.
pub const DEFAULT_PATTERN: &str = r"'(?i:[sdmt]|ll|ve|re)|[^\r\n\p{L}\p{N}]?+\p{L}+|\p{N}{1,3}| ?[^\s\p{L}\p{N}]++[\r\n]*|\s*[\r\n]|\s+(?!\S)|\s+";

#[derive(Debug, Clone)]
pub struct ChunkSplitter {
    regex: fancy_regex::Regex,
}

impl ChunkSplitter {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = fancy_regex::Regex::new(pattern).map_err(Error::Pattern)?;
        Ok(ChunkSplitter { regex })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Matched chunks of `text`, in order. Empty matches are dropped.
    pub fn split<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut chunks = Vec::new();
        for m in self.regex.find_iter(text) {
            let m = m.map_err(Error::Split)?;
            if !m.as_str().is_empty() {
                chunks.push(m.as_str());
            }
        }
        Ok(chunks)
    }
}

impl Default for ChunkSplitter {
    fn default() -> Self {
        ChunkSplitter {
            regex: fancy_regex::Regex::new(DEFAULT_PATTERN).expect("invalid default pattern"),
        }
    }
}
