//! Loading training text from disk.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Optional Unicode normalization applied to training text before it is
/// split. Merges themselves only ever see bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    #[default]
    None,
    Nfc,
}

impl Normalization {
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self {
            Normalization::None => Cow::Borrowed(text),
            Normalization::Nfc => Cow::Owned(text.nfc().collect()),
        }
    }
}

/// Read `path` as UTF-8 text, byte for byte. Line endings and a missing
/// final newline are left as they are.
///
/// Malformed UTF-8 is reported with the 1-based line holding the first bad
/// sequence.
pub fn load_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_utf8(bytes).map_err(|line| Error::Encoding {
        path: path.to_path_buf(),
        line,
    })
}

fn decode_utf8(bytes: Vec<u8>) -> std::result::Result<String, usize> {
    String::from_utf8(bytes).map_err(|e| {
        let valid = e.utf8_error().valid_up_to();
        let bytes = e.as_bytes();
        bytes[..valid].iter().filter(|&&b| b == b'\n').count() + 1
    })
}
