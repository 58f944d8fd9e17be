//! Error types for training, encoding and decoding.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Pair, Symbol};

#[derive(Debug, Error)]
pub enum Error {
    /// Requested vocabulary cannot even hold the raw bytes.
    #[error("vocab_size must be at least 256, got {vocab_size}")]
    InvalidConfiguration { vocab_size: usize },

    /// The chunk pattern failed to compile.
    #[error("invalid chunk pattern: {0}")]
    Pattern(#[source] fancy_regex::Error),

    /// The regex engine gave up while splitting (e.g. backtracking limit).
    #[error("chunk split failed: {0}")]
    Split(#[source] fancy_regex::Error),

    #[error("index {index} out of range for stream of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Symbol id with no decode dictionary entry.
    #[error("unknown symbol id: {0}")]
    UnknownSymbol(Symbol),

    /// The pair already has a merge.
    #[error("pair {0} is already merged")]
    DuplicateMerge(Pair),

    /// A merge that would refer to its own symbol or a later one.
    #[error("merge {pair} -> {symbol} refers to a symbol not yet defined")]
    UndefinedMergeSymbol { pair: Pair, symbol: Symbol },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input text is not well-formed UTF-8.
    #[error("invalid utf-8 in {} at line {line}", path.display())]
    Encoding { path: PathBuf, line: usize },

    /// Decoded bytes are not valid UTF-8.
    #[error("invalid UTF-8 in decoded bytes: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("invalid configuration file: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
