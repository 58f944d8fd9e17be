//! Training configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::encoder::EncodeMode;
use crate::error::{Error, Result};
use crate::loader::Normalization;
use crate::splitter::DEFAULT_PATTERN;

/// Overrides the default split pattern when no pattern is configured.
pub const PATTERN_ENV: &str = "BYTEMERGE_PATTERN";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// Target vocabulary size, raw bytes included.
    pub vocab_size: usize,
    /// Chunk split pattern.
    pub pattern: String,
    pub normalization: Normalization,
    pub encode_mode: EncodeMode,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            vocab_size: 512,
            pattern: default_pattern(),
            normalization: Normalization::None,
            encode_mode: EncodeMode::GreedySweep,
        }
    }
}

fn default_pattern() -> String {
    std::env::var(PATTERN_ENV).unwrap_or_else(|_| DEFAULT_PATTERN.to_string())
}

impl TrainConfig {
    /// Load from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_vocab_size(mut self, size: usize) -> Self {
        self.vocab_size = size;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_encode_mode(mut self, mode: EncodeMode) -> Self {
        self.encode_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainConfig::default();
        assert_eq!(config.vocab_size, 512);
        assert_eq!(config.normalization, Normalization::None);
        assert_eq!(config.encode_mode, EncodeMode::GreedySweep);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            TrainConfig::from_json_str(r#"{"vocab_size": 300, "encode_mode": "rank_priority"}"#)
                .unwrap();
        assert_eq!(config.vocab_size, 300);
        assert_eq!(config.encode_mode, EncodeMode::RankPriority);
        assert_eq!(config.normalization, Normalization::None);
    }

    #[test]
    fn test_from_json_full() {
        let config = TrainConfig::from_json_str(
            r#"{"vocab_size": 1256, "pattern": " ?\\w+", "normalization": "nfc", "encode_mode": "greedy_sweep"}"#,
        )
        .unwrap();
        assert_eq!(config.pattern, r" ?\w+");
        assert_eq!(config.normalization, Normalization::Nfc);
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        assert!(matches!(
            TrainConfig::from_json_str(r#"{"vocabsize": 300}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.json");
        fs::write(&path, r#"{"vocab_size": 777}"#).unwrap();
        assert_eq!(TrainConfig::from_json_file(&path).unwrap().vocab_size, 777);
        assert!(matches!(
            TrainConfig::from_json_file(dir.path().join("missing.json")),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_builder() {
        let config = TrainConfig::default()
            .with_vocab_size(260)
            .with_pattern(r"\w+")
            .with_normalization(Normalization::Nfc)
            .with_encode_mode(EncodeMode::RankPriority);
        assert_eq!(config.vocab_size, 260);
        assert_eq!(config.pattern, r"\w+");
        assert_eq!(config.normalization, Normalization::Nfc);
        assert_eq!(config.encode_mode, EncodeMode::RankPriority);
    }
}
