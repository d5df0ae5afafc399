//! Chunker configuration: TOML file, env overrides, validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChunkError, Result};

/// Default soft bound on trimmed chunk length, in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1500;

/// Default number of trailing lines repeated into the next sub-chunk.
pub const DEFAULT_OVERLAP_LINES: usize = 2;

fn default_max_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

fn default_overlap_lines() -> usize {
    DEFAULT_OVERLAP_LINES
}

/// Segmenter tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkerConfig {
    /// Soft bound on trimmed chunk length in characters; checked only at
    /// paragraph breaks and section ends.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
    /// Trailing lines carried into the next sub-chunk of an oversized section.
    #[serde(default = "default_overlap_lines")]
    pub overlap_lines: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            overlap_lines: DEFAULT_OVERLAP_LINES,
        }
    }
}

impl ChunkerConfig {
    /// Reject parameters the segmenter cannot honor.
    ///
    /// # Errors
    ///
    /// Returns `ChunkError::InvalidConfig` if `max_chunk_size` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(ChunkError::InvalidConfig(
                "max_chunk_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document, without env overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or the values are invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = Self::parse(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Keys live under `[chunker]` when that table exists, otherwise at top
    /// level. Only the matching shape is deserialized.
    fn parse(content: &str) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(content)?;
        let config: Self = match table.remove("chunker") {
            Some(chunker) => chunker.try_into()?,
            None => table.try_into()?,
        };
        Ok(config)
    }

    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the resulting values are invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MEMSEARCH_MAX_CHUNK_SIZE") {
            match v.parse::<usize>() {
                Ok(size) => self.max_chunk_size = size,
                Err(_) => tracing::warn!("ignoring invalid MEMSEARCH_MAX_CHUNK_SIZE value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("MEMSEARCH_OVERLAP_LINES") {
            match v.parse::<usize>() {
                Ok(lines) => self.overlap_lines = lines,
                Err(_) => tracing::warn!("ignoring invalid MEMSEARCH_OVERLAP_LINES value: {v}"),
            }
        }
    }
}
