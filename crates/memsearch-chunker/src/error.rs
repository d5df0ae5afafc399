//! Error types for memsearch-chunker.

/// Errors raised before or around segmentation.
///
/// Segmentation itself is total over any input string; these only come from
/// configuration validation and the file/config loading helpers.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// Chunker parameters rejected at the boundary.
    #[error("invalid chunker config: {0}")]
    InvalidConfig(String),

    /// IO error reading a document or config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document exceeds the loader size limit.
    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    /// Malformed TOML in a config file.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type alias using `ChunkError`.
pub type Result<T> = std::result::Result<T, ChunkError>;
