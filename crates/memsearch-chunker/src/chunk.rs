//! Chunk value type and content-derived identity.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from a SHA-256 digest.
pub const HASH_PREFIX_LEN: usize = 16;

/// Leading tag of the composite chunk identifier.
pub const CHUNK_ID_SCHEME: &str = "markdown";

/// One heading-scoped span of a markdown document.
///
/// Built once by the segmenter and never mutated. `content_hash` depends on
/// `content` alone, so identical text from different files hashes equally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    content: String,
    source: String,
    heading: String,
    heading_level: u8,
    start_line: usize,
    end_line: usize,
    content_hash: String,
}

impl Chunk {
    pub(crate) fn new(
        content: String,
        source: &str,
        heading: &str,
        heading_level: u8,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        debug_assert!(!content.trim().is_empty());
        debug_assert!(start_line >= 1 && start_line <= end_line);
        debug_assert_eq!(heading_level == 0, heading.is_empty());

        Self {
            content_hash: content_hash(&content),
            content,
            source: source.to_owned(),
            heading: heading.to_owned(),
            heading_level,
            start_line,
            end_line,
        }
    }

    /// Trimmed chunk text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Nearest heading title, empty for preamble chunks.
    #[must_use]
    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Number of `#` markers of the enclosing heading, 0 for preamble.
    #[must_use]
    pub fn heading_level(&self) -> u8 {
        self.heading_level
    }

    /// First line covered, 1-based inclusive.
    #[must_use]
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// Last line covered, 1-based inclusive.
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.end_line
    }

    #[must_use]
    pub fn line_range(&self) -> (usize, usize) {
        (self.start_line, self.end_line)
    }

    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// True when the chunk precedes every heading of its document.
    #[must_use]
    pub fn is_preamble(&self) -> bool {
        self.heading_level == 0
    }

    /// Composite identifier of this chunk under an embedding `model`.
    #[must_use]
    pub fn chunk_id(&self, model: &str) -> String {
        compute_chunk_id(
            &self.source,
            self.start_line,
            self.end_line,
            &self.content_hash,
            model,
        )
    }
}

/// Truncated SHA-256 of `content` as lowercase hex.
#[must_use]
pub fn content_hash(content: &str) -> String {
    sha256_prefix(content.as_bytes())
}

/// Stable external key for a chunk.
///
/// Hashes `markdown:{source}:{start_line}:{end_line}:{content_hash}:{model}`.
/// Any change to an argument, `model` included, yields a different id, which
/// lets an index invalidate entries per embedding model.
#[must_use]
pub fn compute_chunk_id(
    source: &str,
    start_line: usize,
    end_line: usize,
    content_hash: &str,
    model: &str,
) -> String {
    let raw = format!("{CHUNK_ID_SCHEME}:{source}:{start_line}:{end_line}:{content_hash}:{model}");
    sha256_prefix(raw.as_bytes())
}

fn sha256_prefix(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..HASH_PREFIX_LEN / 2])
}
