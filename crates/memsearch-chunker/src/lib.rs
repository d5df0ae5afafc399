//! Heading-aware markdown chunking for memory search indexes.
//!
//! A document is split into flat heading sections; sections larger than the
//! configured bound are split again at blank lines with a few lines of overlap.
//! Each chunk carries a content hash and can produce a composite identifier
//! that stays stable across runs, processes and platforms.

pub mod chunk;
pub mod config;
pub mod error;
pub mod heading;
pub mod segmenter;

pub use chunk::{CHUNK_ID_SCHEME, Chunk, HASH_PREFIX_LEN, compute_chunk_id, content_hash};
pub use config::{ChunkerConfig, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_OVERLAP_LINES};
pub use error::{ChunkError, Result};
pub use heading::{Heading, Section, find_headings, parse_heading, partition};
pub use segmenter::{DEFAULT_MAX_FILE_SIZE, MarkdownChunker, chunk_markdown};
