//! Heading-aware segmentation with paragraph-boundary splitting and line overlap.

use std::path::Path;

use crate::chunk::Chunk;
use crate::config::ChunkerConfig;
use crate::error::{ChunkError, Result};
use crate::heading::{Section, find_headings, partition};

/// Default maximum document size accepted by [`MarkdownChunker::segment_file`]: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Splits markdown text into heading-scoped chunks.
///
/// Holds only validated parameters, so one instance can be shared across
/// threads and reused for any number of documents.
#[derive(Debug, Clone)]
pub struct MarkdownChunker {
    config: ChunkerConfig,
    max_file_size: u64,
}

impl Default for MarkdownChunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl MarkdownChunker {
    /// # Errors
    ///
    /// Returns `ChunkError::InvalidConfig` if `config.max_chunk_size` is zero.
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        })
    }

    /// Override the size limit used by [`Self::segment_file`].
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Segment `text` into chunks in document order.
    ///
    /// Every heading opens one flat section. Sections that trim to nothing are
    /// dropped; sections longer than `max_chunk_size` characters are split at
    /// blank lines, repeating the last `overlap_lines` lines of each sub-chunk
    /// at the start of the next.
    #[must_use]
    pub fn segment(&self, text: &str, source: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let sections = partition(&find_headings(&lines), lines.len());

        let mut chunks = Vec::new();
        for section in &sections {
            self.emit_section(&lines[section.start..section.end], section, source, &mut chunks);
        }

        tracing::debug!(
            source,
            lines = lines.len(),
            sections = sections.len(),
            chunks = chunks.len(),
            "segmented document"
        );
        chunks
    }

    /// Read a UTF-8 file and segment it, labelling chunks with the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid UTF-8, or is
    /// larger than the configured size limit.
    pub fn segment_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > self.max_file_size {
            return Err(ChunkError::FileTooLarge(meta.len()));
        }

        let text = std::fs::read_to_string(path)?;
        Ok(self.segment(&text, &path.display().to_string()))
    }

    fn emit_section(
        &self,
        lines: &[&str],
        section: &Section,
        source: &str,
        out: &mut Vec<Chunk>,
    ) {
        let joined = lines.join("\n");
        let content = joined.trim();
        if content.is_empty() {
            return;
        }

        if char_len(content) <= self.config.max_chunk_size {
            out.push(Chunk::new(
                content.to_owned(),
                source,
                &section.heading,
                section.level,
                section.start + 1,
                section.end,
            ));
            return;
        }

        tracing::trace!(
            source,
            heading = %section.heading,
            lines = lines.len(),
            "splitting oversized section"
        );
        self.split_section(lines, section, source, out);
    }

    /// Accumulate lines and flush at the first blank line past the size bound,
    /// or at the section's last line.
    fn split_section(
        &self,
        lines: &[&str],
        section: &Section,
        source: &str,
        out: &mut Vec<Chunk>,
    ) {
        let max = self.config.max_chunk_size;
        let last = lines.len().saturating_sub(1);

        let mut buffer: Vec<&str> = Vec::new();
        // joined length of `buffer`, separators included
        let mut buffer_chars = 0;
        let mut buffer_start = 0;

        for (i, &line) in lines.iter().enumerate() {
            if !buffer.is_empty() {
                buffer_chars += 1;
            }
            buffer_chars += char_len(line);
            buffer.push(line);

            let is_last = i == last;
            let is_paragraph_break = !is_last && line.trim().is_empty();
            if !is_last && !(is_paragraph_break && buffer_chars >= max) {
                continue;
            }

            let joined = buffer.join("\n");
            let content = joined.trim();
            if !content.is_empty() {
                out.push(Chunk::new(
                    content.to_owned(),
                    source,
                    &section.heading,
                    section.level,
                    section.start + buffer_start + 1,
                    section.start + i + 1,
                ));
            }

            if is_last {
                break;
            }

            let keep = self.config.overlap_lines.min(buffer.len());
            buffer.drain(..buffer.len() - keep);
            buffer_chars = joined_len(&buffer);
            buffer_start = i + 1 - buffer.len();
        }
    }
}

/// Segment `text` with explicit parameters.
///
/// # Errors
///
/// Returns `ChunkError::InvalidConfig` if `max_chunk_size` is zero; no text is
/// scanned in that case.
pub fn chunk_markdown(
    text: &str,
    source: &str,
    max_chunk_size: usize,
    overlap_lines: usize,
) -> Result<Vec<Chunk>> {
    let chunker = MarkdownChunker::new(ChunkerConfig {
        max_chunk_size,
        overlap_lines,
    })?;
    Ok(chunker.segment(text, source))
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn joined_len(lines: &[&str]) -> usize {
    lines.iter().map(|l| char_len(l)).sum::<usize>() + lines.len().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use insta::assert_snapshot;

    use super::*;

    fn chunker(max_chunk_size: usize, overlap_lines: usize) -> MarkdownChunker {
        MarkdownChunker::new(ChunkerConfig {
            max_chunk_size,
            overlap_lines,
        })
        .unwrap()
    }

    fn summarize(chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .map(|c| {
                format!(
                    "{}-{} h{} {:?}",
                    c.start_line(),
                    c.end_line(),
                    c.heading_level(),
                    c.heading()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn paragraphs_doc() -> String {
        let paragraphs: Vec<String> = (0..6).map(|i| format!("p{i} {}", "y".repeat(36))).collect();
        format!("# Doc\n\n{}", paragraphs.join("\n\n"))
    }

    #[test]
    fn heading_split_scenario() {
        let md = "# Title\n\nIntro.\n\n## A\n\nBody A.\n\n## B\n\nBody B.\n";
        let chunks = MarkdownChunker::default().segment(md, "notes.md");

        assert_snapshot!(summarize(&chunks), @r#"
        1-4 h1 "Title"
        5-8 h2 "A"
        9-12 h2 "B"
        "#);
        assert_eq!(chunks[0].content(), "# Title\n\nIntro.");
        assert_eq!(chunks[1].content(), "## A\n\nBody A.");
        assert_eq!(chunks[2].content(), "## B\n\nBody B.");
        assert_eq!(chunks[0].content_hash(), "5134baba899b5f49");
        assert_eq!(chunks[1].content_hash(), "83fed8a3f265eef2");
        assert_eq!(chunks[2].content_hash(), "6ac81bbf0ae6213f");
        assert!(chunks.iter().all(|c| c.source() == "notes.md"));
    }

    #[test]
    fn preamble_only() {
        let chunks = MarkdownChunker::default().segment("Just text.\n\nMore text.", "test.md");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].heading(), "");
        assert_eq!(chunks[0].heading_level(), 0);
        assert_eq!(chunks[0].line_range(), (1, 3));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(MarkdownChunker::default().segment("", "test.md").is_empty());
    }

    #[test]
    fn whitespace_only_input_yields_nothing() {
        assert!(MarkdownChunker::default().segment("  \n\n\t\n", "test.md").is_empty());
    }

    #[test]
    fn whitespace_preamble_dropped() {
        let chunks = MarkdownChunker::default().segment("\n\n# A\nbody", "x");
        assert_eq!(summarize(&chunks), "3-4 h1 \"A\"");
    }

    #[test]
    fn heading_only_sections_keep_heading_line() {
        let md = "# Empty\n## Also empty\n\n## Full\ntext\n";
        let chunks = MarkdownChunker::default().segment(md, "x");
        assert_snapshot!(summarize(&chunks), @r#"
        1-1 h1 "Empty"
        2-3 h2 "Also empty"
        4-6 h2 "Full"
        "#);
        assert_eq!(chunks[0].content(), "# Empty");
        assert_eq!(chunks[1].content(), "## Also empty");
    }

    #[test]
    fn malformed_headings_are_body_text() {
        let md = "intro\n\n# H\n\n#nospace\n#######  seven\n## \n\n###   Trim me   \nbody";
        let chunks = MarkdownChunker::default().segment(md, "x");
        assert_snapshot!(summarize(&chunks), @r#"
        1-2 h0 ""
        3-8 h1 "H"
        9-10 h3 "Trim me"
        "#);
        assert_eq!(chunks[1].content(), "# H\n\n#nospace\n#######  seven\n##");
        assert_eq!(chunks[2].content(), "###   Trim me   \nbody");
    }

    #[test]
    fn source_and_lines() {
        let chunks = MarkdownChunker::default().segment("# A\n\nline1\n\n# B\n\nline2", "doc.md");
        assert!(chunks.iter().all(|c| c.source() == "doc.md"));
        assert_eq!(summarize(&chunks), "1-4 h1 \"A\"\n5-7 h1 \"B\"");
    }

    #[test]
    fn oversized_section_split_with_overlap() {
        let chunks = chunker(100, 2).segment(&paragraphs_doc(), "s.md");
        let y = "y".repeat(36);

        assert_eq!(summarize(&chunks), "1-8 h1 \"Doc\"\n7-12 h1 \"Doc\"\n11-13 h1 \"Doc\"");
        assert_eq!(chunks[0].content(), format!("# Doc\n\np0 {y}\n\np1 {y}\n\np2 {y}"));
        assert_eq!(chunks[1].content(), format!("p2 {y}\n\np3 {y}\n\np4 {y}"));
        assert_eq!(chunks[2].content(), format!("p4 {y}\n\np5 {y}"));
    }

    #[test]
    fn oversized_section_split_without_overlap() {
        let chunks = chunker(100, 0).segment(&paragraphs_doc(), "s.md");
        let y = "y".repeat(36);

        assert_eq!(summarize(&chunks), "1-8 h1 \"Doc\"\n9-13 h1 \"Doc\"");
        assert_eq!(chunks[1].content(), format!("p3 {y}\n\np4 {y}\n\np5 {y}"));
    }

    #[test]
    fn oversized_scenario_keeps_heading() {
        let paragraphs: Vec<String> = (0..20)
            .map(|i| format!("Paragraph {i}. {}", "x".repeat(200)))
            .collect();
        let md = format!("# Big Section\n\n{}", paragraphs.join("\n\n"));
        let chunks = chunker(500, 2).segment(&md, "test.md");

        assert!(chunks.len() > 1);
        for c in &chunks {
            assert_eq!(c.heading(), "Big Section");
            assert_eq!(c.heading_level(), 1);
        }
    }

    #[test]
    fn long_line_becomes_its_own_chunk() {
        let long = "z".repeat(50);
        let md = format!("aaaaaaaaaaaa\n\n{long}\n\nb");
        let chunks = chunker(10, 0).segment(&md, "x");

        let contents: Vec<_> = chunks.iter().map(Chunk::content).collect();
        assert_eq!(contents, vec!["aaaaaaaaaaaa", long.as_str(), "b"]);
        assert_eq!(chunks[1].line_range(), (3, 4));
        assert_eq!(chunks[2].line_range(), (5, 5));
    }

    #[test]
    fn size_is_measured_in_characters() {
        let md = "# Ünïcödé\n\nåäö";
        assert!(md.len() > 14);
        let chunks = chunker(14, 2).segment(md, "x");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].line_range(), (1, 3));
    }

    #[test]
    fn crlf_headings_detected() {
        let chunks = MarkdownChunker::default().segment("# A\r\n\r\nbody\r\n", "x");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].heading(), "A");
        assert_eq!(chunks[0].content(), "# A\r\n\r\nbody");
    }

    #[test]
    fn content_hash_ignores_source() {
        let a = MarkdownChunker::default().segment("# Hello\n\nWorld", "a.md");
        let b = MarkdownChunker::default().segment("# Hello\n\nWorld", "b.md");
        assert_eq!(a[0].content_hash(), b[0].content_hash());
        assert_eq!(a[0].content_hash(), "ad6e0bf888da964a");
        assert_ne!(a[0].chunk_id("m"), b[0].chunk_id("m"));
    }

    #[test]
    fn zero_max_chunk_size_rejected_before_scanning() {
        let err = chunk_markdown("# A", "x", 0, 2).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidConfig(_)));
        assert!(MarkdownChunker::new(ChunkerConfig {
            max_chunk_size: 0,
            overlap_lines: 0,
        })
        .is_err());
    }

    #[test]
    fn chunk_markdown_matches_chunker() {
        let md = paragraphs_doc();
        let direct = chunk_markdown(&md, "s.md", 100, 2).unwrap();
        assert_eq!(direct, chunker(100, 2).segment(&md, "s.md"));
    }

    #[test]
    fn segment_file_uses_path_as_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "# Note\n\nremember this").unwrap();
        let chunks = MarkdownChunker::default().segment_file(file.path()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].source(), file.path().display().to_string());
    }

    #[test]
    fn segment_file_rejects_large_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", "x".repeat(64)).unwrap();
        let err = MarkdownChunker::default()
            .with_max_file_size(16)
            .segment_file(file.path())
            .unwrap_err();
        assert!(matches!(err, ChunkError::FileTooLarge(64)));
    }

    #[test]
    fn segment_file_missing_is_io_error() {
        let err = MarkdownChunker::default()
            .segment_file(Path::new("/nonexistent/memory.md"))
            .unwrap_err();
        assert!(matches!(err, ChunkError::Io(_)));
    }

    #[test]
    fn segment_file_rejects_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\xff\xfe").unwrap();
        let err = MarkdownChunker::default().segment_file(file.path()).unwrap_err();
        assert!(matches!(err, ChunkError::Io(_)));
    }

    #[test]
    fn joined_len_counts_separators() {
        assert_eq!(joined_len(&[]), 0);
        assert_eq!(joined_len(&["ab"]), 2);
        assert_eq!(joined_len(&["ab", "", "é"]), 5);
    }
}
