//! Markdown heading discovery and flat section partitioning.

use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

/// An ATX heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// 0-based line index.
    pub line: usize,
    /// Count of `#` markers, 1..=6.
    pub level: u8,
    /// Heading text, trimmed.
    pub title: String,
}

/// Half-open line range `[start, end)` opened by a heading, or the preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub start: usize,
    pub end: usize,
    /// Empty for the preamble.
    pub heading: String,
    /// 0 for the preamble.
    pub level: u8,
}

impl Section {
    #[must_use]
    pub fn is_preamble(&self) -> bool {
        self.level == 0
    }
}

/// Parse a single line as a heading.
///
/// Requires 1-6 `#`, at least one whitespace character, then a title that is
/// not blank after trimming. `#tag` and `##   ` are body text.
#[must_use]
pub fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let caps = HEADING_RE.captures(line)?;
    let title = caps.get(2)?.as_str().trim();
    if title.is_empty() {
        return None;
    }
    let level = u8::try_from(caps.get(1)?.as_str().len()).ok()?;
    Some((level, title))
}

/// Scan pre-split lines for headings in document order.
#[must_use]
pub fn find_headings(lines: &[&str]) -> Vec<Heading> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(line, text)| {
            parse_heading(text).map(|(level, title)| Heading {
                line,
                level,
                title: title.to_owned(),
            })
        })
        .collect()
}

/// Partition `[0, total_lines)` into contiguous sections.
///
/// Text before the first heading (or the whole document when there is no
/// heading) becomes a preamble section. Every heading opens exactly one
/// section regardless of level; deeper headings do not nest.
#[must_use]
pub fn partition(headings: &[Heading], total_lines: usize) -> Vec<Section> {
    let mut sections = Vec::with_capacity(headings.len() + 1);

    let first = headings.first().map_or(total_lines, |h| h.line);
    if first > 0 || headings.is_empty() {
        sections.push(Section {
            start: 0,
            end: first,
            heading: String::new(),
            level: 0,
        });
    }

    for (idx, heading) in headings.iter().enumerate() {
        let end = headings.get(idx + 1).map_or(total_lines, |next| next.line);
        sections.push(Section {
            start: heading.line,
            end,
            heading: heading.title.clone(),
            level: heading.level,
        });
    }

    sections
}
