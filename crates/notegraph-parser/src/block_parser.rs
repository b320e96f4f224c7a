//! Line-oriented list-item parser

use crate::error::ParseError;
use crate::metadata::extract_tags;
use notegraph_core::ParsedBlock;
use std::path::Path;
use tracing::debug;

const LIST_MARKERS: [char; 3] = ['-', '*', '+'];

/// Blocks of one file, with their contents in the same order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    pub blocks: Vec<ParsedBlock>,
    pub contents: Vec<String>,
}

impl ParsedFile {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// `(content, tag)` pairs for every tag of every block
    pub fn tag_links(&self) -> Vec<(String, String)> {
        self.blocks
            .iter()
            .flat_map(|b| b.tags.iter().map(|t| (b.content.clone(), t.clone())))
            .collect()
    }
}

/// Parses list-item lines into leveled blocks.
///
/// A line is a block when, after leading whitespace, it starts with `-`, `*`
/// or `+` followed by whitespace. The level is the number of leading
/// whitespace characters divided by the indent width (a tab counts as one
/// character). Blocks with no text after the marker are skipped.
#[derive(Debug, Clone, Copy)]
pub struct BlockParser {
    indent_width: usize,
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new(4)
    }
}

impl BlockParser {
    pub fn new(indent_width: usize) -> Self {
        Self {
            indent_width: indent_width.max(1),
        }
    }

    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    pub fn parse(&self, text: &str) -> ParsedFile {
        let blocks: Vec<ParsedBlock> = text.lines().filter_map(|l| self.parse_line(l)).collect();
        let contents = blocks.iter().map(|b| b.content.clone()).collect();
        ParsedFile { blocks, contents }
    }

    /// Parse a single line, `None` for anything that is not a list item
    pub fn parse_line(&self, line: &str) -> Option<ParsedBlock> {
        let indent = line.chars().take_while(|c| c.is_whitespace()).count();
        let trimmed = line.trim_start();

        let mut chars = trimmed.chars();
        let marker = chars.next()?;
        if !LIST_MARKERS.contains(&marker) {
            return None;
        }
        let rest = chars.as_str();
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }

        let content = rest.trim();
        if content.is_empty() {
            return None;
        }

        Some(ParsedBlock {
            content: content.to_string(),
            level: indent / self.indent_width,
            tags: extract_tags(content),
        })
    }

    pub async fn parse_file(&self, path: &Path) -> Result<ParsedFile, ParseError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| ParseError::Encoding {
            path: path.to_path_buf(),
        })?;

        let parsed = self.parse(&text);
        debug!("Parsed {} blocks from {}", parsed.len(), path.display());
        Ok(parsed)
    }
}
