//! Parse Utilities
//!
//! Source locations and bounded excerpts used in diagnostics

use serde::Serialize;

use crate::chars;
use crate::error::ScriptError;

/// Default bound for source excerpts embedded in error messages
pub const DEFAULT_MAX_EXCERPT_LENGTH: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ParseLocation {
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    /// Compute the 1-based line and column of a byte offset
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = clamp_to_boundary(source, offset);
        let mut line = 1;
        let mut col = 1;
        for ch in source[..offset].chars() {
            if ch == chars::LF {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        ParseLocation { offset, line, col }
    }
}

impl std::fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

fn clamp_to_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Up to `max` characters of `source` starting at `offset`, with an ellipsis when truncated
pub fn excerpt(source: &str, offset: usize, max: usize) -> String {
    let rest = &source[clamp_to_boundary(source, offset)..];
    let mut chars = rest.char_indices();
    match chars.nth(max) {
        Some((end, _)) => format!("{}...", &rest[..end]),
        None => rest.to_string(),
    }
}

/// Build a syntax error pointing at `offset` in `source`
pub fn syntax_error(source: &str, offset: usize, max: usize, message: &str) -> ScriptError {
    let location = ParseLocation::from_offset(source, offset);
    ScriptError::syntax(
        format!("{} at {}", message, location),
        excerpt(source, offset, max),
    )
}
