//! File positions attached to diagnostics.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position inside a source file as reported by the checking engine.
///
/// `line` and `column` are zero-based, the way engines compute them from a
/// byte offset. [`Display`](fmt::Display) renders them 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// The file the diagnostic points into.
    pub file: Utf8PathBuf,
    /// Zero-based line.
    pub line: u32,
    /// Zero-based column.
    pub column: u32,
}

impl Location {
    /// Creates a location from zero-based coordinates.
    pub fn new(file: impl Into<Utf8PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Resolves a byte offset within `content` to a zero-based location.
    ///
    /// Offsets past the end clamp to the end. An offset inside a multi-byte
    /// character resolves to the start of that character.
    pub fn from_offset(file: impl Into<Utf8PathBuf>, content: &str, offset: usize) -> Self {
        let mut offset = offset.min(content.len());
        while !content.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &content[..offset];
        let line = before.matches('\n').count() as u32;
        let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
        let column = before[line_start..].chars().count() as u32;
        Self::new(file, line, column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({},{})", self.file, self.line + 1, self.column + 1)
    }
}
