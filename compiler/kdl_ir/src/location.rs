//! Human-facing source positions.

use std::fmt;
use std::sync::Arc;

use crate::Span;

/// Where a lexeme was read from: file, 1-based line, 1-based column offset.
///
/// The file name is shared between every lexeme of a file.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Location {
    pub file: Arc<str>,
    pub line: u32,
    pub offset: u32,
    pub span: Span,
}

impl Location {
    pub fn new(file: Arc<str>, line: u32, offset: u32, span: Span) -> Self {
        Location {
            file,
            line,
            offset,
            span,
        }
    }

    /// Location for lexemes that do not originate from any file.
    pub fn synthesized() -> Self {
        Location {
            file: Arc::from("<synthesized>"),
            line: 0,
            offset: 0,
            span: Span::DUMMY,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        self.line == 0
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::synthesized()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.offset)
    }
}
