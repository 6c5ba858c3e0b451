//! Source locations attached to tokens, syntax nodes and diagnostics.

use std::fmt;

/// A region of source text, identified by its starting line and column.
///
/// Lines and columns are 1-indexed; columns count bytes. `len` is the number
/// of bytes covered when the region fits on one line, and an approximation
/// otherwise.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// A zero-length span, used for end-of-file and synthesized nodes.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Extend this span so it also covers `other`.
    ///
    /// Spans on different lines keep the earlier start and sum the lengths.
    pub fn merge(self, other: Span) -> Span {
        let (first, second) = if (other.line, other.col) < (self.line, self.col) {
            (other, self)
        } else {
            (self, other)
        };

        if first.line == second.line {
            let end = (first.col + first.len).max(second.col + second.len);
            Span::new(first.line, first.col, end - first.col)
        } else {
            Span::new(first.line, first.col, first.len + second.len)
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line, self.col)
    }
}
