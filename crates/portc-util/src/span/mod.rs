//! Source location tracking: zero-based line/column positions and the
//! inclusive-begin/exclusive-end ranges built from them.
//!
//! # Examples
//!
//! ```
//! use portc_util::span::{Position, Range};
//!
//! let begin = Position::new(0, 0);
//! let end = Position::new(0, 5);
//! let range = Range::new(begin, end);
//! assert!(!range.is_empty());
//! ```

mod source_map;

pub use source_map::{SourceFile, SourceMap};

/// A unique identifier for a source file, assigned sequentially by the
/// [`SourceMap`] that owns it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

impl FileId {
    pub const DUMMY: FileId = FileId(0);
}

/// A zero-based line/column position. Columns reset to 0 on every `\n`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Advance this position past a single character, rolling the column
    /// back to 0 and bumping the line on `\n`.
    #[inline]
    pub fn advance(self, ch: char) -> Self {
        if ch == '\n' {
            Position::new(self.line + 1, 0)
        } else {
            Position::new(self.line, self.column + 1)
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Displayed one-based, matching editor conventions.
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// An inclusive-begin, exclusive-end pair of positions.
///
/// A range is "empty" when `begin >= end`; an empty range is rendered as
/// just its `begin` position (there is nothing to underline).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Range {
    pub begin: Position,
    pub end: Position,
}

impl Range {
    #[inline]
    pub const fn new(begin: Position, end: Position) -> Self {
        Self { begin, end }
    }

    /// A zero-width range at a single position.
    #[inline]
    pub const fn point(pos: Position) -> Self {
        Self { begin: pos, end: pos }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }

    /// Union of two ranges: the smallest range covering both.
    ///
    /// This is the operation the parser uses to compute a non-terminal's
    /// covering range from its children's ranges (§ invariant I1).
    #[inline]
    pub fn union(self, other: Range) -> Range {
        Range {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "{}", self.begin)
        } else {
            write!(f, "{}-{}", self.begin, self.end)
        }
    }
}
