use std::{
    cmp::{max, min},
    fmt::Display,
    ops::{Index, Range},
};

/// Represents an area within source text.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Region {
    /// The beginning of the range, inclusive.
    pub begin: usize,
    /// The ending of the range, exclusive.
    pub end: usize,
}

impl Region {
    /// Create a new Region from the given range.
    pub fn new(position: Range<usize>) -> Self {
        Self {
            begin: position.start,
            end: position.end,
        }
    }

    /// Return true if this [`Region`] ends where the given `Region` begins,
    /// or this `Region` begins where the given `Region` ends.
    pub fn is_neighbor(&self, other: Self) -> bool {
        self.end == other.begin || other.end == self.begin
    }

    /// Combine will merge the indices of two [`Region`] instances.
    pub fn combine(self, other: Self) -> Self {
        Self {
            begin: min(self.begin, other.begin),
            end: max(self.end, other.end),
        }
    }

    /// Access the literal value of a [`Region`], or an empty string if the
    /// `Region` is out of bounds in the given source text.
    pub fn literal<'source>(&self, source: &'source str) -> &'source str {
        source.get(self.begin..self.end).unwrap_or_default()
    }
}

impl Index<Region> for str {
    type Output = str;

    fn index(&self, region: Region) -> &Self::Output {
        let Region { begin, end } = region;

        &self[begin..end]
    }
}

impl From<Range<usize>> for Region {
    fn from(value: Range<usize>) -> Self {
        Self {
            begin: value.start,
            end: value.end,
        }
    }
}

/// A one-indexed line and column within source text.
///
/// Compiled templates do not keep their source around, so any tree node that
/// may fail while rendering carries a `Position` resolved at compile time.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Create a new [`Position`].
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets within a source text to [`Position`] instances.
#[derive(Debug)]
pub struct Lines<'source> {
    source: &'source str,
    /// Byte offset where each line begins.
    starts: Vec<usize>,
}

impl<'source> Lines<'source> {
    /// Index the line breaks of the given source text.
    pub fn new(source: &'source str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self { source, starts }
    }

    /// Return the [`Position`] of the given byte offset.
    ///
    /// Columns are measured in display width, the same way a
    /// [`Pointer`][`crate::log::Pointer`] measures them.
    pub fn locate(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let prefix = self.source.get(self.starts[line]..offset).unwrap_or_default();

        Position::new(line + 1, unicode_width::UnicodeWidthStr::width(prefix) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_neighbor() {
        assert!(Region::new(0..5).is_neighbor(Region::new(5..10)));
        assert!(!Region::new(5..10).is_neighbor(Region::new(11..14)));
    }

    #[test]
    fn test_combine() {
        let combined = Region::new(5..10).combine(Region::new(8..15));

        assert_eq!(combined.begin, 5);
        assert_eq!(combined.end, 15);
    }

    #[test]
    fn test_literal() {
        let source = "Hello, Taylor!";
        let region = Region::new(7..13);

        assert_eq!(region.literal(source), "Taylor");
    }

    #[test]
    fn test_out_of_bounds_literal() {
        let source = "Hello, Taylor!";
        let region = Region::new(7..15);

        assert_eq!(region.literal(source), "");
    }

    #[test]
    fn test_locate() {
        let lines = Lines::new("one\ntwo\n\nfour");

        assert_eq!(lines.locate(0), Position::new(1, 1));
        assert_eq!(lines.locate(2), Position::new(1, 3));
        assert_eq!(lines.locate(4), Position::new(2, 1));
        assert_eq!(lines.locate(8), Position::new(3, 1));
        assert_eq!(lines.locate(11), Position::new(4, 3));
        assert_eq!(lines.locate(100), Position::new(4, 5));
    }
}
