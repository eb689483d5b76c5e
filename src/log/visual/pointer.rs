use std::{
    cmp::max,
    fmt::{Formatter, Result},
};

use super::{
    super::{RESET, YELLOW},
    {get_width, Visual, BLANK, EQUAL, HIGHLIGHT, PIPE},
};
use crate::region::{Lines, Position, Region};

/// A type of `Visual` that points to a specific location within source text.
#[derive(Debug, PartialEq)]
pub struct Pointer {
    /// The line that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    line: usize,
    /// The column that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    column: usize,
    /// The length of the object being highlighted.
    length: usize,
    /// The actual line of text that is being pointed to.
    text: String,
}

impl Pointer {
    /// Create a new Visual over the given source text and Region.
    pub fn new(source: &str, region: Region) -> Self {
        let Position { line, column } = Lines::new(source).locate(region.begin);
        let text = source
            .split('\n')
            .nth(line - 1)
            .unwrap_or_default()
            .trim_end_matches('\r')
            .to_string();

        // Only the part of the region on the first line is highlighted.
        let highlighted = region.literal(source).split('\n').next().unwrap_or_default();
        let length = max(1, get_width(highlighted));

        Self {
            line: line - 1,
            column: column - 1,
            length,
            text,
        }
    }

    /// Return the one-indexed [`Position`] that this Pointer points to.
    pub fn position(&self) -> Position {
        Position::new(self.line + 1, self.column + 1)
    }
}

impl Visual for Pointer {
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result {
        let num = (self.line + 1).to_string();
        let col = self.column + 1;
        let pad = get_width(&num);
        let align = self.column + self.length;

        let extra = "-".repeat(3_usize.saturating_sub(self.length));
        let name = template.unwrap_or("?");
        let text = &self.text;
        let underline = HIGHLIGHT.repeat(self.length);

        write!(
            formatter,
            "\n {BLANK:pad$}--> {name}:{num}:{col}\
             \n {BLANK:pad$} {PIPE}\
             \n {num:>} {PIPE} {text}\
             \n {BLANK:pad$} {PIPE} {YELLOW}{underline:>align$}{RESET}{extra}\
             \n {BLANK:pad$} {PIPE}\n",
        )?;

        if let Some(help) = help {
            writeln!(formatter, "{BLANK:pad$} {EQUAL} help: {help}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Pointer;
    use crate::region::{Position, Region};

    #[test]
    fn test_pointer_position() {
        let pointer = Pointer::new("first\n(( name", Region::new(6..8));

        assert_eq!(pointer.position(), Position::new(2, 1));
    }

    #[test]
    fn test_pointer_end_of_source() {
        let source = "hello (* if x";
        let pointer = Pointer::new(source, Region::new(source.len()..source.len()));

        assert_eq!(pointer.position(), Position::new(1, 14));
    }
}
