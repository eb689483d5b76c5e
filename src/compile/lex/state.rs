use crate::{compile::lex::Token, region::Region};

/// Describes the internal state of a [`Lexer`][`super::Lexer`].
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CursorState {
    /// Indicates the [`Lexer`][`super::Lexer`] is not inside of a block
    /// or expression.
    Default,
    /// Indicates the [`Lexer`][`super::Lexer`] is inside of a block or
    /// expression.
    Inside {
        /// The expected ending [`Token`].
        end_token: Token,
        /// [`Region`] of the marker that opened the tag.
        opened: Region,
        /// Number of parentheses and brackets left open within the tag.
        ///
        /// Closing markers are not recognized while this is above zero,
        /// so `(( f(g(x)) ))` closes after the call.
        depth: usize,
    },
}
