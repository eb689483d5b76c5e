pub mod token;

mod state;

use crate::{
    compile::{lex::state::CursorState, Keyword, Operator},
    log::{expected_operator, Error, ErrorKind, INVALID_SYNTAX, UNCLOSED_TAG, UNEXPECTED_TOKEN},
    region::Region,
};

pub use token::Token;

use morel::Finder;

/// The next [`Token`] and [`Region`], or `None` when the source is exhausted.
pub type LexResult = Result<Option<(Token, Region)>, Error>;

/// The next [`Token`] and [`Region`], where running out of source is an error.
pub type LexResultMust = Result<(Token, Region), Error>;

/// Provides methods to read a source string as [`Token`] instances.
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Position within source.
    pub cursor: usize,
    /// Compiled [`Finder`] instance used to search for markers
    /// in the source text.
    finder: &'source Finder,
    /// Tracks the [`Lexer`] state and determines the action taken
    /// when `.next` is called.
    state: CursorState,
    /// When true, the following [`Token`] read while in
    /// [`CursorState::Default`] state will be left trimmed.
    left_trim: bool,
    /// Temporary storage for the a [`Token`] that will be read
    /// on the following call to `.next`
    buffer: Option<(Token, Region)>,
}

impl<'source> Lexer<'source> {
    /// Create a new [`Lexer`] from the given source and [`Finder`].
    #[inline]
    pub fn new(source: &'source str, finder: &'source Finder) -> Self {
        Self {
            finder,
            state: CursorState::Default,
            source,
            left_trim: false,
            cursor: 0,
            buffer: None,
        }
    }

    /// Return the next [`Token`] and [`Region`].
    ///
    /// Any instance of [`Token::Whitespace`] is ignored.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected [`Token`] is found, or the source
    /// ends while a tag is still open.
    pub fn next(&mut self) -> LexResult {
        loop {
            // Always prefer taking from the buffer when possible.
            if let Some(next) = self.buffer.take() {
                return Ok(Some(next));
            }
            if self.source[self.cursor..].is_empty() {
                return match self.state {
                    CursorState::Default => Ok(None),
                    CursorState::Inside {
                        end_token, opened, ..
                    } => Err(self.error_unclosed(end_token, opened)),
                };
            }

            let c = self.cursor;
            let result = match self.state {
                CursorState::Default => self.lex_default(c),
                CursorState::Inside {
                    end_token, depth, ..
                } => self.lex_tag(c, end_token, depth),
            }?;

            return match result {
                Some((Token::Whitespace, _)) => continue,
                other => Ok(other),
            };
        }
    }

    /// Return the next [`Token`] and [`Region`] in [`Tag`][`CursorState::Inside`]
    /// configuration.
    ///
    /// Assumes the cursor is inside of an expression or block.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected [`Token`] is found.
    fn lex_tag(&mut self, from: usize, end_token: Token, depth: usize) -> LexResult {
        if let Some((id, end)) = self.finder.starts(self.source, from) {
            let (token, is_trimmed) = Token::from_usize_trim(id);
            let closing = matches!(token, Token::EndExpression | Token::EndBlock);

            if token == end_token && depth == 0 {
                self.state = CursorState::Default;
                self.left_trim = is_trimmed;
                self.cursor = end;

                return Ok(Some((token, (from..end).into())));
            }
            if !closing || depth == 0 {
                let which = if end_token == Token::EndExpression {
                    "expression"
                } else {
                    "block"
                };

                return Err(Error::new(ErrorKind::Lex, UNEXPECTED_TOKEN)
                    .with_pointer(self.source, from..end)
                    .with_help(format!("did you close the previous {which}?")));
            }
            // A closing marker while parentheses are open is read as punctuation.
        }

        let mut advance = |length: usize, data: Token| {
            self.cursor += length;

            Ok(Some((data, (from..from + length).into())))
        };

        let mut iterator = self.source[from..]
            .char_indices()
            .map(|(d, c)| (from + d, c));
        let Some((index, char)) = iterator.next() else {
            return Ok(None);
        };

        match char {
            '*' => advance(1, Token::Operator(Operator::Multiply)),
            '+' => advance(1, Token::Operator(Operator::Add)),
            '/' => advance(1, Token::Operator(Operator::Divide)),
            '-' => advance(1, Token::Operator(Operator::Subtract)),
            '%' => advance(1, Token::Operator(Operator::Modulo)),
            '.' => advance(1, Token::Period),
            ',' => advance(1, Token::Comma),
            ':' => advance(1, Token::Colon),
            '(' | '[' => {
                self.set_depth(depth + 1);
                let token = if char == '(' {
                    Token::LeftParen
                } else {
                    Token::LeftBracket
                };
                self.cursor += 1;

                Ok(Some((token, (from..from + 1).into())))
            }
            ')' | ']' => {
                self.set_depth(depth.saturating_sub(1));
                let token = if char == ')' {
                    Token::RightParen
                } else {
                    Token::RightBracket
                };
                self.cursor += 1;

                Ok(Some((token, (from..from + 1).into())))
            }
            '"' | '\'' => self.lex_string(iterator, index, char),
            '=' | '!' | '>' | '<' | '|' | '&' => self.lex_operator(iterator, index, char),
            c if c.is_whitespace() => Ok(Some(self.lex_whitespace(iterator, index))),
            c if c.is_ascii_digit() => Ok(Some(self.lex_digit(iterator, index))),
            c if is_ident_start(c) => Ok(Some(self.lex_ident_or_keyword(iterator, index))),
            _ => Err(Error::new(ErrorKind::Lex, UNEXPECTED_TOKEN)
                .with_pointer(self.source, index..index + char.len_utf8())
                .with_help(
                    "expected an operator, punctuation, an identifier, \
                    an ascii digit, or beginning of a string literal marked with `\"`",
                )),
        }
    }

    /// Update the parenthesis depth of the open tag.
    fn set_depth(&mut self, value: usize) {
        if let CursorState::Inside { ref mut depth, .. } = self.state {
            *depth = value;
        }
    }

    /// Return a [`Token`] and [`Region`] based on the previous character.
    ///
    /// Checks the next character via `.next` to ensure the correct `Token` is
    /// returned. All of these are recognized:
    ///
    /// `==`, `!=`, `>=`, `<=`, `||`, `&&`, `=`, `|`, `!`, `>`, `<`
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when an unexpected [`Token`] is found.
    fn lex_operator<T>(&mut self, mut iter: T, from: usize, previous: char) -> LexResult
    where
        T: Iterator<Item = (usize, char)>,
    {
        let (position, token) = match (previous, iter.next()) {
            // Double:
            ('=', Some((usize, '='))) => (usize, Token::Operator(Operator::Equal)),
            ('!', Some((usize, '='))) => (usize, Token::Operator(Operator::NotEqual)),
            ('>', Some((usize, '='))) => (usize, Token::Operator(Operator::GreaterOrEqual)),
            ('<', Some((usize, '='))) => (usize, Token::Operator(Operator::LesserOrEqual)),
            ('|', Some((usize, '|'))) => (usize, Token::Or),
            ('&', Some((usize, '&'))) => (usize, Token::And),
            // Single:
            ('=', _) => (from, Token::Assign),
            ('|', _) => (from, Token::Pipe),
            ('!', _) => (from, Token::Exclamation),
            ('>', _) => (from, Token::Operator(Operator::Greater)),
            ('<', _) => (from, Token::Operator(Operator::Lesser)),
            _ => {
                return Err(Error::new(ErrorKind::Lex, UNEXPECTED_TOKEN)
                    .with_pointer(self.source, from..from + 1)
                    .with_help(expected_operator(previous)));
            }
        };
        let position = position + 1;
        self.cursor = position;

        Ok(Some((token, (from..position).into())))
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::Number`].
    fn lex_digit<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        loop {
            match iter.next() {
                Some((index, char)) if !is_number(char) => {
                    self.cursor = index;

                    break (Token::Number, (from..index).into());
                }
                Some((_, _)) => continue,
                None => {
                    self.cursor = self.source.len();

                    break (Token::Number, (from..self.source.len()).into());
                }
            }
        }
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::Whitespace`].
    fn lex_whitespace<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        loop {
            match iter.next() {
                Some((index, char)) if !char.is_whitespace() => {
                    self.cursor = index;

                    break (Token::Whitespace, (from..index).into());
                }
                Some((_, _)) => continue,
                None => {
                    self.cursor = self.source.len();

                    break (Token::Whitespace, (from..self.source.len()).into());
                }
            }
        }
    }

    /// Return a [`Token`] and [`Region`] containing [`Token::String`] using
    /// the given iterator.
    ///
    /// The string ends at the first unescaped `quote` character.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source ends before the string does.
    fn lex_string<T>(&mut self, mut iter: T, from: usize, quote: char) -> LexResult
    where
        T: Iterator<Item = (usize, char)>,
    {
        let mut escaped = false;
        loop {
            match iter.next() {
                Some((index, char)) if char == quote && !escaped => {
                    // Add one to the index of the character to comply with string slice
                    // semantics.
                    let to = index + 1;
                    self.cursor = to;

                    return Ok(Some((Token::String, (from..to).into())));
                }
                Some((_, char)) => escaped = char == '\\' && !escaped,
                None => {
                    return Err(Error::new(ErrorKind::Lex, INVALID_SYNTAX)
                        .with_pointer(self.source, from..from + 1)
                        .with_help(format!(
                            "this might be an undelimited string, try closing it with `{quote}`"
                        )));
                }
            }
        }
    }

    /// Return a [`Token`] and [`Region`] from the given iterator.
    ///
    /// The `Token` will be [`Token::Identifier`], [`Token::Keyword`] or one of
    /// the literal words `true`, `false` and `none`.
    fn lex_ident_or_keyword<T>(&mut self, mut iter: T, from: usize) -> (Token, Region)
    where
        T: Iterator<Item = (usize, char)>,
    {
        let mut check_keyword = |to: usize| {
            let range_text = &self.source[from..to];

            let token = match range_text {
                "true" => Token::True,
                "false" => Token::False,
                "none" => Token::None,
                text => Keyword::from_ident(text)
                    .map(Token::Keyword)
                    .unwrap_or(Token::Identifier),
            };
            self.cursor = to;

            (token, (from..to).into())
        };

        loop {
            match iter.next() {
                Some((index, char)) if !is_ident_continue(char) => {
                    break check_keyword(index);
                }
                Some((_, _)) => continue,
                None => break check_keyword(self.source.len()),
            }
        }
    }

    /// Return the next [`Token`] and [`Region`] in [`Tag`][`CursorState::Default`]
    /// configuration.
    ///
    /// Assumes the cursor is outside of an expression. Closing markers found
    /// here are literal text.
    fn lex_default(&mut self, from: usize) -> LexResult {
        let mut search = from;

        loop {
            match self.finder.next(self.source, search) {
                Some((id, marker_begin, marker_end)) => {
                    let (token, is_trimmed) = Token::from_usize_trim(id);
                    let end_token = match token {
                        Token::BeginExpression => Token::EndExpression,
                        Token::BeginBlock => Token::EndBlock,
                        _ => {
                            search = marker_end;
                            continue;
                        }
                    };

                    let region: Region = (marker_begin..marker_end).into();
                    self.state = CursorState::Inside {
                        end_token,
                        opened: region,
                        depth: 0,
                    };
                    self.cursor = marker_end;

                    if from == marker_begin {
                        self.left_trim = false;

                        return Ok(Some((token, region)));
                    }

                    self.buffer = Some((token, region));

                    return Ok(Some(self.trim_region(from, marker_begin, is_trimmed)));
                }
                None => {
                    let end = self.source.len();
                    self.cursor = end;

                    return Ok(Some(self.trim_region(from, end, false)));
                }
            }
        }
    }

    /// Return a [`Token::Raw`] over the given range, trimmed on the left when the
    /// previous tag asked for it and on the right when the next tag does.
    fn trim_region(&mut self, begin: usize, end: usize, right_trim: bool) -> (Token, Region) {
        let mut region_begin = begin;
        let mut region_end = end;

        if right_trim {
            region_end = begin + self.source[begin..end].trim_end().len();
        }
        if self.left_trim {
            self.left_trim = false;
            let s = &self.source[region_begin..region_end];
            region_begin = region_begin + s.len() - s.trim_start().len()
        }

        (Token::Raw, (region_begin..region_end).into())
    }

    /// Return an [`Error`] describing a tag that is still open at the end of the source.
    fn error_unclosed(&self, end_token: Token, opened: Region) -> Error {
        let (which, close) = if end_token == Token::EndExpression {
            ("expression", "end expression marker")
        } else {
            ("block", "end block marker")
        };

        Error::new(ErrorKind::Lex, UNCLOSED_TAG)
            .with_pointer(self.source, opened)
            .with_help(format!(
                "this {which} is never closed, did you forget the {close}?"
            ))
    }
}

/// Return true if the given character is a recognized beginning identifier,
/// meaning '_' or an `xid_start`.
fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Return true if the given character is a recognized continue identifier,
/// meaning an `xid_continue`.
fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// Return true if the given character is a number (0-9) or a period.
fn is_number(c: char) -> bool {
    matches!(c, '0'..='9' | '.')
}

#[cfg(test)]
mod tests {
    use crate::{
        compile::{
            lex::{state::CursorState, Token},
            Builder, Keyword, Operator,
        },
        log::{Error, ErrorKind},
        region::{Position, Region},
    };

    use super::Lexer;

    use morel::Finder;

    #[test]
    fn test_lex_default_no_match() {
        let expect = vec![(Token::Raw, 0..11)];

        helper_lex_next_auto("lorem ipsum", expect)
    }

    #[test]
    fn test_lex_default_match_no_trim() {
        let expect = vec![
            (Token::Raw, 0..12),
            (Token::BeginExpression, 12..14),
            (Token::Identifier, 15..20),
            (Token::EndExpression, 21..23),
        ];

        helper_lex_next_auto("lorem ipsum (( dolor ))", expect);
    }

    #[test]
    fn test_lex_default_match_trim() {
        let expect = vec![
            (Token::Raw, 0..11),
            (Token::BeginExpression, 12..15),
            (Token::Identifier, 16..21),
            (Token::EndExpression, 22..25),
            (Token::Raw, 27..30),
        ];

        helper_lex_next_auto("lorem ipsum ((- dolor -))  sit", expect);
    }

    #[test]
    fn test_lex_state_change() -> Result<(), Error> {
        let finder = Finder::new(Builder::new().to_syntax());
        let mut block_lexer = Lexer::new("lorem (*", &finder);
        let mut expression_lexer = Lexer::new("lorem ((", &finder);
        block_lexer.next()?;
        expression_lexer.next()?;

        assert_eq!(
            block_lexer.state,
            CursorState::Inside {
                end_token: Token::EndBlock,
                opened: Region::new(6..8),
                depth: 0,
            }
        );
        assert_eq!(
            expression_lexer.state,
            CursorState::Inside {
                end_token: Token::EndExpression,
                opened: Region::new(6..8),
                depth: 0,
            }
        );

        Ok(())
    }

    #[test]
    fn test_lex_digit() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::Number, 3..5),
            (Token::EndExpression, 6..8),
        ];

        helper_lex_next_auto("(( 10 ))", expect);
    }

    #[test]
    fn test_lex_ident() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::Identifier, 3..8),
            (Token::EndExpression, 9..11),
        ];

        helper_lex_next_auto("(( hello ))", expect);
    }

    #[test]
    fn test_lex_keyword() {
        let expect = vec![
            (Token::BeginBlock, 0..2),
            (Token::Keyword(Keyword::If), 3..5),
            (Token::True, 6..10),
            (Token::EndBlock, 11..13),
        ];

        helper_lex_next_auto("(* if true *)", expect);
    }

    #[test]
    fn test_lex_set_and_let_are_one_keyword() {
        let expect = vec![
            (Token::BeginBlock, 0..2),
            (Token::Keyword(Keyword::Let), 3..6),
            (Token::Identifier, 7..8),
            (Token::Assign, 9..10),
            (Token::Number, 11..12),
            (Token::EndBlock, 13..15),
        ];

        helper_lex_next_auto("(* set a = 1 *)", expect);
    }

    #[test]
    fn test_lex_string_escape() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::String, 3..13),
            (Token::EndExpression, 14..16),
        ];

        helper_lex_next_auto(r#"(( "\"name\"" ))"#, expect);
    }

    #[test]
    fn test_lex_single_quoted_string() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::String, 3..9),
            (Token::EndExpression, 10..12),
        ];

        helper_lex_next_auto("(( 'name' ))", expect);
    }

    #[test]
    fn test_lex_nested_call_does_not_close() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::Identifier, 3..4),
            (Token::LeftParen, 4..5),
            (Token::Identifier, 5..6),
            (Token::LeftParen, 6..7),
            (Token::Identifier, 7..8),
            (Token::RightParen, 8..9),
            (Token::RightParen, 9..10),
            (Token::EndExpression, 11..13),
        ];

        helper_lex_next_auto("(( f(g(x)) ))", expect);
    }

    #[test]
    fn test_lex_operators() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::Identifier, 3..4),
            (Token::Operator(Operator::GreaterOrEqual), 5..7),
            (Token::Number, 8..9),
            (Token::And, 10..12),
            (Token::Exclamation, 13..14),
            (Token::Identifier, 14..15),
            (Token::Pipe, 16..17),
            (Token::Identifier, 18..23),
            (Token::EndExpression, 24..26),
        ];

        helper_lex_next_auto("(( a >= 1 && !b | upper ))", expect);
    }

    #[test]
    fn test_lex_closing_marker_is_raw() {
        let expect = vec![(Token::Raw, 0..14)];

        helper_lex_next_auto("f(g(x)) *) end", expect);
    }

    #[test]
    fn test_lex_string() {
        let expect = vec![
            (Token::BeginExpression, 0..2),
            (Token::String, 3..9),
            (Token::EndExpression, 10..12),
        ];

        helper_lex_next_auto("(( \"name\" ))", expect);
    }

    #[test]
    fn test_error_multiple_opening_tags() {
        let expect = vec![
            (Token::Raw, 0..6),
            (Token::BeginExpression, 6..8),
            (Token::Identifier, 9..13),
        ];

        let finder = Finder::new(Builder::new().to_syntax());
        let mut lexer = Lexer::new("hello (( name (( ))", &finder);
        for (token, range) in expect {
            assert_eq!(lexer.next(), Ok(Some((token, range.into()))))
        }

        assert!(lexer.next().is_err())
    }

    #[test]
    fn test_error_unclosed_block() {
        let finder = Finder::new(Builder::new().to_syntax());
        let mut lexer = Lexer::new("line one\nhello (* if name", &finder);
        let error = loop {
            match lexer.next() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("lexer should not finish with an open block"),
                Err(error) => break error,
            }
        };

        assert_eq!(error.kind(), ErrorKind::Lex);
        assert_eq!(error.position(), Some(Position::new(2, 7)));
    }

    #[test]
    fn test_error_unterminated_string() {
        let finder = Finder::new(Builder::new().to_syntax());
        let mut lexer = Lexer::new("(( \"name ))", &finder);
        assert!(lexer.next().is_ok());

        let error = lexer.next().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Lex);
    }

    #[test]
    fn test_custom_syntax() {
        let finder = Finder::new(
            Builder::new()
                .with_expression("{{", "}}")
                .with_block("{%", "%}")
                .to_syntax(),
        );
        let mut lexer = Lexer::new("a {{ b }}", &finder);

        assert_eq!(lexer.next(), Ok(Some((Token::Raw, (0..2).into()))));
        assert_eq!(lexer.next(), Ok(Some((Token::BeginExpression, (2..4).into()))));
        assert_eq!(lexer.next(), Ok(Some((Token::Identifier, (5..6).into()))));
        assert_eq!(lexer.next(), Ok(Some((Token::EndExpression, (7..9).into()))));
        assert_eq!(lexer.next(), Ok(None));
    }

    /// Helper function which takes in a source string, creates a lexer on that
    /// string and iterates [expect.len()] amount of times and compares the result
    /// against [lexer.next()].
    fn helper_lex_next_auto<T>(source: &str, expect: Vec<(Token, T)>)
    where
        T: Into<Region>,
    {
        let finder = Finder::new(Builder::new().to_syntax());
        let mut lexer = Lexer::new(source, &finder);
        for (token, region) in expect {
            assert_eq!(lexer.next(), Ok(Some((token, region.into()))))
        }

        assert_eq!(lexer.next(), Ok(None));
        assert_eq!(lexer.next(), Ok(None));
        assert_eq!(lexer.next(), Ok(None));
    }
}
