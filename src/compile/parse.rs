//! Brim parser.
//!
//! Utilizes a Lexer to receive instances of Region, which it uses to construct
//! a new Template containing the Abstract Syntax Tree.
//!
//! This template can be combined with some Store data to produce output.
pub mod scope;
pub mod tree;

mod expression;
mod state;

use crate::{
    compile::{
        lex::{token::Token, LexResult, LexResultMust, Lexer},
        parse::{
            state::{BlockKind, BlockState},
            tree::{For, If, Link, LoopVariables, Output, Set, Tree, While},
        },
        Keyword, Parameter, Scope, Template,
    },
    log::{
        error_eof, expected_keyword, Error, ErrorKind, INVALID_SYNTAX, UNCLOSED_BLOCK,
        UNEXPECTED_BLOCK, UNEXPECTED_TOKEN,
    },
    region::{Lines, Position, Region},
};
use morel::Finder;
use std::{collections::HashMap, mem};

pub struct Parser<'source> {
    /// Lexer used to pull from source as tokens instead of raw text.
    lexer: Lexer<'source>,
    /// Line index of the source, used to resolve positions.
    lines: Lines<'source>,
    /// Store peeked tokens.
    ///
    /// Double option is used to remember when the next token is None.
    buffer: Option<Option<(Token, Region)>>,
    /// Blocks that are open, innermost last.
    states: Vec<BlockState>,
    /// The [`Scope`] currently being filled.
    scope: Scope,
    /// Bodies of the blocks closed so far.
    blocks: HashMap<String, Scope>,
    /// Target of the `extends` statement.
    extends: Option<Link>,
    /// Parameters declared with `with`.
    parameters: Option<Vec<Parameter>>,
    /// Every `include` seen so far.
    includes: Vec<Link>,
    /// True once anything other than leading whitespace, `extends` or
    /// `with` has been seen.
    content: bool,
}

impl<'source> Parser<'source> {
    /// Create a new Parser from the given string and [`Finder`].
    #[inline]
    pub fn new(source: &'source str, finder: &'source Finder) -> Self {
        Self {
            lexer: Lexer::new(source, finder),
            lines: Lines::new(source),
            buffer: None,
            states: vec![],
            scope: Scope::new(),
            blocks: HashMap::new(),
            extends: None,
            parameters: None,
            includes: vec![],
            content: false,
        }
    }

    /// Compile the template.
    ///
    /// Returns a new Template, which can be executed with some Store
    /// data to receive output.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] describing the first problem found in the source.
    pub fn compile(mut self, name: Option<&str>) -> Result<Template, Error> {
        while let Some(next) = self.next()? {
            match next {
                (Token::Raw, region) => {
                    let text = &self.lexer.source[region];
                    if !text.is_empty() {
                        self.push(Tree::Raw(text.to_owned()));
                    }
                }
                (Token::BeginExpression, _) => {
                    let raw = if self.next_is(Token::Colon)? {
                        self.next_must(Token::Colon)?;
                        true
                    } else {
                        false
                    };
                    let expression = self.parse_expression()?;
                    self.next_must(Token::EndExpression)?;

                    self.push(Tree::Output(Output { expression, raw }));
                }
                (Token::BeginBlock, _) => self.parse_block()?,
                (_, region) => {
                    return Err(Error::new(ErrorKind::Parse, UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region))
                }
            }
        }

        if let Some(state) = self.states.last() {
            let block = state.kind.keyword();

            return Err(Error::new(ErrorKind::Parse, UNCLOSED_BLOCK)
                .with_pointer(self.lexer.source, state.region)
                .with_help(format!(
                    "did you close the `{block}` block with an `end` block?"
                )));
        }

        Ok(Template {
            name: name.map(str::to_owned),
            scope: self.scope,
            blocks: self.blocks,
            parameters: self.parameters.unwrap_or_default(),
            extends: self.extends,
            includes: self.includes,
            ..Default::default()
        })
    }

    /// Add the [`Tree`] to the current [`Scope`].
    fn push(&mut self, tree: Tree) {
        let blank = matches!(&tree, Tree::Raw(text) if text.trim().is_empty());
        if !blank {
            self.content = true;
        }

        self.scope.data.push(tree);
    }

    /// Open a new block, the following trees are added to its body.
    fn open(&mut self, kind: BlockKind, region: Region) {
        self.content = true;

        let parent = mem::take(&mut self.scope);
        self.states.push(BlockState {
            kind,
            parent,
            region,
        });
    }

    /// Parse a block.
    ///
    /// A block holds a statement, which may open or close a nested [`Scope`],
    /// or declare something about the template.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the statement is malformed or out of place.
    fn parse_block(&mut self) -> Result<(), Error> {
        // from
        // |
        // (* if name == "taylor" *)
        //   Welcome back, Taylor.
        // (* end *)
        //          |
        //          to
        let (keyword, region) = self.parse_keyword()?;

        match keyword {
            Keyword::If => {
                let condition = self.parse_expression()?;
                self.open(
                    BlockKind::If {
                        branches: vec![],
                        condition: Some(condition),
                    },
                    region,
                );
            }
            Keyword::Elif => {
                let condition = self.parse_expression()?;
                self.parse_elif(condition, region)?;
            }
            Keyword::Else => {
                if self.next_is(Token::Keyword(Keyword::If))? {
                    let (_, if_region) = self.next_must(Token::Keyword(Keyword::If))?;
                    let condition = self.parse_expression()?;
                    self.parse_elif(condition, region.combine(if_region))?;
                } else {
                    self.parse_else(region)?;
                }
            }
            Keyword::For => {
                let variables = self.parse_loop_variables()?;
                self.next_must(Token::Keyword(Keyword::In))?;
                let iterable = self.parse_expression()?;
                let position = self.locate(region);

                self.open(
                    BlockKind::For {
                        variables,
                        iterable,
                        position,
                    },
                    region,
                );
            }
            Keyword::While => {
                let condition = self.parse_expression()?;
                self.open(BlockKind::While { condition }, region);
            }
            Keyword::Let => {
                let (name, _) = self.parse_name()?;
                self.next_must(Token::Assign)?;
                let value = self.parse_expression()?;

                self.push(Tree::Set(Set { name, value }));
            }
            Keyword::Block => {
                let (name, name_region) = self.parse_name()?;
                let duplicate = self.blocks.contains_key(&name)
                    || self.states.iter().any(|state| {
                        matches!(&state.kind, BlockKind::Block { name: open, .. } if *open == name)
                    });
                if duplicate {
                    return Err(Error::new(ErrorKind::Parse, "duplicate block")
                        .with_pointer(self.lexer.source, name_region)
                        .with_help(format!(
                            "a block named `{name}` is already declared in this template"
                        )));
                }

                let position = self.locate(name_region);
                self.open(BlockKind::Block { name, position }, region);
            }
            Keyword::Extends => self.parse_extends(region)?,
            Keyword::Include => {
                let (name, name_region) = self.parse_template_name()?;
                let link = Link {
                    name,
                    position: self.locate(name_region),
                };

                self.includes.push(link.clone());
                self.push(Tree::Include(link));
            }
            Keyword::With => self.parse_with(region)?,
            Keyword::End => self.parse_end(region)?,
            Keyword::Not | Keyword::And | Keyword::Or | Keyword::In => {
                return Err(Error::new(ErrorKind::Parse, UNEXPECTED_TOKEN)
                    .with_pointer(self.lexer.source, region)
                    .with_help(expected_keyword(format!("`{keyword}`"))));
            }
        }

        self.next_must(Token::EndBlock)?;

        Ok(())
    }

    /// Start a new branch on the innermost open "if" block.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the innermost block is not an "if", or it already
    /// has an "else" branch.
    fn parse_elif(
        &mut self,
        next_condition: tree::Expression,
        region: Region,
    ) -> Result<(), Error> {
        let Some(BlockState {
            kind: BlockKind::If {
                branches,
                condition,
            },
            ..
        }) = self.states.last_mut()
        else {
            return Err(self.error_unmatched(region, "elif"));
        };
        if condition.is_none() {
            return Err(Error::new(ErrorKind::Parse, UNEXPECTED_BLOCK)
                .with_pointer(self.lexer.source, region)
                .with_help("an `elif` can not follow the `else` branch of the same `if`"));
        }

        let body = mem::take(&mut self.scope);
        if let Some(previous) = condition.replace(next_condition) {
            branches.push((previous, body));
        }

        Ok(())
    }

    /// Start the "else" branch on the innermost open "if" block.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the innermost block is not an "if", or it already
    /// has an "else" branch.
    fn parse_else(&mut self, region: Region) -> Result<(), Error> {
        let Some(BlockState {
            kind: BlockKind::If {
                branches,
                condition,
            },
            ..
        }) = self.states.last_mut()
        else {
            return Err(self.error_unmatched(region, "else"));
        };

        match condition.take() {
            Some(previous) => {
                let body = mem::take(&mut self.scope);
                branches.push((previous, body));

                Ok(())
            }
            None => Err(Error::new(ErrorKind::Parse, UNEXPECTED_BLOCK)
                .with_pointer(self.lexer.source, region)
                .with_help("this `if` already has an `else` branch")),
        }
    }

    /// Close the innermost open block.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if no block is open.
    fn parse_end(&mut self, region: Region) -> Result<(), Error> {
        let Some(state) = self.states.pop() else {
            return Err(self.error_unmatched(region, "end"));
        };
        let body = mem::replace(&mut self.scope, state.parent);

        let tree = match state.kind {
            BlockKind::If {
                mut branches,
                condition,
            } => {
                let else_branch = match condition {
                    Some(condition) => {
                        branches.push((condition, body));
                        None
                    }
                    None => Some(body),
                };

                Tree::If(If {
                    branches,
                    else_branch,
                })
            }
            BlockKind::For {
                variables,
                iterable,
                position,
            } => Tree::For(For {
                variables,
                iterable,
                body,
                position,
            }),
            BlockKind::While { condition } => Tree::While(While { condition, body }),
            BlockKind::Block { name, position } => {
                self.blocks.insert(name.clone(), body);

                Tree::Block(Link { name, position })
            }
        };

        self.push(tree);

        Ok(())
    }

    /// Parse an "extends" statement.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the statement is not the first in the template,
    /// or the template already extends another.
    fn parse_extends(&mut self, region: Region) -> Result<(), Error> {
        if self.extends.is_some() {
            return Err(Error::new(ErrorKind::Parse, UNEXPECTED_BLOCK)
                .with_pointer(self.lexer.source, region)
                .with_help("a template can only extend one other template"));
        }
        if self.content || self.parameters.is_some() {
            return Err(Error::new(ErrorKind::Parse, UNEXPECTED_BLOCK)
                .with_pointer(self.lexer.source, region)
                .with_help("`extends` must be the first statement in a template"));
        }

        let (name, name_region) = self.parse_template_name()?;
        self.extends = Some(Link {
            name,
            position: self.locate(name_region),
        });

        Ok(())
    }

    /// Parse a "with" statement, which declares the parameters of the template.
    ///
    /// ```text
    /// (* with title, items = [] *)
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the statement follows any content, or the
    /// template already declared its parameters.
    fn parse_with(&mut self, region: Region) -> Result<(), Error> {
        if self.content || self.parameters.is_some() {
            return Err(Error::new(ErrorKind::Parse, UNEXPECTED_BLOCK)
                .with_pointer(self.lexer.source, region)
                .with_help(
                    "`with` must come before any content, and only `extends` may precede it",
                ));
        }

        let mut parameters: Vec<Parameter> = vec![];
        loop {
            let (name, name_region) = self.parse_name()?;
            if parameters.iter().any(|parameter| parameter.name == name) {
                return Err(Error::new(ErrorKind::Parse, INVALID_SYNTAX)
                    .with_pointer(self.lexer.source, name_region)
                    .with_help(format!("parameter `{name}` is declared twice")));
            }

            let default = if self.next_is(Token::Assign)? {
                self.next_must(Token::Assign)?;
                Some(self.parse_expression()?)
            } else {
                None
            };
            parameters.push(Parameter { name, default });

            if !self.next_is(Token::Comma)? {
                break;
            }
            self.next_must(Token::Comma)?;
        }

        self.parameters = Some(parameters);

        Ok(())
    }

    /// Parse the variables of a "for" block, either `item` or `key, value`.
    fn parse_loop_variables(&mut self) -> Result<LoopVariables, Error> {
        let (first, _) = self.parse_name()?;
        if self.next_is(Token::Comma)? {
            self.next_must(Token::Comma)?;
            let (second, _) = self.parse_name()?;

            return Ok(LoopVariables::KeyValue(first, second));
        }

        Ok(LoopVariables::Item(first))
    }

    /// Parse the name of another template, which may be a string or an identifier.
    fn parse_template_name(&mut self) -> Result<(String, Region), Error> {
        match self.next_any_must()? {
            (Token::String, region) => Ok((self.parse_string(region)?, region)),
            (Token::Identifier, region) => Ok((self.lexer.source[region].to_owned(), region)),
            (token, region) => Err(Error::new(ErrorKind::Parse, UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(format!(
                    "expected the name of a template such as `\"base.html\"`, found {token}"
                ))),
        }
    }

    /// Parse an identifier and return its text.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the next token is not an identifier.
    fn parse_name(&mut self) -> Result<(String, Region), Error> {
        match self.next_any_must()? {
            (Token::Identifier, region) => Ok((self.lexer.source[region].to_owned(), region)),
            (token, region) => Err(Error::new(ErrorKind::Parse, UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(format!("expected a name such as `item`, found {token}"))),
        }
    }

    /// Parse a Keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is not a Keyword.
    fn parse_keyword(&mut self) -> Result<(Keyword, Region), Error> {
        match self.next_any_must()? {
            (Token::Keyword(keyword), region) => Ok((keyword, region)),
            (token, region) => Err(Error::new(ErrorKind::Parse, UNEXPECTED_TOKEN)
                .with_help(expected_keyword(token))
                .with_pointer(self.lexer.source, region)),
        }
    }

    /// Return the [`Position`] where the given [`Region`] begins.
    fn locate(&self, region: Region) -> Position {
        self.lines.locate(region.begin)
    }

    /// Return an [`Error`] describing a statement with no open block to attach to.
    fn error_unmatched(&self, region: Region, keyword: &str) -> Error {
        let wants = if keyword == "end" {
            "an open block"
        } else {
            "an open `if`"
        };

        Error::new(ErrorKind::Parse, UNEXPECTED_BLOCK)
            .with_pointer(self.lexer.source, region)
            .with_help(format!("found `{keyword}` without {wants} to attach to"))
    }

    /// Peek the next token.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the underlying Lexer.
    fn peek(&mut self) -> LexResult {
        match self.buffer {
            Some(next) => Ok(next),
            None => {
                let next = self.lexer.next()?;
                self.buffer = Some(next);

                Ok(next)
            }
        }
    }

    /// Get the next token.
    ///
    /// Prefers to pull a token from the internal buffer first, but will pull from
    /// the lexer when the buffer is empty.
    fn next(&mut self) -> LexResult {
        match self.buffer.take() {
            Some(t) => Ok(t),
            None => self.lexer.next(),
        }
    }

    /// Returns true if the given token matches the upcoming token.
    ///
    /// # Errors
    ///
    /// Propagates any errors reported by the underlying lexer.
    fn next_is(&mut self, expect: Token) -> Result<bool, Error> {
        Ok(self
            .peek()?
            .map(|(token, _)| token == expect)
            .unwrap_or(false))
    }

    /// Get the next token, and compare it to the given token.
    ///
    /// # Errors
    ///
    /// An error is returned if the next token does not match the given token,
    /// or when [next()] returns None.
    fn next_must(&mut self, expect: Token) -> LexResultMust {
        match self.next()? {
            Some((token, region)) => {
                if token == expect {
                    Ok((token, region))
                } else {
                    Err(Error::new(ErrorKind::Parse, UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region)
                        .with_help(format!("expected {expect}, found {token}")))
                }
            }
            None => Err(error_eof(self.lexer.source).with_help(format!("expected {expect}"))),
        }
    }

    /// Get the next token.
    ///
    /// Similar to "next()" but requires that a token is returned.
    ///
    /// # Errors
    ///
    /// An error is returned if no more tokens are left.
    fn next_any_must(&mut self) -> LexResultMust {
        match self.next()? {
            Some((token, region)) => Ok((token, region)),
            None => Err(error_eof(self.lexer.source)),
        }
    }
}
