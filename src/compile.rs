mod lex;
mod parse;
mod syntax;
mod template;

pub use crate::compile::{
    lex::token,
    parse::{scope::Scope, tree, Parser},
    syntax::{Builder, Marker},
    template::{Parameter, Template},
};

use crate::log::Error;
use morel::Finder;
use std::fmt::Display;

/// Compile a [`Template`] from the given text with the default markers.
///
/// Provides a shortcut to quickly compile a `Template` without creating
/// an `Engine`. A template compiled this way can not extend or include other
/// templates when rendered, because there is no directory to find them in.
///
/// # Examples
///
/// ```
/// use brim::compile;
///
/// let template = compile("(( name ))");
/// assert!(template.is_ok())
/// ```
pub fn compile(text: &str) -> Result<Template, Error> {
    let finder = Finder::new(Builder::new().to_syntax());

    Parser::new(text, &finder).compile(None)
}

/// Keywords recognized by the Lexer and Parser.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Keyword {
    /// Enables negation.
    Not,
    /// Boolean conjunction.
    And,
    /// Boolean disjunction.
    Or,
    /// Beginning of an "if" block, or the condition of a conditional expression.
    If,
    /// An additional branch of an "if" block.
    Elif,
    /// Marks the beginning of the else_branch in an "if" block.
    Else,
    /// Beginning of an assignment, written as `set` or `let`.
    Let,
    /// Beginning of a loop.
    For,
    /// Divides the identifier from the iterable in a loop, and tests
    /// membership in an expression.
    ///
    /// In this example, identifier refers to "person" while the iterable
    /// refers to "people":
    ///
    /// "for person in people"
    In,
    /// Beginning of a conditional loop.
    While,
    /// Beginning of an include statement.
    Include,
    /// Beginning of an extends statement.
    Extends,
    /// Beginning of a "block" block.
    Block,
    /// Declares the parameters of a template.
    With,
    /// End of a block.
    End,
}

impl Keyword {
    /// Return the Keyword matching the given identifier text, if any.
    pub fn from_ident(text: &str) -> Option<Self> {
        let keyword = match text {
            "not" => Keyword::Not,
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "if" => Keyword::If,
            "elif" => Keyword::Elif,
            "else" => Keyword::Else,
            "set" | "let" => Keyword::Let,
            "for" => Keyword::For,
            "in" => Keyword::In,
            "while" => Keyword::While,
            "include" => Keyword::Include,
            "extends" => Keyword::Extends,
            "block" => Keyword::Block,
            "with" => Keyword::With,
            "end" => Keyword::End,
            _ => return None,
        };

        Some(keyword)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::Not => write!(f, "not"),
            Keyword::And => write!(f, "and"),
            Keyword::Or => write!(f, "or"),
            Keyword::If => write!(f, "if"),
            Keyword::Elif => write!(f, "elif"),
            Keyword::Else => write!(f, "else"),
            Keyword::Let => write!(f, "set"),
            Keyword::For => write!(f, "for"),
            Keyword::In => write!(f, "in"),
            Keyword::While => write!(f, "while"),
            Keyword::Include => write!(f, "include"),
            Keyword::Extends => write!(f, "extends"),
            Keyword::Block => write!(f, "block"),
            Keyword::With => write!(f, "with"),
            Keyword::End => write!(f, "end"),
        }
    }
}

/// Operators recognized by the Lexer and Parser.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Operator {
    /// +
    Add,
    /// -
    Subtract,
    /// *
    Multiply,
    /// /
    Divide,
    /// %
    Modulo,
    /// >
    Greater,
    /// <
    Lesser,
    /// ==
    Equal,
    /// !=
    NotEqual,
    /// >=
    GreaterOrEqual,
    /// <=
    LesserOrEqual,
}

impl Operator {
    /// Return true if the Operator compares two values rather than
    /// computing a new one.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Greater
                | Operator::Lesser
                | Operator::Equal
                | Operator::NotEqual
                | Operator::GreaterOrEqual
                | Operator::LesserOrEqual
        )
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Add => write!(f, "+"),
            Operator::Subtract => write!(f, "-"),
            Operator::Multiply => write!(f, "*"),
            Operator::Divide => write!(f, "/"),
            Operator::Modulo => write!(f, "%"),
            Operator::Greater => write!(f, ">"),
            Operator::Lesser => write!(f, "<"),
            Operator::Equal => write!(f, "=="),
            Operator::NotEqual => write!(f, "!="),
            Operator::GreaterOrEqual => write!(f, ">="),
            Operator::LesserOrEqual => write!(f, "<="),
        }
    }
}
