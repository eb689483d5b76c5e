use crate::{
    compile::{Operator, Scope},
    region::Position,
};
use serde_json::Value;

/// The Abstract Syntax Tree.
///
/// Every node owns its text, so a compiled template does not hold on to
/// the source it was compiled from.
#[derive(Debug, Clone)]
pub enum Tree {
    /// Raw text.
    Raw(String),
    /// Render the result of an expression.
    Output(Output),
    /// An "if" block with any number of "elif" branches and an optional "else".
    If(If),
    /// A "for" loop.
    For(For),
    /// A "while" loop.
    While(While),
    /// An assignment to a local name.
    Set(Set),
    /// The point where a named block is rendered.
    ///
    /// The body of the block lives in the block table of the template.
    Block(Link),
    /// Render another template.
    Include(Link),
}

/// Represents data within expression tags, "(( ))" by default.
#[derive(Debug, Clone)]
pub enum Expression {
    /// Literal data, such as a string or number.
    Literal(Literal),
    /// A name resolved against the locals, the `Store` and the globals.
    Variable(Variable),
    /// An attribute or index lookup, such as `person.name` or `items[0]`.
    Access(Access),
    /// A call to a registered function.
    ///
    /// The pipe `value | upper` is sugar for `upper(value)`.
    Call(Call),
    /// A negation, either `-value` or `not value`.
    Unary(Unary),
    /// An arithmetic operation or comparison between two values.
    Binary(Binary),
    /// A short circuiting `and` or `or`.
    Logical(Logical),
    /// A membership test, `needle in haystack`.
    Membership(Membership),
    /// A conditional expression, `a if condition else b`.
    Conditional(Conditional),
    /// A list literal, `[a, b]`.
    List(List),
}

impl Expression {
    /// Return the [`Position`] of the underlying Expression kind.
    pub fn position(&self) -> Position {
        match self {
            Expression::Literal(literal) => literal.position,
            Expression::Variable(variable) => variable.position,
            Expression::Access(access) => access.position,
            Expression::Call(call) => call.position,
            Expression::Unary(unary) => unary.position,
            Expression::Binary(binary) => binary.position,
            Expression::Logical(logical) => logical.position,
            Expression::Membership(membership) => membership.position,
            Expression::Conditional(conditional) => conditional.position,
            Expression::List(list) => list.position,
        }
    }
}

/// Represents a call to render some kind of Expression.
#[derive(Debug, Clone)]
pub struct Output {
    pub expression: Expression,
    /// True when the raw marker was used, and the value is not escaped.
    pub raw: bool,
}

/// Literal data that does not need to be evaluated any further.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
    pub position: Position,
}

/// A name that is looked up when rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub position: Position,
}

/// Lookup of `key` within the value of `target`.
///
/// `person.name` is stored with a literal string key, and `items[index]`
/// with whatever expression is found between the brackets.
#[derive(Debug, Clone)]
pub struct Access {
    pub target: Box<Expression>,
    pub key: Box<Expression>,
    pub position: Position,
}

/// Call to some registered function.
#[derive(Debug, Clone)]
pub struct Call {
    pub name: String,
    pub arguments: Vec<Expression>,
    pub position: Position,
}

/// Operators that take a single value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    /// `not value` or `!value`.
    Not,
    /// `-value`.
    Negative,
}

#[derive(Debug, Clone)]
pub struct Unary {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub left: Box<Expression>,
    pub operator: Operator,
    pub right: Box<Expression>,
    pub position: Position,
}

/// Boolean operators, which only evaluate the right side when needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone)]
pub struct Logical {
    pub left: Box<Expression>,
    pub operator: LogicalOperator,
    pub right: Box<Expression>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Membership {
    pub needle: Box<Expression>,
    pub haystack: Box<Expression>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Conditional {
    pub then: Box<Expression>,
    pub condition: Box<Expression>,
    pub otherwise: Box<Expression>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct List {
    pub items: Vec<Expression>,
    pub position: Position,
}

/// Conditional rendering.
///
/// Branches are checked in order, the first with a truthy condition is
/// rendered.
#[derive(Debug, Clone)]
pub struct If {
    pub branches: Vec<(Expression, Scope)>,
    pub else_branch: Option<Scope>,
}

/// Loop rendering.
#[derive(Debug, Clone)]
pub struct For {
    pub variables: LoopVariables,
    pub iterable: Expression,
    pub body: Scope,
    pub position: Position,
}

/// Variable types derived from a loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopVariables {
    /// `for item in items`
    Item(String),
    /// `for key, value in items`
    KeyValue(String, String),
}

/// Loop that renders the body for as long as the condition is truthy.
#[derive(Debug, Clone)]
pub struct While {
    pub condition: Expression,
    pub body: Scope,
}

/// Assign the value of an expression to a local name.
#[derive(Debug, Clone)]
pub struct Set {
    pub name: String,
    pub value: Expression,
}

/// A reference to a block or another template by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub name: String,
    pub position: Position,
}
