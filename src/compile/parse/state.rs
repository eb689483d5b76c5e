use crate::{
    compile::{
        tree::{Expression, LoopVariables},
        Scope,
    },
    region::{Position, Region},
};

/// A block that has been opened but not yet closed with `end`.
pub struct BlockState {
    /// What kind of block is open.
    pub kind: BlockKind,
    /// The [`Scope`] that was being filled when the block opened.
    ///
    /// It becomes the current scope again when the block closes.
    pub parent: Scope,
    /// [`Region`] of the keyword that opened the block.
    pub region: Region,
}

/// Describes the internal state of a `Parser`.
pub enum BlockKind {
    /// The `Parser` is evaluating an "if" block.
    If {
        /// Branches that are already complete.
        branches: Vec<(Expression, Scope)>,
        /// Condition of the branch currently being filled.
        ///
        /// None once an "else" has been seen.
        condition: Option<Expression>,
    },
    /// The `Parser` is evaluating a "for" block.
    For {
        variables: LoopVariables,
        /// Value being iterated on.
        iterable: Expression,
        position: Position,
    },
    /// The `Parser` is evaluating a "while" block.
    While { condition: Expression },
    /// The `Parser` is evaluating a "block" block.
    Block { name: String, position: Position },
}

impl BlockKind {
    /// Return the keyword that opens this kind of block.
    pub fn keyword(&self) -> &'static str {
        match self {
            BlockKind::If { .. } => "if",
            BlockKind::For { .. } => "for",
            BlockKind::While { .. } => "while",
            BlockKind::Block { .. } => "block",
        }
    }
}
