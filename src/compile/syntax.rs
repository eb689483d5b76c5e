use morel::Syntax;

/// Markers that identify statements and expressions within text.
pub enum Marker {
    /// Beginning of an Expression, which outputs a value.
    BeginExpression = 0,
    /// End of an Expression.
    EndExpression = 1,
    /// Same as BeginExpression, but causes the trailing whitespace of the
    /// preceding raw text to be removed.
    BeginExpressionTrim = 2,
    /// Same as EndExpression, but causes the leading whitespace of the
    /// following raw text to be removed.
    EndExpressionTrim = 3,
    /// Beginning of a Block, which holds a statement such as "if", "set"
    /// or "for".
    BeginBlock = 4,
    /// End of a Block.
    EndBlock = 5,
    /// Same as BeginBlock, but causes the trailing whitespace of the
    /// preceding raw text to be removed.
    BeginBlockTrim = 6,
    /// Same as EndBlock, but causes the leading whitespace of the
    /// following raw text to be removed.
    EndBlockTrim = 7,
}

impl From<usize> for Marker {
    fn from(value: usize) -> Self {
        match value {
            0 => Self::BeginExpression,
            1 => Self::EndExpression,
            2 => Self::BeginExpressionTrim,
            3 => Self::EndExpressionTrim,
            4 => Self::BeginBlock,
            5 => Self::EndBlock,
            6 => Self::BeginBlockTrim,
            _ => Self::EndBlockTrim,
        }
    }
}

impl From<Marker> for usize {
    fn from(k: Marker) -> Self {
        k as usize
    }
}

/// Provides methods to build a `Syntax`.
///
/// Raw (unescaped) expressions are not a separate marker, they are written as
/// an expression whose first character is a colon: `((: html ))`.
///
/// # Example
///
/// ```
/// use brim::Builder;
///
/// let builder = Builder::new()
///     .with_expression("{{", "}}")
///     .with_block("{%", "%}");
///
/// assert_eq!(builder.expression(), ("{{", "}}"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Builder {
    expression: (String, String),
    block: (String, String),
    whitespace: char,
}

impl Builder {
    /// Create a new [`Builder`].
    ///
    /// The `Builder` has default markers:
    ///
    /// ```text
    /// Expressions: (( name ))
    /// Raw expressions: ((: name ))
    /// Blocks: (* if ... *)
    /// Whitespace:
    ///     Expression: ((- name -))
    ///     Block:  (*- if ... -*)
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self {
            expression: ("((".into(), "))".into()),
            block: ("(*".into(), "*)".into()),
            whitespace: '-',
        }
    }

    /// Set the expression markers.
    #[inline]
    pub fn set_expression(&mut self, begin: &str, end: &str) {
        self.expression = (begin.into(), end.into());
    }

    /// Set the expression markers.
    ///
    /// Returns the [`Builder`], so additional methods may be chained.
    #[inline]
    pub fn with_expression(mut self, begin: &str, end: &str) -> Self {
        self.set_expression(begin, end);

        self
    }

    /// Set the block markers.
    #[inline]
    pub fn set_block(&mut self, begin: &str, end: &str) {
        self.block = (begin.into(), end.into());
    }

    /// Set the block markers.
    ///
    /// Returns the [`Builder`], so additional methods may be chained.
    #[inline]
    pub fn with_block(mut self, begin: &str, end: &str) -> Self {
        self.set_block(begin, end);

        self
    }

    /// Set the whitespace trim character.
    #[inline]
    pub fn set_whitespace(&mut self, character: char) {
        self.whitespace = character;
    }

    /// Set the whitespace trim character.
    ///
    /// Returns the Builder, so additional methods may be chained.
    #[inline]
    pub fn with_whitespace(mut self, character: char) -> Self {
        self.set_whitespace(character);

        self
    }

    /// Return the expression markers.
    pub fn expression(&self) -> (&str, &str) {
        (&self.expression.0, &self.expression.1)
    }

    /// Return the block markers.
    pub fn block(&self) -> (&str, &str) {
        (&self.block.0, &self.block.1)
    }

    /// Return a Syntax instance from the markers in this [`Builder`].
    pub fn to_syntax(&self) -> Syntax {
        let (left_expression, right_expression) = self.expression();
        let (left_block, right_block) = self.block();
        let whitespace = self.whitespace;

        let markers = vec![
            (Marker::BeginExpression.into(), left_expression.into()),
            (Marker::EndExpression.into(), right_expression.into()),
            (
                Marker::BeginExpressionTrim.into(),
                format!("{left_expression}{whitespace}"),
            ),
            (
                Marker::EndExpressionTrim.into(),
                format!("{whitespace}{right_expression}"),
            ),
            (Marker::BeginBlock.into(), left_block.into()),
            (Marker::EndBlock.into(), right_block.into()),
            (
                Marker::BeginBlockTrim.into(),
                format!("{left_block}{whitespace}"),
            ),
            (
                Marker::EndBlockTrim.into(),
                format!("{whitespace}{right_block}"),
            ),
        ];

        Syntax::new(markers)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
