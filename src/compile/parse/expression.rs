//! Expression grammar, lowest precedence first:
//!
//! ```text
//! pipe         value | name | name(arguments)
//! conditional  a if condition else b
//! or           a or b, a || b
//! and          a and b, a && b
//! not          not a, !a
//! comparison   == != < <= > >= in
//! additive     + -
//! term         * / %
//! unary        -a
//! postfix      a.name, a[index], name(arguments)
//! primary      literal, name, (expression), [a, b]
//! ```
use super::Parser;
use crate::{
    compile::{
        lex::token::Token,
        tree::{
            Access, Binary, Call, Conditional, Expression, List, Literal, Logical,
            LogicalOperator, Membership, Unary, UnaryOperator, Variable,
        },
        Keyword, Operator,
    },
    log::{Error, ErrorKind, INVALID_SYNTAX, UNEXPECTED_TOKEN},
    region::Region,
};
use serde_json::{Number, Value};

impl<'source> Parser<'source> {
    /// Parse an expression.
    ///
    /// An expression is a call to render some kind of data, and may end with
    /// any number of piped functions which are used to modify the output.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the tokens do not form an expression.
    pub(super) fn parse_expression(&mut self) -> Result<Expression, Error> {
        // (( name | default("anonymous") | upper ))
        // |                                        |
        // from                                     to
        let mut expression = self.parse_conditional()?;

        while self.next_is(Token::Pipe)? {
            self.next_must(Token::Pipe)?;
            let (name, region) = self.parse_name()?;

            let mut arguments = vec![expression];
            if self.next_is(Token::LeftParen)? {
                arguments.extend(self.parse_arguments()?);
            }

            expression = Expression::Call(Call {
                name,
                arguments,
                position: self.locate(region),
            });
        }

        Ok(expression)
    }

    /// Parse `then if condition else otherwise`.
    fn parse_conditional(&mut self) -> Result<Expression, Error> {
        let then = self.parse_or()?;
        if !self.next_is(Token::Keyword(Keyword::If))? {
            return Ok(then);
        }

        let (_, region) = self.next_must(Token::Keyword(Keyword::If))?;
        let condition = self.parse_or()?;
        self.next_must(Token::Keyword(Keyword::Else))?;
        let otherwise = self.parse_conditional()?;

        Ok(Expression::Conditional(Conditional {
            then: Box::new(then),
            condition: Box::new(condition),
            otherwise: Box::new(otherwise),
            position: self.locate(region),
        }))
    }

    fn parse_or(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_and()?;

        while let Some(region) = self.next_either(Token::Or, Token::Keyword(Keyword::Or))? {
            let right = self.parse_and()?;
            left = Expression::Logical(Logical {
                left: Box::new(left),
                operator: LogicalOperator::Or,
                right: Box::new(right),
                position: self.locate(region),
            });
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_not()?;

        while let Some(region) = self.next_either(Token::And, Token::Keyword(Keyword::And))? {
            let right = self.parse_not()?;
            left = Expression::Logical(Logical {
                left: Box::new(left),
                operator: LogicalOperator::And,
                right: Box::new(right),
                position: self.locate(region),
            });
        }

        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expression, Error> {
        match self.next_either(Token::Exclamation, Token::Keyword(Keyword::Not))? {
            Some(region) => {
                let operand = self.parse_not()?;

                Ok(Expression::Unary(Unary {
                    operator: UnaryOperator::Not,
                    operand: Box::new(operand),
                    position: self.locate(region),
                }))
            }
            None => self.parse_comparison(),
        }
    }

    /// Parse a comparison.
    ///
    /// Comparisons do not chain, `a < b < c` is an error rather than
    /// silently meaning `(a < b) < c`.
    fn parse_comparison(&mut self) -> Result<Expression, Error> {
        let left = self.parse_additive()?;

        let expression = match self.peek()? {
            Some((Token::Operator(operator), region)) if operator.is_comparison() => {
                self.next()?;
                let right = self.parse_additive()?;

                Expression::Binary(Binary {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                    position: self.locate(region),
                })
            }
            Some((Token::Keyword(Keyword::In), region)) => {
                self.next()?;
                let haystack = self.parse_additive()?;

                Expression::Membership(Membership {
                    needle: Box::new(left),
                    haystack: Box::new(haystack),
                    position: self.locate(region),
                })
            }
            _ => return Ok(left),
        };

        match self.peek()? {
            Some((Token::Operator(operator), region)) if operator.is_comparison() => {
                Err(self.error_chained(region))
            }
            Some((Token::Keyword(Keyword::In), region)) => Err(self.error_chained(region)),
            _ => Ok(expression),
        }
    }

    fn parse_additive(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_term()?;

        while let Some((Token::Operator(operator @ (Operator::Add | Operator::Subtract)), region)) =
            self.peek()?
        {
            self.next()?;
            let right = self.parse_term()?;
            left = Expression::Binary(Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                position: self.locate(region),
            });
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_unary()?;

        while let Some((
            Token::Operator(operator @ (Operator::Multiply | Operator::Divide | Operator::Modulo)),
            region,
        )) = self.peek()?
        {
            self.next()?;
            let right = self.parse_unary()?;
            left = Expression::Binary(Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                position: self.locate(region),
            });
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, Error> {
        if self.next_is(Token::Operator(Operator::Subtract))? {
            let (_, region) = self.next_must(Token::Operator(Operator::Subtract))?;

            // -1000 <- a negative number literal
            // - 1000 <- negation of 1000
            if let Some((Token::Number, next_region)) = self.peek()? {
                if region.is_neighbor(next_region) {
                    self.next()?;
                    let merge = region.combine(next_region);

                    return Ok(Expression::Literal(self.parse_number(merge)?));
                }
            }

            let operand = self.parse_unary()?;

            return Ok(Expression::Unary(Unary {
                operator: UnaryOperator::Negative,
                operand: Box::new(operand),
                position: self.locate(region),
            }));
        }

        self.parse_postfix()
    }

    /// Parse attribute access, index access and calls following a primary
    /// expression.
    fn parse_postfix(&mut self) -> Result<Expression, Error> {
        let mut expression = self.parse_primary()?;

        loop {
            match self.peek()? {
                Some((Token::Period, _)) => {
                    self.next()?;
                    let key = match self.next_any_must()? {
                        (Token::Identifier | Token::Number, region) => Literal {
                            value: Value::String(self.lexer.source[region].to_owned()),
                            position: self.locate(region),
                        },
                        (token, region) => {
                            return Err(Error::new(ErrorKind::Parse, UNEXPECTED_TOKEN)
                                .with_pointer(self.lexer.source, region)
                                .with_help(format!(
                                    "expected an attribute name such as `person.name`, found {token}"
                                )))
                        }
                    };
                    let position = key.position;

                    expression = Expression::Access(Access {
                        target: Box::new(expression),
                        key: Box::new(Expression::Literal(key)),
                        position,
                    });
                }
                Some((Token::LeftBracket, region)) => {
                    self.next()?;
                    let key = self.parse_expression()?;
                    self.next_must(Token::RightBracket)?;

                    expression = Expression::Access(Access {
                        target: Box::new(expression),
                        key: Box::new(key),
                        position: self.locate(region),
                    });
                }
                Some((Token::LeftParen, region)) => {
                    let Expression::Variable(variable) = expression else {
                        return Err(Error::new(ErrorKind::Parse, INVALID_SYNTAX)
                            .with_pointer(self.lexer.source, region)
                            .with_help("only functions referred to by name can be called"));
                    };
                    let arguments = self.parse_arguments()?;

                    expression = Expression::Call(Call {
                        name: variable.name,
                        arguments,
                        position: variable.position,
                    });
                }
                _ => return Ok(expression),
            }
        }
    }

    /// Parse a Primary.
    ///
    /// ## Literal
    ///
    /// "hello world", 'hello world', 1000, 10.2, true, false, none
    ///
    /// ## Variable
    ///
    /// person
    ///
    /// ## Grouping and lists
    ///
    /// (a + b), [a, b]
    fn parse_primary(&mut self) -> Result<Expression, Error> {
        let expression = match self.next_any_must()? {
            (Token::Number, region) => Expression::Literal(self.parse_number(region)?),
            (Token::String, region) => Expression::Literal(Literal {
                value: Value::String(self.parse_string(region)?),
                position: self.locate(region),
            }),
            (token @ (Token::True | Token::False | Token::None), region) => {
                let value = match token {
                    Token::True => Value::Bool(true),
                    Token::False => Value::Bool(false),
                    _ => Value::Null,
                };

                Expression::Literal(Literal {
                    value,
                    position: self.locate(region),
                })
            }
            (Token::Identifier, region) => Expression::Variable(Variable {
                name: self.lexer.source[region].to_owned(),
                position: self.locate(region),
            }),
            (Token::LeftParen, _) => {
                let expression = self.parse_expression()?;
                self.next_must(Token::RightParen)?;

                expression
            }
            (Token::LeftBracket, region) => {
                let items = self.parse_sequence(Token::RightBracket)?;

                Expression::List(List {
                    items,
                    position: self.locate(region),
                })
            }
            (Token::Keyword(keyword), region) => {
                return Err(Error::new(ErrorKind::Parse, UNEXPECTED_TOKEN)
                    .with_pointer(self.lexer.source, region)
                    .with_help(format!(
                        "`{keyword}` is a statement keyword and can not be used as a value"
                    )))
            }
            (token, region) => {
                return Err(Error::new(ErrorKind::Parse, UNEXPECTED_TOKEN)
                    .with_pointer(self.lexer.source, region)
                    .with_help(format!(
                        "expected a value such as a name, string or number, found {token}"
                    )))
            }
        };

        Ok(expression)
    }

    /// Parse the arguments of a call, beginning with the left parenthesis.
    fn parse_arguments(&mut self) -> Result<Vec<Expression>, Error> {
        self.next_must(Token::LeftParen)?;

        self.parse_sequence(Token::RightParen)
    }

    /// Parse comma separated expressions until the given closing [`Token`].
    ///
    /// A trailing comma is permitted.
    fn parse_sequence(&mut self, close: Token) -> Result<Vec<Expression>, Error> {
        let mut items = vec![];

        loop {
            if self.next_is(close)? {
                self.next_must(close)?;
                break;
            }

            items.push(self.parse_expression()?);

            if self.next_is(Token::Comma)? {
                self.next_must(Token::Comma)?;
            } else {
                self.next_must(close)?;
                break;
            }
        }

        Ok(items)
    }

    /// Consume the next token if it is either of the given tokens, and return
    /// its [`Region`].
    fn next_either(&mut self, first: Token, second: Token) -> Result<Option<Region>, Error> {
        match self.peek()? {
            Some((token, region)) if token == first || token == second => {
                self.next()?;

                Ok(Some(region))
            }
            _ => Ok(None),
        }
    }

    /// Parse a String from the literal value of the given Region.
    ///
    /// # Errors
    ///
    /// Returns an error if an unrecognized escape character is found.
    pub(super) fn parse_string(&self, region: Region) -> Result<String, Error> {
        let window = &self.lexer.source[region];
        // The lexer only emits strings that open and close with the same quote.
        let inner = window.get(1..window.len().saturating_sub(1)).unwrap_or_default();
        if !inner.contains('\\') {
            return Ok(inner.to_owned());
        }

        let mut string = String::with_capacity(inner.len());
        let mut iter = inner.chars();
        while let Some(c) = iter.next() {
            if c != '\\' {
                string.push(c);
                continue;
            }

            let escaped = match iter.next() {
                Some('n') => '\n',
                Some('r') => '\r',
                Some('t') => '\t',
                Some('\\') => '\\',
                Some('"') => '"',
                Some('\'') => '\'',
                _ => {
                    return Err(Error::new(ErrorKind::Parse, "unexpected escape character")
                        .with_pointer(self.lexer.source, region)
                        .with_help(r#"recognized escapes are `\n`, `\r`, `\t`, `\\`, `\"` and `\'`"#))
                }
            };
            string.push(escaped);
        }

        Ok(string)
    }

    /// Parse a Literal containing a Value::Number from the given Region.
    ///
    /// # Errors
    ///
    /// Returns an error if the literal value of the Region cannot be converted
    /// to a Value::Number.
    fn parse_number(&self, region: Region) -> Result<Literal, Error> {
        let window = &self.lexer.source[region];
        let as_number: Number = window.parse().map_err(|_| {
            Error::new(ErrorKind::Parse, "unrecognizable number")
                .with_pointer(self.lexer.source, region)
                .with_help(format!(
                    "numbers may begin with `{}` to indicate a negative \
                    number and must not end with a decimal",
                    Operator::Subtract
                ))
        })?;

        Ok(Literal {
            value: Value::Number(as_number),
            position: self.locate(region),
        })
    }

    /// Return an [`Error`] describing a second comparison operator.
    fn error_chained(&self, region: Region) -> Error {
        Error::new(ErrorKind::Parse, UNEXPECTED_TOKEN)
            .with_pointer(self.lexer.source, region)
            .with_help("comparisons can not be chained, try joining them with `and`")
    }
}

#[cfg(test)]
mod tests {
    use crate::compile::{
        compile,
        tree::{Expression, LogicalOperator, Tree, UnaryOperator},
        Operator,
    };
    use serde_json::json;

    /// Compile the expression and return the tree within the output.
    fn expression(text: &str) -> Expression {
        let template = compile(&format!("(( {text} ))")).unwrap();
        match template.scope.data.into_iter().next() {
            Some(Tree::Output(output)) => output.expression,
            other => panic!("expected output, found {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        let Expression::Binary(add) = expression("1 + 2 * 3") else {
            panic!("expected binary");
        };

        assert_eq!(add.operator, Operator::Add);
        assert!(matches!(*add.right, Expression::Binary(ref b) if b.operator == Operator::Multiply));
    }

    #[test]
    fn test_logical_precedence() {
        let Expression::Logical(or) = expression("a or b and not c") else {
            panic!("expected logical");
        };

        assert_eq!(or.operator, LogicalOperator::Or);
        let Expression::Logical(and) = *or.right else {
            panic!("expected logical");
        };
        assert_eq!(and.operator, LogicalOperator::And);
        assert!(
            matches!(*and.right, Expression::Unary(ref u) if u.operator == UnaryOperator::Not)
        );
    }

    #[test]
    fn test_negative_literal() {
        assert!(matches!(
            expression("-10"),
            Expression::Literal(literal) if literal.value == json!(-10)
        ));
        assert!(matches!(expression("- a"), Expression::Unary(_)));
    }

    #[test]
    fn test_access_chain() {
        let Expression::Access(outer) = expression("people[0].name") else {
            panic!("expected access");
        };

        assert!(matches!(*outer.key, Expression::Literal(ref l) if l.value == json!("name")));
        assert!(matches!(*outer.target, Expression::Access(_)));
    }

    #[test]
    fn test_conditional() {
        assert!(matches!(
            expression("a if b else c if d else e"),
            Expression::Conditional(c) if matches!(*c.otherwise, Expression::Conditional(_))
        ));
    }

    #[test]
    fn test_pipe_is_call() {
        let Expression::Call(call) = expression("name | default(\"x\") | upper") else {
            panic!("expected call");
        };

        assert_eq!(call.name, "upper");
        assert!(matches!(&call.arguments[0], Expression::Call(inner) if inner.arguments.len() == 2));
    }

    #[test]
    fn test_list_literal() {
        assert!(matches!(
            expression("[1, 'two', [3],]"),
            Expression::List(list) if list.items.len() == 3
        ));
    }

    #[test]
    fn test_string_escapes() {
        assert!(matches!(
            expression(r#""say \"hi\"\n""#),
            Expression::Literal(literal) if literal.value == json!("say \"hi\"\n")
        ));
    }

    #[test]
    fn test_errors() {
        assert!(compile("(( a < b < c ))").is_err());
        assert!(compile("(( a.b(c) ))").is_err());
        assert!(compile("(( a if b ))").is_err());
        assert!(compile("(( \"\\q\" ))").is_err());
        assert!(compile("(( 1.2.3 ))").is_err());
    }
}
