use super::expression::{Expression, Function};
use super::lexer::{Spanned, Token};
use super::Value;
use crate::error::FormulaError;

/// Maximum height of a parsed expression tree, and of parenthesis nesting.
///
/// Operator chains count too: `1+1+...+1` nests one level per `+`.
pub const MAX_DEPTH: usize = 128;

type Build = fn(Box<Expression>, Box<Expression>) -> Expression;

/// A parsed subexpression and the height of its tree.
struct Node {
    expr: Expression,
    height: usize,
}

impl Node {
    fn leaf(expr: Expression) -> Self {
        Self { expr, height: 1 }
    }

    fn new(expr: Expression, children: &[usize]) -> Result<Self, FormulaError> {
        let height = 1 + children.iter().copied().max().unwrap_or(0);
        if height > MAX_DEPTH {
            return Err(FormulaError::NestingTooDeep { limit: MAX_DEPTH });
        }
        Ok(Self { expr, height })
    }

    fn binary(build: Build, left: Node, right: Node) -> Result<Self, FormulaError> {
        let heights = [left.height, right.height];
        Self::new(build(Box::new(left.expr), Box::new(right.expr)), &heights)
    }
}

/// Recursive-descent parser over a lexed formula.
///
/// Precedence, loosest first: `?:`, `||`, `&&`, equality, relational,
/// additive, multiplicative, unary, primary.
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parses the whole token stream as one expression.
    pub fn parse(mut self) -> Result<Expression, FormulaError> {
        if self.peek() == &Token::Eof {
            return Err(FormulaError::Empty);
        }
        let node = self.parse_conditional()?;
        if self.peek() != &Token::Eof {
            return Err(self.unexpected());
        }
        Ok(node.expr)
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.position)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token) -> Result<(), FormulaError> {
        if self.peek() == &token {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> FormulaError {
        FormulaError::UnexpectedToken {
            found: self.peek().describe(),
            position: self.position(),
        }
    }

    // Bounds parser recursion; parentheses add no tree height of their own.
    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaError::NestingTooDeep { limit: MAX_DEPTH });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_conditional(&mut self) -> Result<Node, FormulaError> {
        let condition = self.parse_or_expr()?;
        if self.peek() != &Token::Question {
            return Ok(condition);
        }
        self.advance();
        self.enter()?;
        let then = self.parse_conditional()?;
        self.expect(Token::Colon)?;
        let otherwise = self.parse_conditional()?;
        self.leave();
        let heights = [condition.height, then.height, otherwise.height];
        Node::new(
            Expression::Conditional {
                condition: Box::new(condition.expr),
                then: Box::new(then.expr),
                otherwise: Box::new(otherwise.expr),
            },
            &heights,
        )
    }

    fn parse_or_expr(&mut self) -> Result<Node, FormulaError> {
        let mut left = self.parse_and_expr()?;
        while self.peek() == &Token::OrOr {
            self.advance();
            let right = self.parse_and_expr()?;
            left = Node::binary(Expression::Or, left, right)?;
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Node, FormulaError> {
        let mut left = self.parse_equality_expr()?;
        while self.peek() == &Token::AndAnd {
            self.advance();
            let right = self.parse_equality_expr()?;
            left = Node::binary(Expression::And, left, right)?;
        }
        Ok(left)
    }

    fn parse_equality_expr(&mut self) -> Result<Node, FormulaError> {
        let mut left = self.parse_relational_expr()?;
        loop {
            let build: Build = match self.peek() {
                Token::EqEqEq => Expression::StrictEqual,
                Token::NotEqEq => Expression::StrictNotEqual,
                Token::EqEq => Expression::Equal,
                Token::NotEq => Expression::NotEqual,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_relational_expr()?;
            left = Node::binary(build, left, right)?;
        }
    }

    fn parse_relational_expr(&mut self) -> Result<Node, FormulaError> {
        let mut left = self.parse_additive_expr()?;
        loop {
            let build: Build = match self.peek() {
                Token::Gt => Expression::GreaterThan,
                Token::Gte => Expression::GreaterThanOrEqual,
                Token::Lt => Expression::SmallerThan,
                Token::Lte => Expression::SmallerThanOrEqual,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_additive_expr()?;
            left = Node::binary(build, left, right)?;
        }
    }

    fn parse_additive_expr(&mut self) -> Result<Node, FormulaError> {
        let mut left = self.parse_multiplicative_expr()?;
        loop {
            let build: Build = match self.peek() {
                Token::Plus => Expression::Sum,
                Token::Minus => Expression::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative_expr()?;
            left = Node::binary(build, left, right)?;
        }
    }

    fn parse_multiplicative_expr(&mut self) -> Result<Node, FormulaError> {
        let mut left = self.parse_unary_expr()?;
        loop {
            let build: Build = match self.peek() {
                Token::Star => Expression::Multiply,
                Token::Slash => Expression::Divide,
                Token::Percent => Expression::Remainder,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary_expr()?;
            left = Node::binary(build, left, right)?;
        }
    }

    fn parse_unary_expr(&mut self) -> Result<Node, FormulaError> {
        let wrap: fn(Expression) -> Expression = match self.peek() {
            Token::Minus => |e| Expression::Negate(Box::new(e)),
            Token::Bang => |e| Expression::Not(Box::new(e)),
            // Unary plus is numeric coercion.
            Token::Plus => |e| Expression::Call {
                function: Function::Number,
                args: vec![e],
            },
            _ => return self.parse_primary_expr(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary_expr()?;
        self.leave();
        Node::new(wrap(operand.expr), &[operand.height])
    }

    fn parse_primary_expr(&mut self) -> Result<Node, FormulaError> {
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Node::leaf(Expression::Literal(Value::Number(n))))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Node::leaf(Expression::Literal(Value::Str(s))))
            }
            Token::LParen => {
                self.advance();
                self.enter()?;
                let inner = self.parse_conditional()?;
                self.expect(Token::RParen)?;
                self.leave();
                Ok(inner)
            }
            Token::Ident(name) => {
                self.advance();
                let literal = match name.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    "null" => Value::Null,
                    "NaN" => Value::Number(f64::NAN),
                    "Infinity" => Value::Number(f64::INFINITY),
                    _ => return self.parse_call(name),
                };
                Ok(Node::leaf(Expression::Literal(literal)))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Node, FormulaError> {
        let function =
            Function::from_name(&name).ok_or_else(|| FormulaError::UnknownFunction(name.clone()))?;
        self.expect(Token::LParen)?;
        self.enter()?;

        let mut args = Vec::new();
        let mut heights = Vec::new();
        if self.peek() != &Token::RParen {
            loop {
                let arg = self.parse_conditional()?;
                heights.push(arg.height);
                args.push(arg.expr);
                if self.peek() != &Token::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.expect(Token::RParen)?;
        self.leave();

        let (min, max) = function.arity();
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            let expected = match max {
                Some(max) if max == min => min.to_string(),
                Some(max) => format!("{}..={}", min, max),
                None => format!("at least {}", min),
            };
            return Err(FormulaError::Arity {
                name,
                expected,
                found: args.len(),
            });
        }
        Node::new(Expression::Call { function, args }, &heights)
    }
}

/// Lexes and parses `src` into an expression.
pub fn parse(src: &str) -> Result<Expression, FormulaError> {
    let tokens = super::lexer::lex(src)?;
    Parser::new(tokens).parse()
}
