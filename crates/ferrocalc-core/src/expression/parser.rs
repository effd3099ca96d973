//! Recursive-descent parser turning a token sequence into an [`Expr`].
//!
//! ```text
//! expr    --> term ( ("+" | "-") term )*
//! term    --> unary ( ("*" | "/") unary )*
//! unary   --> "-" unary | power
//! power   --> primary ( "^" unary )?
//! primary --> NUMBER | "(" expr ")"
//! ```
//!
//! `^` is right-associative and binds tighter than a leading minus, so
//! `-2^2` is `-(2^2)` while `2^-1` is still accepted. Open parentheses,
//! stacked minus signs, and exponent operands each count as one nesting
//! level; the parser refuses to go deeper than [`EvalLimits::max_depth`].

use super::ast::{BinaryOp, Expr};
use super::error::SyntaxError;
use super::token::{Token, TokenKind};
use super::EvalLimits;

/// Parses with the default limits.
pub fn parse(tokens: &[Token]) -> Result<Expr, SyntaxError> {
    parse_with_limits(tokens, &EvalLimits::default())
}

/// Parses a complete expression; every token up to `End` must be consumed.
pub fn parse_with_limits(tokens: &[Token], limits: &EvalLimits) -> Result<Expr, SyntaxError> {
    if let Some(extra) = tokens.get(limits.max_tokens) {
        return Err(SyntaxError {
            position: extra.position,
            expected: format!("at most {} tokens", limits.max_tokens),
            found: extra.kind.describe(),
        });
    }

    let mut parser = Parser {
        tokens,
        cursor: 0,
        depth: 0,
        max_depth: limits.max_depth,
    };
    let expr = parser.expr()?;

    let trailing = parser.current();
    if !trailing.is_end() {
        return Err(parser.unexpected("an operator or end of input"));
    }

    Ok(expr)
}

struct Parser<'t> {
    tokens: &'t [Token],
    cursor: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser<'_> {
    /// The token under the cursor; a missing terminator reads as `End`.
    fn current(&self) -> Token {
        self.tokens.get(self.cursor).copied().unwrap_or_else(|| {
            let position = self.tokens.last().map_or(0, |token| token.position + 1);
            Token::new(TokenKind::End, position)
        })
    }

    fn advance(&mut self) {
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let found = self.current();
        SyntaxError {
            position: found.position,
            expected: expected.to_owned(),
            found: found.kind.describe(),
        }
    }

    fn descend(&mut self) -> Result<(), SyntaxError> {
        if self.depth >= self.max_depth {
            return Err(self.unexpected(&format!(
                "at most {} levels of nesting",
                self.max_depth
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.term()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.term()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.unary()?;

        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.advance();
            let right = self.unary()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.current().kind != TokenKind::Minus {
            return self.power();
        }

        self.advance();
        self.descend()?;
        let operand = self.unary()?;
        self.ascend();
        Ok(Expr::negate(operand))
    }

    fn power(&mut self) -> Result<Expr, SyntaxError> {
        let base = self.primary()?;
        if self.current().kind != TokenKind::Caret {
            return Ok(base);
        }

        self.advance();
        self.descend()?;
        let exponent = self.unary()?;
        self.ascend();
        Ok(Expr::binary(BinaryOp::Power, base, exponent))
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.current().kind {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expr::Literal(value))
            }
            TokenKind::LParen => {
                self.descend()?;
                self.advance();
                let inner = self.expr()?;
                if self.current().kind != TokenKind::RParen {
                    return Err(self.unexpected("')'"));
                }
                self.advance();
                self.ascend();
                Ok(inner)
            }
            _ => Err(self.unexpected("a number or '('")),
        }
    }
}
