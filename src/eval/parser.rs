//! Recursive-descent evaluation over a token slice.
//!
//! The parser evaluates as it goes; no syntax tree is built.

use super::MAX_DEPTH;
use super::lexer::{Token, TokenKind};
use crate::EvalError;

pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens, pos: 0, depth: 0 }
    }

    /// Evaluate the whole token slice as one expression.
    pub fn parse(mut self) -> Result<f64, EvalError> {
        if self.tokens.is_empty() {
            return Err(EvalError::Empty);
        }
        let value = self.expr()?;
        match self.peek() {
            None => Ok(value),
            Some(tok) => Err(unexpected(tok)),
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Plus => {
                    self.pos += 1;
                    value += self.term()?;
                }
                TokenKind::Minus => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Star => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                TokenKind::Slash => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, EvalError> {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            Some(TokenKind::Minus) => {
                self.pos += 1;
                self.nested(Self::unary).map(|v| -v)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, EvalError> {
        let tok = self.next().ok_or(EvalError::UnexpectedEnd)?;
        match tok.kind {
            TokenKind::Number(n) => Ok(n),
            TokenKind::LParen => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some(Token { kind: TokenKind::RParen, .. }) => Ok(value),
                    Some(other) => Err(unexpected(other)),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            _ => Err(unexpected(tok)),
        }
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested(&mut self, f: fn(&mut Self) -> Result<f64, EvalError>) -> Result<f64, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

fn unexpected(tok: Token) -> EvalError {
    EvalError::UnexpectedToken { found: tok.kind.to_string(), pos: tok.pos }
}
