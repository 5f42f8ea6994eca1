//! Tokenizer for arithmetic expressions.

use crate::EvalError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
        }
    }
}

/// Split `input` into tokens. Whitespace separates tokens and is otherwise
/// ignored; a run of digits and dots is one number literal.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut end = pos;
                while let Some(&(i, d)) = chars.peek() {
                    if !(d.is_ascii_digit() || d == '.') {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                let literal = &input[pos..end];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| EvalError::InvalidNumber { literal: literal.to_string(), pos })?;
                tokens.push(Token { kind: TokenKind::Number(value), pos });
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ch => return Err(EvalError::UnexpectedChar { ch, pos }),
        };
        chars.next();
        tokens.push(Token { kind, pos });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn splits_numbers_and_operators() {
        assert_eq!(
            kinds("12.5*(3 - .5)"),
            vec![
                TokenKind::Number(12.5),
                TokenKind::Star,
                TokenKind::LParen,
                TokenKind::Number(3.0),
                TokenKind::Minus,
                TokenKind::Number(0.5),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn records_byte_offsets() {
        let tokens = tokenize(" 1 +22").unwrap();
        assert_eq!(tokens.iter().map(|t| t.pos).collect::<Vec<_>>(), vec![1, 3, 4]);
    }

    #[test]
    fn rejects_unknown_characters() {
        assert_eq!(tokenize("1 % 2"), Err(EvalError::UnexpectedChar { ch: '%', pos: 2 }));
    }
}
