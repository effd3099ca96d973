use std::fmt::{Display, Formatter};

/// Lexical category of a token. Numbers carry their decoded value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    End,
}

impl TokenKind {
    /// Human-readable description used in syntax errors.
    pub fn describe(self) -> String {
        match self {
            Self::Number(value) => format!("number '{value}'"),
            Self::End => String::from("end of input"),
            other => format!("'{other}'"),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::Slash => f.write_str("/"),
            Self::Caret => f.write_str("^"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::End => Ok(()),
        }
    }
}

/// A token and the 0-based character offset where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    pub const fn new(kind: TokenKind, position: usize) -> Self {
        Self { kind, position }
    }

    pub const fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::End)
    }
}

/// Canonical lexeme; `End` renders as nothing.
impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}
