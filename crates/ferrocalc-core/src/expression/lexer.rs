//! Scans expression text into [`Token`]s.
//!
//! Whitespace is skipped, numbers are digit runs with at most one decimal
//! point (`12`, `3.5`, `.5`, `5.`), and the only operators are the single
//! characters `+ - * / ^ ( )`. The output always ends with an `End` token.

use std::iter::Peekable;
use std::str::Chars;

use super::error::LexError;
use super::token::{Token, TokenKind};

/// Tokenizes `input`, failing on the first character that cannot start or
/// continue a token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        let done = token.is_end();
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
            position: 0,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let next = self.input.next();
        if next.is_some() {
            self.position += 1;
        }
        next
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let start = self.position;
        let kind = match self.bump() {
            None => TokenKind::End,
            Some('+') => TokenKind::Plus,
            Some('-') => TokenKind::Minus,
            Some('*') => TokenKind::Star,
            Some('/') => TokenKind::Slash,
            Some('^') => TokenKind::Caret,
            Some('(') => TokenKind::LParen,
            Some(')') => TokenKind::RParen,
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.read_number(ch, start)?,
            Some(character) => {
                return Err(LexError {
                    position: start,
                    character,
                })
            }
        };

        Ok(Token::new(kind, start))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.input.peek(), Some(ch) if ch.is_whitespace()) {
            self.bump();
        }
    }

    fn read_number(&mut self, first: char, start: usize) -> Result<TokenKind, LexError> {
        let mut text = String::from(first);
        let mut has_dot = first == '.';

        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
            } else if ch == '.' {
                if has_dot {
                    return Err(LexError {
                        position: self.position,
                        character: '.',
                    });
                }
                has_dot = true;
                text.push(ch);
            } else {
                break;
            }
            self.bump();
        }

        // A bare "." is the only run that fails to parse.
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| LexError {
                position: start,
                character: first,
            })
    }
}
