mod token;

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use num_bigint::BigUint;
use num_rational::Ratio;
use num_traits::{One, ToPrimitive, Zero};
use thiserror::Error;

pub use self::token::*;

/// The kind of a lexer error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerErrorKind {
    UnknownToken,
    NumberOutOfRange,
}

impl fmt::Display for LexerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            LexerErrorKind::UnknownToken => "unknown token",
            LexerErrorKind::NumberOutOfRange => "number out of range",
        })
    }
}

/// When the expression is malformed, the lexer will return this error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at index {index}")]
pub struct LexerError {
    // The error kind
    pub kind: LexerErrorKind,

    /// The index of the first character which caused the error
    pub index: usize,
}

/// A lexer reads a mathematical expression and returns a list of tokens in the
/// expression.
pub struct Lexer<'a> {
    expr: &'a [u8],
    index: usize,
    has_failed: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from an expression.
    pub fn new(expr: &str) -> Lexer {
        Lexer {
            expr: expr.as_bytes(),
            index: 0,
            has_failed: false,
        }
    }

    fn consume_whitespace(&mut self) {
        while self.index < self.expr.len() {
            match self.expr[self.index] as char {
                ' ' | '\n' | '\r' | '\t' => {}
                _ => break,
            }

            self.index += 1;
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            index: start,
            len: self.index - start,
        }
    }

    fn try_consume_operator(&mut self) -> Option<Token> {
        let start = self.index;
        let c = *self.expr.get(self.index)? as char;
        let kind = TokenKind::from_single_char(c)?;
        self.index += 1;

        // `**` is the only operator spanning two characters
        if kind == TokenKind::Times && self.expr.get(self.index) == Some(&b'*') {
            self.index += 1;
            return Some(self.token(TokenKind::Pow, start));
        }

        Some(self.token(kind, start))
    }

    fn try_consume_ident(&mut self) -> Option<Token> {
        let start = self.index;

        // every letter in an identifier is alphabetic
        while self.index < self.expr.len() && self.expr[self.index].is_ascii_alphabetic() {
            self.index += 1;
        }

        if self.index == start {
            return None;
        }

        // only ASCII letters were consumed
        let ident = String::from_utf8_lossy(&self.expr[start..self.index]).into_owned();
        let kind = IdentKind::from_str(&ident)
            .map(TokenKind::Ident)
            .unwrap_or_else(|_| TokenKind::UnknownIdent(ident));
        Some(self.token(kind, start))
    }

    fn try_consume_num(&mut self) -> Option<Result<Token, LexerError>> {
        let start = self.index;
        let mut numer: BigUint = Zero::zero();
        let mut denom: BigUint = One::one();
        let mut has_dot = false;
        let mut has_digit = false;

        while self.index < self.expr.len() {
            let c = self.expr[self.index] as char;

            if let Some(digit) = c.to_digit(10) {
                numer *= 10u32;
                numer += digit;

                if has_dot {
                    // Each digit after the dot shifts the numerator one
                    // decimal place, so the denominator follows.
                    denom *= 10u32;
                }

                has_digit = true;
            } else if c == '.' && !has_dot {
                has_dot = true;
            } else {
                break;
            }

            self.index += 1;
        }

        if !has_digit {
            self.index = start;
            return None;
        }

        let val = Ratio::new(numer, denom)
            .to_f64()
            .filter(|val| val.is_finite());
        Some(match val {
            Some(val) => Ok(self.token(TokenKind::Num(val), start)),
            None => Err(LexerError {
                kind: LexerErrorKind::NumberOutOfRange,
                index: start,
            }),
        })
    }
}

// This means that when it returns a none option, then it will keep returning
// none options.
impl<'a> FusedIterator for Lexer<'a> {}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_failed {
            return None;
        }

        self.consume_whitespace();

        // is there anything left?
        if self.index >= self.expr.len() {
            return None;
        }

        let original_index = self.index;
        let maybe_token = match self.try_consume_num() {
            Some(Ok(token)) => Some(token),
            Some(Err(err)) => {
                self.has_failed = true;
                return Some(Err(err));
            }
            None => self
                .try_consume_operator()
                .or_else(|| self.try_consume_ident()),
        };

        Some(maybe_token.ok_or_else(|| {
            self.has_failed = true;

            // if we didn't get any token, then it is unknown
            LexerError {
                kind: LexerErrorKind::UnknownToken,
                index: original_index,
            }
        }))
    }
}
