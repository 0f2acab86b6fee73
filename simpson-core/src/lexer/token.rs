use std::str::FromStr;

use crate::elementary::Func;

/// A list of all possible identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentKind {
    /// The integration variable
    X,
    // constants
    Pi,
    E,
    // functions
    Func(Func),
}

impl FromStr for IdentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<IdentKind, ()> {
        let lower = s.to_ascii_lowercase();
        Ok(match &*lower {
            "x" => IdentKind::X,
            "pi" => IdentKind::Pi,
            "e" => IdentKind::E,
            other => IdentKind::Func(Func::from_str(other)?),
        })
    }
}

/// Tokens are simple things like numbers, operators, parentheses, and so on.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Num(f64),
    Ident(IdentKind),
    UnknownIdent(String),
    Plus,
    Minus,
    Times,
    Slash,
    /// `**`
    Pow,
    /// `^`, rewritten to `**` by the normalizer
    Hat,
    /// `|`, the absolute value delimiter
    Bar,
    OpenParen,
    CloseParen,
}

impl TokenKind {
    pub fn from_single_char(c: char) -> Option<TokenKind> {
        Some(match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Times,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Hat,
            '|' => TokenKind::Bar,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,

    /// The index of the first character of the token
    pub index: usize,

    /// The number of bytes the token spans in the source
    pub len: usize,
}

impl Token {
    /// The slice of `src` this token was read from.
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.index..self.index + self.len]
    }
}
