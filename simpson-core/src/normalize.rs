//! Rewrites user-typed text into the language the parser reads.
//!
//! The raw language allows implicit multiplication (`2x`, `3(x+1)`, `)(`),
//! `^` for powers and `|...|` for absolute values. The normalized output has
//! an explicit `*` everywhere, `**` for powers, `abs(...)` for absolute values
//! and no whitespace. Numbers and identifiers keep their original spelling.

use tracing::trace;

use crate::lexer::{IdentKind, Lexer, Token, TokenKind};
use crate::parser::{ParseError, MAX_DEPTH};

/// What the writer emitted last. It decides whether the next token continues
/// an operand or needs an operator in front of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    /// Start of input
    Nothing,
    Operator,
    /// `(` or an opening bar
    Open,
    /// A function name, with the index of its first character
    Func(usize),
    Num,
    /// `x`, a constant, `)` or a closing bar
    Value,
}

impl Last {
    fn expects_operand(self) -> bool {
        match self {
            Last::Nothing | Last::Operator | Last::Open => true,
            Last::Func(_) | Last::Num | Last::Value => false,
        }
    }

    fn ends_operand(self) -> bool {
        match self {
            Last::Num | Last::Value => true,
            _ => false,
        }
    }
}

struct Writer<'a> {
    src: &'a str,
    out: String,
    last: Last,

    /// Indices of the parentheses that are still open
    parens: Vec<usize>,

    /// Index of every open bar, with the number of parentheses that were open
    /// when it was opened
    bars: Vec<(usize, usize)>,
}

impl<'a> Writer<'a> {
    fn new(src: &'a str) -> Writer<'a> {
        Writer {
            src,
            out: String::with_capacity(src.len()),
            last: Last::Nothing,
            parens: Vec::new(),
            bars: Vec::new(),
        }
    }

    fn emit(&mut self, text: &str, last: Last) {
        self.out.push_str(text);
        self.last = last;
    }

    /// Fails unless the previous token was a complete function name waiting
    /// for its `(`.
    fn check_no_pending_func(&self) -> Result<(), ParseError> {
        match self.last {
            Last::Func(index) => Err(ParseError::MissingCallParen { index }),
            _ => Ok(()),
        }
    }

    /// Emits a `*` if `token` starts an operand right after another one.
    fn separate_operand(&mut self, token: &Token) -> Result<(), ParseError> {
        self.check_no_pending_func()?;
        if self.last == Last::Num {
            if let TokenKind::Num(_) = token.kind {
                return Err(ParseError::AdjacentNumbers { index: token.index });
            }
        }
        if self.last.ends_operand() {
            self.out.push('*');
        }
        Ok(())
    }

    /// Fails if one more open delimiter would nest deeper than the parser
    /// accepts.
    fn check_depth(&self, index: usize) -> Result<(), ParseError> {
        if self.parens.len() + self.bars.len() >= MAX_DEPTH {
            return Err(ParseError::TooDeep { index });
        }
        Ok(())
    }

    fn bar_closes_here(&self) -> bool {
        self.bars
            .last()
            .map_or(false, |&(_, depth)| depth == self.parens.len())
    }

    fn open_bar(&mut self, index: usize) -> Result<(), ParseError> {
        self.check_depth(index)?;
        self.bars.push((index, self.parens.len()));
        self.emit("abs(", Last::Open);
        Ok(())
    }

    fn write(&mut self, token: &Token) -> Result<(), ParseError> {
        match &token.kind {
            TokenKind::Num(_) => {
                self.separate_operand(token)?;
                self.emit(token.text(self.src), Last::Num);
            }
            TokenKind::Ident(kind) => {
                self.separate_operand(token)?;
                let last = match kind {
                    IdentKind::Func(_) => Last::Func(token.index),
                    IdentKind::X | IdentKind::Pi | IdentKind::E => Last::Value,
                };
                self.emit(token.text(self.src), last);
            }
            TokenKind::UnknownIdent(name) => {
                return Err(ParseError::UnknownIdentifier {
                    name: name.clone(),
                    index: token.index,
                });
            }

            // unary or binary
            TokenKind::Plus | TokenKind::Minus => {
                self.check_no_pending_func()?;
                self.emit(token.text(self.src), Last::Operator);
            }

            // binary only
            TokenKind::Times | TokenKind::Slash | TokenKind::Pow | TokenKind::Hat => {
                self.check_no_pending_func()?;
                if self.last.expects_operand() {
                    return Err(ParseError::UnexpectedToken { index: token.index });
                }
                let text = match token.kind {
                    TokenKind::Times => "*",
                    TokenKind::Slash => "/",
                    _ => "**",
                };
                self.emit(text, Last::Operator);
            }

            TokenKind::OpenParen => {
                // `2(`, `x(` and `)(` multiply
                if self.last.ends_operand() {
                    self.out.push('*');
                }
                self.check_depth(token.index)?;
                self.parens.push(token.index);
                self.emit("(", Last::Open);
            }
            TokenKind::CloseParen => {
                self.check_no_pending_func()?;
                if self.last.expects_operand() {
                    return Err(ParseError::UnexpectedToken { index: token.index });
                }
                if self.bar_closes_here() {
                    let (index, _) = self.bars[self.bars.len() - 1];
                    return Err(ParseError::UnmatchedBar { index });
                }
                if self.parens.pop().is_none() {
                    return Err(ParseError::UnmatchedParen { index: token.index });
                }
                self.emit(")", Last::Value);
            }

            TokenKind::Bar => {
                self.check_no_pending_func()?;
                if self.last.expects_operand() {
                    trace!("bar at index {} opens", token.index);
                    self.open_bar(token.index)?;
                } else if self.bar_closes_here() {
                    trace!("bar at index {} closes", token.index);
                    self.bars.pop();
                    self.emit(")", Last::Value);
                } else {
                    trace!("bar at index {} opens after an operand", token.index);
                    self.out.push('*');
                    self.open_bar(token.index)?;
                }
            }
        }

        Ok(())
    }

    fn finish(self) -> Result<String, ParseError> {
        self.check_no_pending_func()?;

        // report whichever of the open delimiters came last
        let paren = self.parens.last().copied();
        let bar = self.bars.last().map(|&(index, _)| index);
        match (paren, bar) {
            (Some(paren), Some(bar)) if bar > paren => {
                return Err(ParseError::UnmatchedBar { index: bar })
            }
            (Some(index), _) => return Err(ParseError::UnmatchedParen { index }),
            (None, Some(index)) => return Err(ParseError::UnmatchedBar { index }),
            (None, None) => {}
        }

        if self.last.expects_operand() {
            return Err(ParseError::EarlyEof);
        }
        Ok(self.out)
    }
}

/// Turns raw text into text that [`compile`](crate::compile) accepts.
///
/// The transformation keeps the meaning of the expression and is idempotent.
/// It fails on text that cannot mean anything: unbalanced parentheses or
/// bars, names that are neither `x`, `pi`, `e` nor a known function, and
/// operators with a missing operand.
pub fn normalize(raw: &str) -> Result<String, ParseError> {
    let mut writer = Writer::new(raw);
    for token in Lexer::new(raw) {
        writer.write(&token?)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(raw: &str, expected: &str) {
        let normalized = normalize(raw).unwrap();
        assert_eq!(normalized, expected);
        assert_eq!(normalize(&normalized).unwrap(), normalized);
    }

    #[test]
    fn it_inserts_implicit_multiplication() {
        check("2x", "2*x");
        check("3(x+1)", "3*(x+1)");
        check("(x+1)(x-1)", "(x+1)*(x-1)");
        check("(x)2", "(x)*2");
        check("x(x+1)", "x*(x+1)");
        check("2pi x", "2*pi*x");
        check("2sin(x)cos(x)", "2*sin(x)*cos(x)");
    }

    #[test]
    fn it_translates_carets() {
        check("x^2", "x**2");
        check("x ** 2", "x**2");
        check("2^-x", "2**-x");
    }

    #[test]
    fn it_translates_bars() {
        check("2x^2+|x-3|", "2*x**2+abs(x-3)");
        check("|x|", "abs(x)");
        check("||x|-1|", "abs(abs(x)-1)");
        check("|x||x-1|", "abs(x)*abs(x-1)");
        check("|-x|", "abs(-x)");
        check("2|x|", "2*abs(x)");
        check("(|x|)", "(abs(x))");
        check("|(x)|", "abs((x))");
        check("|x|^2", "abs(x)**2");
    }

    #[test]
    fn it_keeps_names_as_typed() {
        check("ln(x)", "ln(x)");
        check("LOG(X) + Cosec(x)", "LOG(X)+Cosec(x)");
        check(" 0.50 * x ", "0.50*x");
    }

    #[test]
    fn it_rejects_unmatched_bars() {
        assert_eq!(normalize("|x"), Err(ParseError::UnmatchedBar { index: 0 }));
        assert_eq!(normalize("x|"), Err(ParseError::UnmatchedBar { index: 1 }));
        assert_eq!(normalize("||"), Err(ParseError::UnmatchedBar { index: 1 }));
        assert_eq!(
            normalize("(|x)|"),
            Err(ParseError::UnmatchedBar { index: 1 })
        );
        assert_eq!(
            normalize("|x|+|x"),
            Err(ParseError::UnmatchedBar { index: 4 })
        );
    }

    #[test]
    fn it_rejects_unmatched_parentheses() {
        assert_eq!(normalize("(x"), Err(ParseError::UnmatchedParen { index: 0 }));
        assert_eq!(normalize("x)"), Err(ParseError::UnmatchedParen { index: 1 }));
        assert_eq!(
            normalize("sin((x)"),
            Err(ParseError::UnmatchedParen { index: 3 })
        );
    }

    #[test]
    fn it_rejects_adjacent_numbers() {
        assert_eq!(
            normalize("2 3"),
            Err(ParseError::AdjacentNumbers { index: 2 })
        );
    }

    #[test]
    fn it_rejects_unknown_identifiers() {
        assert_eq!(
            normalize("foo(x)"),
            Err(ParseError::UnknownIdentifier {
                name: "foo".to_string(),
                index: 0
            })
        );
        assert_eq!(
            normalize("xsin(x)"),
            Err(ParseError::UnknownIdentifier {
                name: "xsin".to_string(),
                index: 0
            })
        );
    }

    #[test]
    fn it_rejects_functions_without_parentheses() {
        assert_eq!(
            normalize("sin x"),
            Err(ParseError::MissingCallParen { index: 0 })
        );
        assert_eq!(
            normalize("1+sqrt"),
            Err(ParseError::MissingCallParen { index: 2 })
        );
    }

    #[test]
    fn it_rejects_missing_operands() {
        assert_eq!(normalize(""), Err(ParseError::EarlyEof));
        assert_eq!(normalize("x+"), Err(ParseError::EarlyEof));
        assert_eq!(normalize("*x"), Err(ParseError::UnexpectedToken { index: 0 }));
        assert_eq!(normalize("x+^2"), Err(ParseError::UnexpectedToken { index: 2 }));
        assert_eq!(normalize("()"), Err(ParseError::UnexpectedToken { index: 1 }));
    }

    #[test]
    fn it_limits_nesting() {
        let parens = format!("{}x{}", "(".repeat(50_000), ")".repeat(50_000));
        assert_eq!(normalize(&parens), Err(ParseError::TooDeep { index: 500 }));

        let bars = format!("{}x{}", "|".repeat(50_000), "|".repeat(50_000));
        assert_eq!(normalize(&bars), Err(ParseError::TooDeep { index: 500 }));

        let calls = format!("{}x{}", "sin(".repeat(1_000), ")".repeat(1_000));
        assert_eq!(normalize(&calls), Err(ParseError::TooDeep { index: 2_003 }));
    }

    #[test]
    fn it_forwards_lexer_errors() {
        assert_eq!(normalize("x # 2"), Err(ParseError::UnknownToken { index: 2 }));
    }
}
