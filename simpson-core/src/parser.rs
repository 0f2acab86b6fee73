use thiserror::Error;

use crate::lexer::{IdentKind, LexerError, LexerErrorKind, Token, TokenKind};
use crate::node::{ConstKind, Node};

/// How deep parentheses, bars, calls, unary signs and operator chains may
/// nest. It bounds the height of every tree the parser builds, and with it
/// the recursion of evaluation.
pub const MAX_DEPTH: usize = 500;

#[derive(PartialEq, Eq)]
enum StopPolicy {
    IfWeaker(Power),
    IfWeakerOrEqual(Power),
    Never,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum Power {
    CloseParen,
    Add,
    Mul,
    Exp,
}

impl Power {
    fn of(kind: &TokenKind) -> Option<Power> {
        Some(match kind {
            TokenKind::CloseParen => Power::CloseParen,
            TokenKind::Plus | TokenKind::Minus => Power::Add,
            TokenKind::Times | TokenKind::Slash => Power::Mul,
            TokenKind::Pow => Power::Exp,
            _ => return None,
        })
    }
}

/// A description of why an expression could not be read. Indices are byte
/// offsets into the text that was given.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown token at index {index}")]
    UnknownToken { index: usize },

    #[error("number at index {index} is out of range")]
    NumberOutOfRange { index: usize },

    #[error("unexpected end of expression")]
    EarlyEof,

    #[error("unexpected token at index {index}")]
    UnexpectedToken { index: usize },

    #[error("unmatched parenthesis at index {index}")]
    UnmatchedParen { index: usize },

    #[error("unmatched absolute value bar at index {index}")]
    UnmatchedBar { index: usize },

    #[error("missing operator between numbers at index {index}")]
    AdjacentNumbers { index: usize },

    #[error("function at index {index} must be followed by `(`")]
    MissingCallParen { index: usize },

    #[error("unknown identifier `{name}` at index {index}")]
    UnknownIdentifier { name: String, index: usize },

    #[error("expression nests too deeply at index {index}")]
    TooDeep { index: usize },
}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> ParseError {
        match err.kind {
            LexerErrorKind::UnknownToken => ParseError::UnknownToken { index: err.index },
            LexerErrorKind::NumberOutOfRange => ParseError::NumberOutOfRange { index: err.index },
        }
    }
}

/// A parser converts a list of tokens into an AST (abstract syntax tree).
///
/// It reads the normalized language only: every multiplication is explicit,
/// powers are written `**` and absolute values `abs(...)`.
pub struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &[Token]) -> Parser {
        Parser {
            tokens,
            index: 0,
            depth: 0,
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let token = self.tokens.get(self.index).cloned().ok_or(ParseError::EarlyEof)?;
        self.index += 1;
        Ok(token)
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let index = self
                .tokens
                .get(self.index)
                .or_else(|| self.tokens.last())
                .map_or(0, |t| t.index);
            return Err(ParseError::TooDeep { index });
        }
        Ok(())
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        self.tokens.get(self.index).map_or(false, |t| &t.kind == kind)
    }

    /// Parses a parenthesized expression whose `(` is the next token.
    fn parse_paren(&mut self) -> Result<Node, ParseError> {
        let open = self.next_token()?;
        debug_assert_eq!(open.kind, TokenKind::OpenParen);

        let expr = self.parse_range(&StopPolicy::IfWeakerOrEqual(Power::CloseParen))?;
        if !self.peek_is(&TokenKind::CloseParen) {
            return Err(ParseError::UnmatchedParen { index: open.index });
        }

        // consume the parenthesis
        self.index += 1;
        Ok(expr)
    }

    fn parse_nud(&mut self) -> Result<Node, ParseError> {
        let token = self.next_token()?;

        Ok(match token.kind {
            TokenKind::Num(val) => Node::Num(val),
            TokenKind::Ident(kind) => match kind {
                IdentKind::X => Node::Var,
                // constants
                IdentKind::Pi => Node::Const(ConstKind::Pi),
                IdentKind::E => Node::Const(ConstKind::E),
                // functions
                IdentKind::Func(func) => {
                    if !self.peek_is(&TokenKind::OpenParen) {
                        return Err(ParseError::MissingCallParen { index: token.index });
                    }
                    Node::Call(func, Box::new(self.parse_paren()?))
                }
            },
            TokenKind::UnknownIdent(name) => {
                if self.peek_is(&TokenKind::OpenParen) {
                    Node::UnknownCall(name, Box::new(self.parse_paren()?))
                } else {
                    Node::UnknownIdent(name)
                }
            }

            // unary operators bind tighter than `*` but looser than `**`
            TokenKind::Minus => -self.parse_range(&StopPolicy::IfWeakerOrEqual(Power::Mul))?,
            TokenKind::Plus => self.parse_range(&StopPolicy::IfWeakerOrEqual(Power::Mul))?,
            TokenKind::OpenParen => {
                self.index -= 1;
                self.parse_paren()?
            }

            _ => return Err(ParseError::UnexpectedToken { index: token.index }),
        })
    }

    fn parse_led(&mut self, left: Node) -> Result<Node, ParseError> {
        let token = self.next_token()?;

        Ok(match token.kind {
            // left associativity
            TokenKind::Plus => left + self.parse_range(&StopPolicy::IfWeakerOrEqual(Power::Add))?,
            TokenKind::Minus => left - self.parse_range(&StopPolicy::IfWeakerOrEqual(Power::Add))?,
            TokenKind::Times => left * self.parse_range(&StopPolicy::IfWeakerOrEqual(Power::Mul))?,
            TokenKind::Slash => left / self.parse_range(&StopPolicy::IfWeakerOrEqual(Power::Mul))?,

            // right associativity: 1**2**3 is parsed as pow(1, pow(2, 3)), not pow(pow(1, 2), 3)
            TokenKind::Pow => left.pow(self.parse_range(&StopPolicy::IfWeaker(Power::Exp))?),

            TokenKind::CloseParen => return Err(ParseError::UnmatchedParen { index: token.index }),
            _ => return Err(ParseError::UnexpectedToken { index: token.index }),
        })
    }

    fn parse_range(&mut self, policy: &StopPolicy) -> Result<Node, ParseError> {
        let outer = self.depth;
        self.descend()?;
        let mut node = self.parse_nud()?;

        while let Some(peek) = self.tokens.get(self.index) {
            // There are multiple modes to tell the parser when to stop. For
            // example, if we are parsing an expression inside of parentheses,
            // we want to stop when we encounter a closing parenthesis.
            // Tokens that are not operators never stop the loop so that the
            // led reports them.
            let stop = match (policy, Power::of(&peek.kind)) {
                (StopPolicy::IfWeaker(min_power), Some(power)) => power < *min_power,
                (StopPolicy::IfWeakerOrEqual(min_power), Some(power)) => power <= *min_power,
                _ => false,
            };
            if stop {
                break;
            }

            // every operator puts the tree built so far one level down
            self.descend()?;
            node = self.parse_led(node)?;
        }

        self.depth = outer;
        Ok(node)
    }

    pub fn parse(mut self) -> Result<Node, ParseError> {
        self.parse_range(&StopPolicy::Never)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::elementary::Func;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Result<Node, ParseError> {
        let tokens = Lexer::new(src).collect::<Result<Vec<Token>, _>>()?;
        Parser::new(&tokens).parse()
    }

    fn num(val: f64) -> Node {
        Node::Num(val)
    }

    #[test]
    fn it_handles_precedence_correctly() {
        assert_eq!(
            parse("1+2*x**3").unwrap(),
            num(1.0) + num(2.0) * Node::Var.pow(num(3.0))
        );
        assert_eq!(
            parse("1-2-3").unwrap(),
            (num(1.0) - num(2.0)) - num(3.0)
        );
        assert_eq!(
            parse("8/4/2").unwrap(),
            (num(8.0) / num(4.0)) / num(2.0)
        );
    }

    #[test]
    fn it_makes_powers_right_associative() {
        assert_eq!(
            parse("2**3**2").unwrap(),
            num(2.0).pow(num(3.0).pow(num(2.0)))
        );
    }

    #[test]
    fn it_binds_unary_minus_looser_than_powers() {
        assert_eq!(parse("-x**2").unwrap(), -Node::Var.pow(num(2.0)));
        assert_eq!(parse("2**-1").unwrap(), num(2.0).pow(-num(1.0)));
        assert_eq!(parse("-x*2").unwrap(), -Node::Var * num(2.0));
        assert_eq!(parse("x*-2").unwrap(), Node::Var * -num(2.0));
        assert_eq!(parse("+x").unwrap(), Node::Var);
    }

    #[test]
    fn it_handles_precedence_correctly_with_functions() {
        assert_eq!(
            parse("sin(cos(sqrt(1)))").unwrap(),
            num(1.0).call(Func::Sqrt).call(Func::Cos).call(Func::Sin)
        );
        assert_eq!(
            parse("exp(x)**2").unwrap(),
            Node::Var.call(Func::Exp).pow(num(2.0))
        );
    }

    #[test]
    fn it_keeps_unknown_names_for_later() {
        assert_eq!(
            parse("y+foo(x)").unwrap(),
            Node::UnknownIdent("y".to_string())
                + Node::UnknownCall("foo".to_string(), Box::new(Node::Var))
        );
    }

    #[test]
    fn it_requires_parentheses_around_arguments() {
        assert_eq!(
            parse("1+sin x"),
            Err(ParseError::MissingCallParen { index: 2 })
        );
    }

    #[test]
    fn it_reports_unmatched_parentheses() {
        assert_eq!(parse("(x"), Err(ParseError::UnmatchedParen { index: 0 }));
        assert_eq!(parse("x)"), Err(ParseError::UnmatchedParen { index: 1 }));
        assert_eq!(
            parse("sin((x)"),
            Err(ParseError::UnmatchedParen { index: 3 })
        );
    }

    #[test]
    fn it_rejects_the_raw_notation() {
        assert_eq!(parse("x^2"), Err(ParseError::UnexpectedToken { index: 1 }));
        assert_eq!(parse("|x|"), Err(ParseError::UnexpectedToken { index: 0 }));
        assert_eq!(parse("2x"), Err(ParseError::UnexpectedToken { index: 1 }));
    }

    #[test]
    fn it_reports_truncated_expressions() {
        assert_eq!(parse(""), Err(ParseError::EarlyEof));
        assert_eq!(parse("x+"), Err(ParseError::EarlyEof));
        assert_eq!(parse("()"), Err(ParseError::UnexpectedToken { index: 1 }));
    }

    #[test]
    fn it_limits_nesting() {
        let deep = format!("{}x{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(parse(&deep), Err(ParseError::TooDeep { index: 500 }));

        let signs = format!("{}x", "-".repeat(10_000));
        assert_eq!(parse(&signs), Err(ParseError::TooDeep { index: 500 }));

        let sum = format!("x{}", "+x".repeat(10_000));
        assert_eq!(parse(&sum), Err(ParseError::TooDeep { index: 998 }));

        let fine = format!("{}x{}", "(".repeat(400), ")".repeat(400));
        assert_eq!(parse(&fine), Ok(Node::Var));
    }

    #[test]
    fn it_forwards_lexer_errors() {
        assert_eq!(parse("x+$"), Err(ParseError::UnknownToken { index: 2 }));
    }
}
