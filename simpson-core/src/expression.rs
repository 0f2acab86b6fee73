use std::fmt;

use crate::config::Config;
use crate::elementary::Elementary;
use crate::lexer::{Lexer, Token};
use crate::node::{EvalError, Node};
use crate::normalize::normalize;
use crate::parser::{ParseError, Parser};

/// A compiled function of `x`, ready to be evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    root: Node,
    lib: Elementary,
}

/// Compiles normalized text with the default [`Config`].
pub fn compile(normalized: &str) -> Result<Expression, ParseError> {
    compile_with(normalized, Config::default())
}

/// Compiles normalized text into an [`Expression`] whose functions are tuned
/// by `config`.
pub fn compile_with(normalized: &str, config: Config) -> Result<Expression, ParseError> {
    let tokens = Lexer::new(normalized).collect::<Result<Vec<Token>, _>>()?;
    let root = Parser::new(&tokens).parse()?;

    Ok(Expression {
        root,
        lib: Elementary::new(config),
    })
}

impl Expression {
    /// Normalizes and compiles raw, user-typed text.
    pub fn parse(raw: &str) -> Result<Expression, ParseError> {
        Expression::parse_with(raw, Config::default())
    }

    pub fn parse_with(raw: &str, config: Config) -> Result<Expression, ParseError> {
        compile_with(&normalize(raw)?, config)
    }

    pub fn eval(&self, x: f64) -> Result<f64, EvalError> {
        self.root.eval(x, &self.lib)
    }

    /// Whether the expression never looks at `x`.
    pub fn is_constant(&self) -> bool {
        !self.root.depends_on_x()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    use crate::elementary::{MathError, FRAC_PI_2};

    #[test]
    fn it_evaluates_normalized_text() {
        let expr = compile("2*x**2+abs(x-3)").unwrap();
        assert_eq!(expr.eval(1.0), Ok(4.0));
        assert!(!expr.is_constant());
    }

    #[test]
    fn it_evaluates_raw_text() {
        let expr = Expression::parse("pi/2").unwrap();
        assert!(expr.is_constant());
        assert_eq!(expr.eval(0.0), Ok(FRAC_PI_2));

        let expr = Expression::parse("2sin(x)cos(x)").unwrap();
        assert_abs_diff_eq!(expr.eval(0.3).unwrap(), 0.6f64.sin(), epsilon = 1e-15);
    }

    #[test]
    fn it_reports_domain_errors_at_call_time() {
        let expr = compile("log(x)").unwrap();
        assert_eq!(
            expr.eval(-1.0),
            Err(EvalError::Math(MathError::Domain {
                function: "log",
                arg: -1.0
            }))
        );
    }

    #[test]
    fn it_reports_unknown_identifiers_at_call_time() {
        let expr = compile("x+y").unwrap();
        assert_eq!(
            expr.eval(1.0),
            Err(EvalError::UnknownIdentifier("y".to_string()))
        );
    }

    #[test]
    fn it_uses_the_given_config() {
        let expr = compile_with("sin(x)", Config::default().with_sin_cos_terms(1)).unwrap();
        assert_eq!(expr.eval(0.5), Ok(0.5));
    }

    #[test]
    fn it_displays_the_tree() {
        let expr = Expression::parse("3(x+1)^2").unwrap();
        assert_eq!(expr.to_string(), "3*(x + 1)**2");
    }
}
