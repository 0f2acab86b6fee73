extern crate num_bigint;
extern crate num_rational;
extern crate num_traits;
extern crate thiserror;
extern crate tracing;

pub mod config;
pub mod elementary;
pub mod expression;
pub mod lexer;
pub mod node;
pub mod normalize;
pub mod parser;
pub mod quadrature;

mod error;

pub use config::Config;
pub use error::Error;
pub use expression::{compile, compile_with, Expression};
pub use normalize::normalize;
pub use quadrature::{integrate, DEFAULT_SUBDIVISIONS};

use tracing::debug;

/// The result of integrating user-typed text.
#[derive(Debug, Clone, PartialEq)]
pub struct Integral {
    /// The text that was compiled, as returned by [`normalize`]
    pub normalized: String,
    pub value: f64,
}

/// Integrates the raw, user-typed function `raw` over `[a, b]` with `n`
/// subdivisions.
///
/// This runs the whole pipeline: the text is normalized, compiled against an
/// elementary function library built from `config`, and handed to the Simpson
/// driver.
pub fn integrate_raw(
    raw: &str,
    a: f64,
    b: f64,
    n: i64,
    config: &Config,
) -> Result<Integral, Error> {
    let normalized = normalize(raw)?;
    debug!("normalized {:?} into {:?}", raw, normalized);

    let expr = compile_with(&normalized, *config)?;
    let value = integrate(|x| expr.eval(x), a, b, n)?;
    Ok(Integral { normalized, value })
}

/// Same as [`integrate_raw`], keeping only the value.
pub fn integrate_str(raw: &str, a: f64, b: f64, n: i64, config: &Config) -> Result<f64, Error> {
    integrate_raw(raw, a, b, n, config).map(|integral| integral.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::elementary::MathError;
    use crate::node::EvalError;
    use crate::parser::ParseError;
    use crate::quadrature::QuadratureError;

    #[test]
    fn it_runs_the_whole_pipeline() {
        let result = integrate_str("3x^2", 0.0, 1.0, 2, &Config::default()).unwrap();
        assert!((result - 1.0).abs() < 1e-15);
    }

    #[test]
    fn it_returns_the_normalized_text() {
        let integral = integrate_raw("2x", 0.0, 1.0, 2, &Config::default()).unwrap();
        assert_eq!(integral.normalized, "2*x");
        assert!((integral.value - 1.0).abs() < 1e-15);
    }

    #[test]
    fn it_reports_parse_errors_before_sampling() {
        assert_eq!(
            integrate_str("|x", 0.0, 1.0, 3, &Config::default()),
            Err(Error::Parse(ParseError::UnmatchedBar { index: 0 }))
        );
    }

    #[test]
    fn it_annotates_failures_with_the_sample_point() {
        assert_eq!(
            integrate_str("sqrt(x)", -1.0, 1.0, 2, &Config::default()),
            Err(Error::Quadrature(QuadratureError::Sample {
                x: -1.0,
                source: EvalError::Math(MathError::Domain {
                    function: "sqrt",
                    arg: -1.0,
                }),
            }))
        );
    }
}
