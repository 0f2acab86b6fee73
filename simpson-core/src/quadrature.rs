use tracing::{debug, trace};
use thiserror::Error;

use crate::node::EvalError;

/// The subdivision count used when the caller has no preference.
pub const DEFAULT_SUBDIVISIONS: i64 = 100;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuadratureError {
    #[error("the number of subdivisions must be even and at least 2, got {n}")]
    InvalidSubdivision { n: i64 },

    #[error("the bounds must be finite, got [{a}, {b}]")]
    InvalidBounds { a: f64, b: f64 },

    #[error("cannot evaluate the function at x = {x}")]
    Sample {
        x: f64,
        #[source]
        source: EvalError,
    },
}

/// Approximates the integral of `f` over `[a, b]` with the composite Simpson
/// rule on `n` subintervals.
///
/// `n` must be even and at least 2; it is checked before `f` is called. The
/// `n + 1` samples are taken in increasing index order, and the first failing
/// one ends the computation. Swapping the bounds negates the result.
pub fn integrate<F>(f: F, a: f64, b: f64, n: i64) -> Result<f64, QuadratureError>
where
    F: Fn(f64) -> Result<f64, EvalError>,
{
    if n < 2 || n % 2 != 0 {
        return Err(QuadratureError::InvalidSubdivision { n });
    }
    if !a.is_finite() || !b.is_finite() {
        return Err(QuadratureError::InvalidBounds { a, b });
    }

    let h = (b - a) / n as f64;
    debug!("integrating over [{}, {}] with n = {} and h = {}", a, b, n, h);

    let sample = |i: i64| {
        // the last point is exactly b, whatever the rounding of a + n*h
        let x = if i == n { b } else { a + i as f64 * h };
        let y = f(x).map_err(|source| QuadratureError::Sample { x, source })?;
        trace!("f({}) = {}", x, y);
        Ok(y)
    };

    let mut sum = sample(0)?;
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * sample(i)?;
    }
    sum += sample(n)?;

    Ok(h / 3.0 * sum)
}
