//! Elementary functions computed from truncated series and Newton iteration.
//!
//! Nothing here calls into the platform math library. Only the exact IEEE-754
//! operations of `f64` (arithmetic, `abs`, `round`, bit access) are used.

mod trig;

use std::str::FromStr;

use thiserror::Error;

use crate::config::Config;

pub const PI: f64 = 3.141592653589793;
pub const FRAC_PI_2: f64 = 1.5707963267948966;
pub const E: f64 = 2.718281828459045;

const LN_2: f64 = 0.6931471805599453;
const SQRT_2: f64 = 1.4142135623730951;
const TWO_POW_54: f64 = 18014398509481984.0;

/// A description of why an elementary function could not produce a value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MathError {
    #[error("{function}({arg}) is undefined")]
    Domain { function: &'static str, arg: f64 },

    #[error("{function} did not converge within {iterations} iterations")]
    Convergence {
        function: &'static str,
        iterations: usize,
    },
}

fn domain(function: &'static str, arg: f64) -> MathError {
    MathError::Domain { function, arg }
}

/// Every function an expression is allowed to call.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
    Asin,
    Acos,
    Atan,
    Exp,
    Ln,
    Sqrt,
    Abs,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Sec => "sec",
            Func::Csc => "csc",
            Func::Cot => "cot",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Exp => "exp",
            Func::Ln => "log",
            Func::Sqrt => "sqrt",
            Func::Abs => "abs",
        }
    }
}

impl FromStr for Func {
    type Err = ();

    fn from_str(s: &str) -> Result<Func, ()> {
        Ok(match s {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "sec" => Func::Sec,
            "csc" | "cosec" => Func::Csc,
            "cot" => Func::Cot,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "exp" => Func::Exp,
            "log" | "ln" => Func::Ln,
            "sqrt" => Func::Sqrt,
            "abs" => Func::Abs,
            _ => return Err(()),
        })
    }
}

/// The elementary function library, parameterized by its series depths and
/// tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Elementary {
    config: Config,
}

impl Elementary {
    pub fn new(config: Config) -> Elementary {
        Elementary { config }
    }

    /// Calls `func` on `x`.
    pub fn apply(&self, func: Func, x: f64) -> Result<f64, MathError> {
        Ok(match func {
            Func::Sin => self.sin(x),
            Func::Cos => self.cos(x),
            Func::Tan => self.tan(x)?,
            Func::Sec => self.sec(x)?,
            Func::Csc => self.csc(x)?,
            Func::Cot => self.cot(x)?,
            Func::Asin => self.asin(x)?,
            Func::Acos => self.acos(x)?,
            Func::Atan => self.atan(x)?,
            Func::Exp => self.exp(x),
            Func::Ln => self.ln(x)?,
            Func::Sqrt => self.sqrt(x)?,
            Func::Abs => x.abs(),
        })
    }

    /// e^x from its Taylor series.
    ///
    /// The series is summed for `x / 2^k` with `k` chosen so that the reduced
    /// argument lies in [-1, 1], then squared `k` times. Relative error grows
    /// roughly like `2^k` ulp, which stays below 1e-12 for |x| <= 709. Beyond
    /// that the true value leaves the `f64` range and the result is infinite
    /// (or zero for large negative x).
    pub fn exp(&self, x: f64) -> f64 {
        // halving never shrinks an infinite argument
        if x.is_infinite() {
            return if x > 0.0 { x } else { 0.0 };
        }

        let mut reduced = x;
        let mut squarings = 0;
        while reduced.abs() > 1.0 {
            reduced *= 0.5;
            squarings += 1;
        }

        let mut sum = 1.0;
        let mut term = 1.0;
        for n in 1..self.config.exp_terms {
            term *= reduced / n as f64;
            sum += term;
        }

        for _ in 0..squarings {
            sum *= sum;
        }
        sum
    }

    /// Natural logarithm, defined for x > 0.
    ///
    /// The argument is split into `m * 2^e` with `m` in [sqrt(1/2), sqrt(2)],
    /// so the atanh series `2 * (u + u^3/3 + u^5/5 + ...)` with
    /// `u = (m - 1)/(m + 1)` never sees |u| above 0.172.
    pub fn ln(&self, x: f64) -> Result<f64, MathError> {
        // also rejects NaN
        if !(x > 0.0) || x.is_infinite() {
            return Err(domain("log", x));
        }

        let (mantissa, exponent) = split_exponent(x);
        let u = (mantissa - 1.0) / (mantissa + 1.0);
        let u_sqr = u * u;

        let mut power = u;
        let mut sum = u;
        for k in 1..=self.config.max_iterations {
            power *= u_sqr;
            let term = power / (2 * k + 1) as f64;
            if term.abs() < self.config.series_tolerance {
                return Ok(2.0 * sum + exponent as f64 * LN_2);
            }
            sum += term;
        }

        Err(MathError::Convergence {
            function: "log",
            iterations: self.config.max_iterations,
        })
    }

    /// Square root by Newton-Raphson iteration.
    pub fn sqrt(&self, x: f64) -> Result<f64, MathError> {
        if !(x >= 0.0) {
            return Err(domain("sqrt", x));
        }
        if x == 0.0 || x.is_infinite() {
            return Ok(x);
        }

        // 2^(e/2) is within a factor of two of the root
        let (_, exponent) = split_exponent(x);
        let mut guess = pow2(exponent / 2);

        for _ in 0..self.config.max_iterations {
            let next = 0.5 * (guess + x / guess);
            if (next - guess).abs() <= self.config.newton_tolerance * next {
                return Ok(next);
            }
            guess = next;
        }

        Err(MathError::Convergence {
            function: "sqrt",
            iterations: self.config.max_iterations,
        })
    }

    /// `base` raised to `exponent`.
    ///
    /// Integer exponents use binary exponentiation and accept any base. Other
    /// exponents go through `exp(exponent * ln(base))` and need a
    /// non-negative base.
    pub fn pow(&self, base: f64, exponent: f64) -> Result<f64, MathError> {
        if base == 0.0 {
            return if exponent > 0.0 {
                Ok(0.0)
            } else if exponent == 0.0 {
                Ok(1.0)
            } else {
                Err(domain("pow", base))
            };
        }

        if exponent.trunc() == exponent {
            // saturates for huge exponents, which overflow anyway
            let mut remaining = exponent.abs() as u64;
            let mut square = base;
            let mut result = 1.0;
            while remaining > 0 {
                if remaining & 1 == 1 {
                    result *= square;
                }
                square *= square;
                remaining >>= 1;
            }
            return Ok(if exponent < 0.0 { 1.0 / result } else { result });
        }

        if base < 0.0 || exponent.is_nan() {
            return Err(domain("pow", base));
        }
        Ok(self.exp(exponent * self.ln(base)?))
    }
}

/// Splits a positive finite `x` into `(m, e)` with `x = m * 2^e` and `m` in
/// [sqrt(1/2), sqrt(2)].
fn split_exponent(x: f64) -> (f64, i32) {
    // move subnormals into the normal range so the exponent bits are meaningful
    let (x, bias) = if x < std::f64::MIN_POSITIVE {
        (x * TWO_POW_54, -54)
    } else {
        (x, 0)
    };

    let bits = x.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i32 - 1023;
    let mantissa = f64::from_bits((bits & !(0x7ff << 52)) | (1023 << 52));

    if mantissa > SQRT_2 {
        (mantissa * 0.5, exponent + 1 + bias)
    } else {
        (mantissa, exponent + bias)
    }
}

/// 2^e for exponents in the normal range.
fn pow2(e: i32) -> f64 {
    f64::from_bits(((e + 1023) as u64) << 52)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn lib() -> Elementary {
        Elementary::default()
    }

    #[test]
    fn it_matches_exp_over_a_wide_range() {
        for i in -700..=700 {
            let x = i as f64 * 0.5 + 0.123;
            assert_relative_eq!(lib().exp(x), x.exp(), max_relative = 1e-12);
        }
        assert_eq!(lib().exp(0.0), 1.0);
    }

    #[test]
    fn it_overflows_exp_to_infinity() {
        assert!(lib().exp(1000.0).is_infinite());
        assert_eq!(lib().exp(-1000.0), 0.0);
    }

    #[test]
    fn it_handles_infinite_exponents() {
        assert_eq!(lib().exp(std::f64::INFINITY), std::f64::INFINITY);
        assert_eq!(lib().exp(std::f64::NEG_INFINITY), 0.0);
        assert!(lib().exp(std::f64::NAN).is_nan());
        assert_eq!(lib().pow(2.0, std::f64::INFINITY), Ok(std::f64::INFINITY));
    }

    #[test]
    fn it_matches_ln() {
        let samples = [
            1e-310, 1e-300, 1e-10, 0.1, 0.5, 0.9, 1.0, 1.1, 2.0, 3.0, 10.0, 1e10, 1e300, 1.7e308,
        ];
        for &x in samples.iter() {
            assert_relative_eq!(lib().ln(x).unwrap(), x.ln(), epsilon = 1e-15, max_relative = 1e-14);
        }
        for i in 1..=2000 {
            let x = i as f64 * 0.05;
            assert_abs_diff_eq!(lib().ln(x).unwrap(), x.ln(), epsilon = 1e-14);
        }
    }

    #[test]
    fn it_rejects_non_positive_logarithms() {
        assert_eq!(
            lib().ln(0.0),
            Err(MathError::Domain {
                function: "log",
                arg: 0.0
            })
        );
        assert_eq!(
            lib().ln(-1.0),
            Err(MathError::Domain {
                function: "log",
                arg: -1.0
            })
        );
        assert!(lib().ln(std::f64::NAN).is_err());
    }

    #[test]
    fn it_matches_sqrt() {
        let samples = [1e-310, 1e-300, 1e-10, 0.1, 0.5, 2.0, 3.0, 1e10, 1e300, 1.7e308];
        for &x in samples.iter() {
            assert_relative_eq!(lib().sqrt(x).unwrap(), x.sqrt(), max_relative = 1e-15);
        }
        for i in 1..=1000 {
            let x = i as f64 * 0.37;
            assert_relative_eq!(lib().sqrt(x).unwrap(), x.sqrt(), max_relative = 1e-15);
        }
    }

    #[test]
    fn it_handles_sqrt_edge_cases() {
        assert_eq!(lib().sqrt(0.0), Ok(0.0));
        assert_eq!(lib().sqrt(4.0), Ok(2.0));
        assert_eq!(
            lib().sqrt(-4.0),
            Err(MathError::Domain {
                function: "sqrt",
                arg: -4.0
            })
        );
    }

    #[test]
    fn it_reports_non_convergence() {
        let lib = Elementary::new(Config::default().with_max_iterations(2));
        assert_eq!(
            lib.sqrt(1e6),
            Err(MathError::Convergence {
                function: "sqrt",
                iterations: 2
            })
        );
        assert_eq!(
            lib.ln(1.3),
            Err(MathError::Convergence {
                function: "log",
                iterations: 2
            })
        );
    }

    #[test]
    fn it_computes_powers() {
        assert_eq!(lib().pow(2.0, 10.0), Ok(1024.0));
        assert_eq!(lib().pow(-2.0, 3.0), Ok(-8.0));
        assert_eq!(lib().pow(2.0, -2.0), Ok(0.25));
        assert_eq!(lib().pow(0.0, 0.0), Ok(1.0));
        assert_eq!(lib().pow(0.0, 2.5), Ok(0.0));
        assert_relative_eq!(lib().pow(2.0, 0.5).unwrap(), 2f64.sqrt(), max_relative = 1e-14);
        assert_relative_eq!(lib().pow(10.0, 1.7).unwrap(), 10f64.powf(1.7), max_relative = 1e-13);
    }

    #[test]
    fn it_rejects_undefined_powers() {
        assert_eq!(
            lib().pow(-2.0, 0.5),
            Err(MathError::Domain {
                function: "pow",
                arg: -2.0
            })
        );
        assert_eq!(
            lib().pow(0.0, -1.0),
            Err(MathError::Domain {
                function: "pow",
                arg: 0.0
            })
        );
    }

    #[test]
    fn it_resolves_function_names() {
        assert_eq!("ln".parse(), Ok(Func::Ln));
        assert_eq!("log".parse(), Ok(Func::Ln));
        assert_eq!("cosec".parse(), Ok(Func::Csc));
        assert_eq!("print".parse::<Func>(), Err(()));
    }
}
