use super::{domain, Elementary, MathError, FRAC_PI_2, PI};

// 2π split into a head and a tail so `x - k * 2π` keeps the bits a single
// constant would lose
const TAU_HI: f64 = 6.283185307179586;
const TAU_LO: f64 = 2.4492935982947064e-16;

/// Divisors below this magnitude are treated as a pole of tan, sec, csc and
/// cot.
const POLE_TOLERANCE: f64 = 1e-10;

/// Maps `x` into [-π, π].
fn reduce_angle(x: f64) -> f64 {
    let k = (x / TAU_HI).round();
    (x - k * TAU_HI) - k * TAU_LO
}

impl Elementary {
    /// Sine from its Maclaurin series.
    ///
    /// Accurate to about 1e-13 for |x| <= 1000. The error grows with |x|
    /// because 2π is only known to double precision.
    pub fn sin(&self, x: f64) -> f64 {
        let mut r = reduce_angle(x);
        if r > FRAC_PI_2 {
            r = PI - r;
        } else if r < -FRAC_PI_2 {
            r = -PI - r;
        }
        self.sin_series(r)
    }

    /// Cosine from its Maclaurin series, with the same accuracy as
    /// [`Elementary::sin`].
    pub fn cos(&self, x: f64) -> f64 {
        let r = reduce_angle(x).abs();
        if r > FRAC_PI_2 {
            -self.cos_series(PI - r)
        } else {
            self.cos_series(r)
        }
    }

    pub fn tan(&self, x: f64) -> Result<f64, MathError> {
        let c = self.cos(x);
        if c.abs() < POLE_TOLERANCE {
            return Err(domain("tan", x));
        }
        Ok(self.sin(x) / c)
    }

    pub fn sec(&self, x: f64) -> Result<f64, MathError> {
        let c = self.cos(x);
        if c.abs() < POLE_TOLERANCE {
            return Err(domain("sec", x));
        }
        Ok(1.0 / c)
    }

    pub fn csc(&self, x: f64) -> Result<f64, MathError> {
        let s = self.sin(x);
        if s.abs() < POLE_TOLERANCE {
            return Err(domain("csc", x));
        }
        Ok(1.0 / s)
    }

    pub fn cot(&self, x: f64) -> Result<f64, MathError> {
        let s = self.sin(x);
        if s.abs() < POLE_TOLERANCE {
            return Err(domain("cot", x));
        }
        Ok(self.cos(x) / s)
    }

    /// Arcsine, defined on [-1, 1].
    ///
    /// The series converges slowly near ±1, so for |x| > 1/2 the identity
    /// `asin x = π/2 - 2 asin(sqrt((1 - x) / 2))` brings the argument back
    /// below 1/2.
    pub fn asin(&self, x: f64) -> Result<f64, MathError> {
        self.asin_named(x, "asin")
    }

    /// Arccosine, `π/2 - asin x`.
    pub fn acos(&self, x: f64) -> Result<f64, MathError> {
        Ok(FRAC_PI_2 - self.asin_named(x, "acos")?)
    }

    /// Arctangent.
    ///
    /// Large arguments are reflected through `atan x = ±π/2 - atan(1/x)` and
    /// the rest halved once through `atan x = 2 atan(x / (1 + sqrt(1 + x²)))`
    /// so the series argument stays below 0.42.
    pub fn atan(&self, x: f64) -> Result<f64, MathError> {
        if x.is_nan() {
            return Err(domain("atan", x));
        }
        if x.abs() > 1.0 {
            let half_turn = if x > 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
            return Ok(half_turn - self.atan(1.0 / x)?);
        }
        if x.abs() > 0.4 {
            let halved = x / (1.0 + self.sqrt(1.0 + x * x)?);
            return Ok(2.0 * self.atan_series(halved)?);
        }
        self.atan_series(x)
    }

    fn asin_named(&self, x: f64, function: &'static str) -> Result<f64, MathError> {
        // also rejects NaN
        if !(x.abs() <= 1.0) {
            return Err(domain(function, x));
        }
        if x.abs() <= 0.5 {
            return self.asin_series(x, function);
        }

        let inner = self.sqrt((1.0 - x.abs()) * 0.5)?;
        let folded = FRAC_PI_2 - 2.0 * self.asin_series(inner, function)?;
        Ok(if x < 0.0 { -folded } else { folded })
    }

    fn sin_series(&self, r: f64) -> f64 {
        let r_sqr = r * r;
        let mut term = r;
        let mut sum = r;
        for n in 1..self.config.sin_cos_terms {
            let k = (2 * n) as f64;
            term *= -r_sqr / (k * (k + 1.0));
            sum += term;
        }
        sum
    }

    fn cos_series(&self, r: f64) -> f64 {
        let r_sqr = r * r;
        let mut term = 1.0;
        let mut sum = 1.0;
        for n in 1..self.config.sin_cos_terms {
            let k = (2 * n) as f64;
            term *= -r_sqr / ((k - 1.0) * k);
            sum += term;
        }
        sum
    }

    fn asin_series(&self, x: f64, function: &'static str) -> Result<f64, MathError> {
        let x_sqr = x * x;
        let mut term = x;
        let mut sum = x;
        for n in 1..=self.config.max_iterations {
            let odd = (2 * n - 1) as f64;
            let even = (2 * n) as f64;
            term *= odd * odd * x_sqr / (even * (even + 1.0));
            if term.abs() < self.config.series_tolerance {
                return Ok(sum);
            }
            sum += term;
        }

        Err(MathError::Convergence {
            function,
            iterations: self.config.max_iterations,
        })
    }

    fn atan_series(&self, x: f64) -> Result<f64, MathError> {
        let x_sqr = x * x;
        let mut power = x;
        let mut sum = x;
        for n in 1..=self.config.max_iterations {
            power *= -x_sqr;
            let term = power / (2 * n + 1) as f64;
            if term.abs() < self.config.series_tolerance {
                return Ok(sum);
            }
            sum += term;
        }

        Err(MathError::Convergence {
            function: "atan",
            iterations: self.config.max_iterations,
        })
    }
}
