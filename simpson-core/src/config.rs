/// Tuning knobs of the elementary function library.
///
/// Term counts and tolerances trade accuracy for speed. The defaults give
/// results within a few ulp of the correctly rounded value over the ranges
/// documented on each function of [`Elementary`](crate::elementary::Elementary).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Number of Maclaurin terms summed by `sin` and `cos`
    pub sin_cos_terms: usize,

    /// Number of Taylor terms summed by `exp`
    pub exp_terms: usize,

    /// Adaptive series (`log`, `asin`, `atan`) stop once a term's magnitude
    /// drops below this value
    pub series_tolerance: f64,

    /// Newton iteration for `sqrt` stops once two successive estimates differ
    /// by less than this fraction of the latest one
    pub newton_tolerance: f64,

    /// Upper bound on adaptive series terms and Newton steps
    pub max_iterations: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            sin_cos_terms: 15,
            exp_terms: 50,
            series_tolerance: 1e-15,
            newton_tolerance: 1e-15,
            max_iterations: 100,
        }
    }
}

impl Config {
    pub fn with_sin_cos_terms(mut self, terms: usize) -> Config {
        self.sin_cos_terms = terms;
        self
    }

    pub fn with_exp_terms(mut self, terms: usize) -> Config {
        self.exp_terms = terms;
        self
    }

    pub fn with_series_tolerance(mut self, tolerance: f64) -> Config {
        self.series_tolerance = tolerance;
        self
    }

    pub fn with_newton_tolerance(mut self, tolerance: f64) -> Config {
        self.newton_tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Config {
        self.max_iterations = iterations;
        self
    }
}
