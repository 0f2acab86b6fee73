extern crate clap;
extern crate simpson_core;
extern crate thiserror;
extern crate tracing;
extern crate tracing_subscriber;

use std::error::Error as StdError;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use simpson_core::node::EvalError;
use simpson_core::parser::ParseError;
use simpson_core::{integrate_raw, Config, Expression, DEFAULT_SUBDIVISIONS};

const FUNCTION_PROMPT: &str = "Enter the function f(x) : \n\
(Input Example:\n sin(x) + cos(x), log(2x+3),\n asin(x) + acos(x) where 'a' means arc,\n \
2x/(4x^2 + 1), (x^2 + 2x +3)/|2x-3| ...etc) \n==>";

// Command args parser
#[derive(Debug, Parser)]
#[command(author, version, about = "Simpson's rule numerical integration", long_about = None)]
struct Args {
    /// The function of x to integrate, like `2x^2 + |x-3|`
    #[clap(allow_hyphen_values = true)]
    function: Option<String>,

    /// Lower limit of integration, any constant expression like `-pi/2`
    #[clap(short = 'a', long = "lower", allow_hyphen_values = true)]
    lower: Option<String>,

    /// Upper limit of integration
    #[clap(short = 'b', long = "upper", allow_hyphen_values = true)]
    upper: Option<String>,

    /// Number of subintervals, must be even and at least 2
    #[clap(short = 'n', long = "subdivisions", default_value_t = DEFAULT_SUBDIVISIONS, allow_negative_numbers = true)]
    subdivisions: i64,

    /// Maclaurin terms summed by sin and cos
    #[clap(long)]
    sin_cos_terms: Option<usize>,

    /// Taylor terms summed by exp
    #[clap(long)]
    exp_terms: Option<usize>,

    /// Smallest term magnitude kept by log, asin and atan
    #[clap(long)]
    series_tolerance: Option<f64>,

    /// Relative stopping tolerance of the square root iteration
    #[clap(long)]
    newton_tolerance: Option<f64>,

    /// Cap on series terms and Newton steps
    #[clap(long)]
    max_iterations: Option<usize>,

    /// Log more, up to -vvv
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(terms) = self.sin_cos_terms {
            config = config.with_sin_cos_terms(terms);
        }
        if let Some(terms) = self.exp_terms {
            config = config.with_exp_terms(terms);
        }
        if let Some(tolerance) = self.series_tolerance {
            config = config.with_series_tolerance(tolerance);
        }
        if let Some(tolerance) = self.newton_tolerance {
            config = config.with_newton_tolerance(tolerance);
        }
        if let Some(iterations) = self.max_iterations {
            config = config.with_max_iterations(iterations);
        }
        config
    }
}

/// Why a bound could not be turned into a number.
#[derive(Debug, Error)]
enum BoundError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("a bound cannot depend on x")]
    NotConstant,

    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read the {what}")]
    Input {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("no {0} was given")]
    MissingInput(&'static str),

    #[error("invalid {what} `{text}`")]
    InvalidBound {
        what: &'static str,
        text: String,
        #[source]
        source: BoundError,
    },

    #[error(transparent)]
    Integration(#[from] simpson_core::Error),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over the command line
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Takes the value given on the command line, or asks for it on stdin.
fn arg_or_prompt(
    arg: Option<String>,
    prompt: &str,
    what: &'static str,
) -> Result<String, CliError> {
    if let Some(val) = arg {
        return Ok(val);
    }

    let mut stdout = io::stdout();
    let mut line = String::new();
    let read = stdout
        .write_all(prompt.as_bytes())
        .and_then(|_| stdout.flush())
        .and_then(|_| io::stdin().lock().read_line(&mut line))
        .map_err(|source| CliError::Input { what, source })?;

    let line = line.trim();
    if read == 0 || line.is_empty() {
        return Err(CliError::MissingInput(what));
    }
    Ok(line.to_string())
}

/// Reads a bound as a plain number first, so that exponent notation like
/// `1e-3` keeps its meaning, then as a constant expression like `pi/2`.
fn parse_bound(text: &str, config: Config) -> Result<f64, BoundError> {
    if let Ok(val) = text.trim().parse::<f64>() {
        // `inf` and `nan` are left to the expression reader, which rejects them
        if val.is_finite() {
            return Ok(val);
        }
    }

    let expr = Expression::parse_with(text, config)?;
    if !expr.is_constant() {
        return Err(BoundError::NotConstant);
    }
    Ok(expr.eval(0.0)?)
}

fn read_bound(
    arg: Option<String>,
    prompt: &str,
    what: &'static str,
    config: Config,
) -> Result<f64, CliError> {
    let text = arg_or_prompt(arg, prompt, what)?;
    parse_bound(&text, config).map_err(|source| CliError::InvalidBound { what, text, source })
}

fn run(args: Args) -> Result<(), CliError> {
    let config = args.config();
    debug!("using {:?}", config);

    if args.function.is_none() {
        println!("Simpson's Rule Numerical Integration");
        println!("-----------------------------------");
    }
    let function = arg_or_prompt(args.function, FUNCTION_PROMPT, "function")?;
    let a = read_bound(
        args.lower,
        "Enter the lower limit of integration (a): ",
        "lower limit",
        config,
    )?;
    let b = read_bound(
        args.upper,
        "Enter the upper limit of integration (b): ",
        "upper limit",
        config,
    )?;

    let integral = integrate_raw(&function, a, b, args.subdivisions, &config)?;
    println!("f(x) = {}", integral.normalized);
    println!(
        "\nThe approximate integral of f(x) from {} to {} is: {:.6}",
        a, b, integral.value
    );
    Ok(())
}

fn report(err: &dyn StdError) {
    eprintln!("error: {}", err);

    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}
