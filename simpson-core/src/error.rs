use thiserror::Error;

use crate::parser::ParseError;
use crate::quadrature::QuadratureError;

/// Any error that can end an integration call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid expression")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Quadrature(#[from] QuadratureError),
}
