use thiserror::Error;

use super::{ConstKind, Node};
use crate::elementary::{Elementary, MathError, E, PI};

/// A description of the error of a calculation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error("division by zero")]
    DivisionByZero,

    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),

    #[error("value is not a finite number")]
    Overflow,
}

fn finite(val: f64) -> Result<f64, EvalError> {
    if val.is_finite() {
        Ok(val)
    } else {
        Err(EvalError::Overflow)
    }
}

impl Node {
    /// Computes the node value at `x`.
    ///
    /// Every intermediate value must be finite, so an infinity or NaN
    /// anywhere in the tree ends the evaluation instead of reaching the
    /// caller.
    pub fn eval(&self, x: f64, lib: &Elementary) -> Result<f64, EvalError> {
        let val = match self {
            Node::Num(val) => *val,
            Node::Var => x,
            Node::Const(ConstKind::Pi) => PI,
            Node::Const(ConstKind::E) => E,
            Node::UnknownIdent(name) | Node::UnknownCall(name, _) => {
                return Err(EvalError::UnknownIdentifier(name.clone()))
            }
            Node::Neg(inner) => -inner.eval(x, lib)?,
            Node::Add(a, b) => a.eval(x, lib)? + b.eval(x, lib)?,
            Node::Sub(a, b) => a.eval(x, lib)? - b.eval(x, lib)?,
            Node::Mul(a, b) => a.eval(x, lib)? * b.eval(x, lib)?,
            Node::Div(a, b) => {
                let numer = a.eval(x, lib)?;
                let denom = b.eval(x, lib)?;
                if denom == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                numer / denom
            }
            Node::Pow(a, b) => lib.pow(a.eval(x, lib)?, b.eval(x, lib)?)?,
            Node::Call(func, inner) => lib.apply(*func, inner.eval(x, lib)?)?,
        };

        finite(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::elementary::Func;

    fn eval(node: &Node, x: f64) -> Result<f64, EvalError> {
        node.eval(x, &Elementary::default())
    }

    #[test]
    fn it_substitutes_the_variable() {
        // 2x^2 + |x - 3|
        let node = Node::Num(2.0) * Node::Var.pow(Node::Num(2.0))
            + (Node::Var - Node::Num(3.0)).call(Func::Abs);
        assert_eq!(eval(&node, 0.0), Ok(3.0));
        assert_eq!(eval(&node, 4.0), Ok(33.0));
        assert_eq!(eval(&node, -1.0), Ok(6.0));
    }

    #[test]
    fn it_evaluates_constants() {
        assert_eq!(eval(&Node::Const(ConstKind::Pi), 0.0), Ok(PI));
        assert_eq!(eval(&Node::Const(ConstKind::E), 0.0), Ok(E));
        assert_eq!(eval(&-Node::Num(1.5), 0.0), Ok(-1.5));
    }

    #[test]
    fn it_rejects_division_by_zero() {
        let node = Node::Num(1.0) / Node::Var;
        assert_eq!(eval(&node, 0.0), Err(EvalError::DivisionByZero));
        assert_eq!(eval(&node, 4.0), Ok(0.25));
    }

    #[test]
    fn it_rejects_non_finite_values() {
        let node = Node::Var.call(Func::Exp);
        assert_eq!(eval(&node, 1000.0), Err(EvalError::Overflow));

        let node = Node::Num(10.0).pow(Node::Var);
        assert_eq!(eval(&node, 400.0), Err(EvalError::Overflow));
    }

    #[test]
    fn it_forwards_domain_errors() {
        let node = Node::Var.call(Func::Ln);
        assert_eq!(
            eval(&node, -1.0),
            Err(EvalError::Math(MathError::Domain {
                function: "log",
                arg: -1.0
            }))
        );
    }

    #[test]
    fn it_fails_on_unknown_identifiers() {
        let node = Node::Var + Node::UnknownIdent("y".to_string());
        assert_eq!(
            eval(&node, 1.0),
            Err(EvalError::UnknownIdentifier("y".to_string()))
        );

        let node = Node::UnknownCall("foo".to_string(), Box::new(Node::Var));
        assert_eq!(
            eval(&node, 1.0),
            Err(EvalError::UnknownIdentifier("foo".to_string()))
        );
    }
}
