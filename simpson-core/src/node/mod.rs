mod display;
mod eval;
pub use self::eval::*;

use std::ops::*;

use crate::elementary::Func;

/// A constant in mathematics
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ConstKind {
    Pi,
    E,
}

/// A node is an operation in the AST (abstract syntax tree).
#[derive(Debug, PartialEq, Clone)]
pub enum Node {
    Num(f64),
    /// The integration variable `x`
    Var,
    Const(ConstKind),
    /// A name that is neither `x`, a constant nor a function. It only fails
    /// once it is evaluated.
    UnknownIdent(String),
    /// A call to a function that does not exist
    UnknownCall(String, Box<Node>),
    Neg(Box<Node>),
    Add(Box<Node>, Box<Node>),
    Sub(Box<Node>, Box<Node>),
    Mul(Box<Node>, Box<Node>),
    Div(Box<Node>, Box<Node>),
    Pow(Box<Node>, Box<Node>),
    Call(Func, Box<Node>),
}

impl Node {
    pub fn pow(self, exponent: Node) -> Node {
        Node::Pow(Box::new(self), Box::new(exponent))
    }

    pub fn call(self, func: Func) -> Node {
        Node::Call(func, Box::new(self))
    }

    /// Whether the value of the node changes with `x`.
    pub fn depends_on_x(&self) -> bool {
        match self {
            Node::Var => true,
            Node::Num(_) | Node::Const(_) | Node::UnknownIdent(_) => false,
            Node::Neg(inner) | Node::Call(_, inner) | Node::UnknownCall(_, inner) => {
                inner.depends_on_x()
            }
            Node::Add(a, b)
            | Node::Sub(a, b)
            | Node::Mul(a, b)
            | Node::Div(a, b)
            | Node::Pow(a, b) => a.depends_on_x() || b.depends_on_x(),
        }
    }
}

impl Add for Node {
    type Output = Node;

    fn add(self, rhs: Self) -> Self::Output {
        Node::Add(Box::new(self), Box::new(rhs))
    }
}

impl Neg for Node {
    type Output = Node;

    fn neg(self) -> Self::Output {
        Node::Neg(Box::new(self))
    }
}

impl Sub for Node {
    type Output = Node;

    fn sub(self, rhs: Self) -> Self::Output {
        Node::Sub(Box::new(self), Box::new(rhs))
    }
}

impl Mul for Node {
    type Output = Node;

    fn mul(self, rhs: Self) -> Self::Output {
        Node::Mul(Box::new(self), Box::new(rhs))
    }
}

impl Div for Node {
    type Output = Node;

    fn div(self, rhs: Self) -> Self::Output {
        Node::Div(Box::new(self), Box::new(rhs))
    }
}
