use std::fmt;
use std::fmt::{Display, Write};

use super::{ConstKind, Node};

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
enum NodePriority {
    AddOrSub,
    MulOrDiv,
    Neg,
    Pow,
    Value,
}

fn get_node_priority(node: &Node) -> NodePriority {
    match node {
        Node::Num(val) if val.is_sign_negative() => NodePriority::Neg,
        Node::Num(_)
        | Node::Var
        | Node::Const(_)
        | Node::UnknownIdent(_)
        | Node::UnknownCall(_, _)
        | Node::Call(_, _) => NodePriority::Value,
        Node::Neg(_) => NodePriority::Neg,
        Node::Add(_, _) | Node::Sub(_, _) => NodePriority::AddOrSub,
        Node::Mul(_, _) | Node::Div(_, _) => NodePriority::MulOrDiv,
        Node::Pow(_, _) => NodePriority::Pow,
    }
}

fn write_with_paren(
    f: &mut fmt::Formatter<'_>,
    node: &Node,
    curr_prio: NodePriority,
    strict: bool,
) -> fmt::Result {
    let needs_paren = if strict {
        // sub(1,sub(2,3)) => 1 - (2 - 3)
        get_node_priority(node) <= curr_prio
    } else {
        // sub(sub(1,2),3) => 1 - 2 - 3
        get_node_priority(node) < curr_prio
    };
    if needs_paren {
        f.write_char('(')?;
    }
    node.fmt(f)?;
    if needs_paren {
        f.write_char(')')?;
    }
    Ok(())
}

fn write_binary(
    f: &mut fmt::Formatter<'_>,
    node: &Node,
    op: &str,
    a: &Node,
    b: &Node,
) -> fmt::Result {
    let prio = get_node_priority(node);

    // `**` is the only right associative operator
    let right_assoc = prio == NodePriority::Pow;
    write_with_paren(f, a, prio, right_assoc)?;
    f.write_str(op)?;
    write_with_paren(f, b, prio, !right_assoc)
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, inner: &Node) -> fmt::Result {
    write!(f, "{}({})", name, inner)
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Num(val) => write!(f, "{}", val),
            Node::Var => f.write_char('x'),
            Node::Const(ConstKind::Pi) => f.write_str("pi"),
            Node::Const(ConstKind::E) => f.write_str("e"),
            Node::UnknownIdent(name) => f.write_str(name),
            Node::UnknownCall(name, inner) => write_call(f, name, inner),
            Node::Neg(inner) => {
                f.write_char('-')?;
                write_with_paren(f, inner, NodePriority::Neg, false)
            }
            Node::Add(a, b) => write_binary(f, self, " + ", a, b),
            Node::Sub(a, b) => write_binary(f, self, " - ", a, b),
            Node::Mul(a, b) => write_binary(f, self, "*", a, b),
            Node::Div(a, b) => write_binary(f, self, "/", a, b),
            Node::Pow(a, b) => write_binary(f, self, "**", a, b),
            Node::Call(func, inner) => write_call(f, func.name(), inner),
        }
    }
}
