//! Operator precedence table used to decide where parentheses are required.
//!
//! | Level | Constructs |
//! |-------|------------|
//! | 1 | `OR` |
//! | 2 | `AND` |
//! | 3 | `NOT` |
//! | 4 | comparisons, `LIKE`, `IN`, `BETWEEN`, `IS NULL` |
//! | 5 | `+`, `-`, `\|\|` |
//! | 6 | `*`, `/`, `%`, bitwise operators |
//! | 7 | unary minus |
//! | 8 | everything else (columns, values, function calls, ...) |

use crate::sql_ast::{Node, Operator};

pub const PRIMARY: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a op (b op c)` equals `(a op b) op c`
    Full,
    Left,
    None,
}

pub fn operator_precedence(op: Operator) -> u8 {
    match op {
        Operator::Or => 1,
        Operator::And => 2,
        Operator::Eq | Operator::NotEq | Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => 4,
        Operator::Add | Operator::Sub | Operator::Concat => 5,
        Operator::Mul
        | Operator::Div
        | Operator::Mod
        | Operator::BitAnd
        | Operator::BitOr
        | Operator::BitXor
        | Operator::ShiftLeft
        | Operator::ShiftRight => 6,
        Operator::Negate => 7,
    }
}

pub fn associativity(op: Operator) -> Associativity {
    match op {
        Operator::And | Operator::Or | Operator::Add | Operator::Mul | Operator::Concat => Associativity::Full,
        Operator::Sub | Operator::Div | Operator::Mod => Associativity::Left,
        _ => Associativity::None,
    }
}

pub fn precedence(node: &Node) -> u8 {
    match node {
        Node::Operator(op) => operator_precedence(op.op),
        Node::Not(_) => 3,
        Node::Like(_) | Node::ILike(_) | Node::In(_) | Node::Between(_) | Node::IsNull(_) => 4,
        _ => PRIMARY,
    }
}

/// True if `child`, rendered at position `index` of `parent`, must be
/// wrapped in parentheses to keep its meaning.
pub fn needs_parens(parent: &Node, child: &Node, index: usize) -> bool {
    let parent_level = precedence(parent);
    let child_level = precedence(child);
    if parent_level == PRIMARY || child_level == PRIMARY {
        return false;
    }
    if child_level < parent_level {
        return true;
    }
    if child_level > parent_level {
        return false;
    }

    let Node::Operator(parent_op) = parent else {
        // NOT, LIKE, IN, BETWEEN and IS NULL never chain with themselves
        return true;
    };
    match associativity(parent_op.op) {
        Associativity::None => true,
        Associativity::Left => index > 0,
        Associativity::Full => {
            index > 0 && !matches!(child, Node::Operator(child_op) if child_op.op == parent_op.op)
        }
    }
}
