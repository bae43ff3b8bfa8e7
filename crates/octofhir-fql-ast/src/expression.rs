//! WHERE predicate expression tree
//!
//! The parser splits a WHERE clause at its top-level comparison operator or
//! `in`-list; everything below that level (path navigation, functions such
//! as `where()`, `ofType()`, `lower()`, `contains()`, string arithmetic)
//! stays inside the opaque path text and is handed to the path-expression
//! evaluator as-is.

use crate::Literal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators available at the top level of a WHERE predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    /// The source form of the operator
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A WHERE predicate expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Opaque path-expression text, resolved per record by the evaluator
    Path(String),
    /// A literal value
    Literal(Literal),
    /// Top-level comparison between two operands
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    /// Membership test: `operand in ('a' | 'b' | 'c')`
    InList {
        operand: Box<Expression>,
        values: Vec<Literal>,
    },
}

impl Expression {
    /// Create a path expression node
    pub fn path(text: impl Into<String>) -> Self {
        Self::Path(text.into())
    }

    /// Create a comparison node
    pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Create an in-list node
    pub fn in_list(operand: Expression, values: Vec<Literal>) -> Self {
        Self::InList {
            operand: Box::new(operand),
            values,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(text) => f.write_str(text),
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Binary { op, lhs, rhs } => write!(f, "{lhs} {op} {rhs}"),
            Self::InList { operand, values } => {
                write!(f, "{operand} in (")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, ")")
            }
        }
    }
}
