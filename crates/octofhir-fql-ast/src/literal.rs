//! Literal AST nodes for FQL

use octofhir_fql_types::TypedValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal value in a WHERE predicate or SEARCH clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// String literal (single-quoted in source)
    String(String),
    /// Integer literal
    Integer(i64),
    /// Decimal literal (arbitrary precision)
    Decimal(Decimal),
    /// Boolean literal (true/false)
    Boolean(bool),
}

impl Literal {
    /// Convert to the runtime value representation
    pub fn to_typed_value(&self) -> TypedValue {
        match self {
            Self::String(s) => TypedValue::String(s.clone()),
            Self::Integer(i) => TypedValue::LongInt(*i),
            Self::Decimal(d) => TypedValue::Decimal(*d),
            Self::Boolean(b) => TypedValue::Boolean(*b),
        }
    }

    /// The raw textual payload of the literal, unquoted
    pub fn as_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Decimal(d) => d.normalize().to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "'{s}'"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{}", d.normalize()),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}
