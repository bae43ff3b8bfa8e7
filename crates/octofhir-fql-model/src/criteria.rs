//! Compiled search criteria exchanged with the record store
//!
//! The compiled form is an AND of OR-groups per parameter: each parameter
//! maps to a list of groups, every group must match (AND), and a group
//! matches when any of its values does (OR).

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The native kind of a search parameter, as registered in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    /// Coded value, optionally qualified as `system|code`
    Token,
    /// Free-text value with optional `:exact` matching
    String,
    /// Numeric value with unit, `prefix value|system|units`
    Quantity,
    /// Date literal with comparison prefix
    Date,
}

/// Comparison prefix for quantity and date parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParamPrefix {
    #[default]
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Starts after
    Sa,
    /// Ends before
    Eb,
    /// Approximately
    Ap,
}

impl ParamPrefix {
    /// Parse a leading prefix from a raw value, returning the prefix and
    /// the remainder. Values without a recognized prefix default to `Eq`.
    pub fn split(raw: &str) -> (Self, &str) {
        let prefixes = [
            ("eq", Self::Eq),
            ("ne", Self::Ne),
            ("lt", Self::Lt),
            ("le", Self::Le),
            ("gt", Self::Gt),
            ("ge", Self::Ge),
            ("sa", Self::Sa),
            ("eb", Self::Eb),
            ("ap", Self::Ap),
        ];
        for (text, prefix) in prefixes {
            if let Some(rest) = raw.strip_prefix(text) {
                // only a prefix when the remainder starts numerically
                if rest.starts_with(|c: char| c.is_ascii_digit()) {
                    return (prefix, rest);
                }
            }
        }
        (Self::Eq, raw)
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Sa => "sa",
            Self::Eb => "eb",
            Self::Ap => "ap",
        }
    }
}

impl fmt::Display for ParamPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One coerced search value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchValue {
    /// Token: verbatim code, optionally `system|code`
    Token {
        system: Option<String>,
        code: String,
    },
    /// String with optional exact matching
    String { value: String, exact: bool },
    /// Quantity: `prefix value|system|units`
    Quantity {
        prefix: ParamPrefix,
        value: Decimal,
        system: Option<String>,
        units: Option<String>,
    },
    /// Date literal with prefix
    Date { prefix: ParamPrefix, value: String },
}

/// One OR-group: a group matches when any of its values matches
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrGroup {
    pub values: Vec<SearchValue>,
}

impl OrGroup {
    pub fn new(values: Vec<SearchValue>) -> Self {
        Self { values }
    }

    pub fn single(value: SearchValue) -> Self {
        Self {
            values: vec![value],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Compiled AND-of-OR-groups criteria, keyed by parameter name in
/// first-appearance order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub params: IndexMap<String, Vec<OrGroup>>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an AND-level OR-group under a parameter
    pub fn add_group(&mut self, param: impl Into<String>, group: OrGroup) {
        self.params.entry(param.into()).or_default().push(group);
    }

    /// The OR-groups registered for a parameter
    pub fn get(&self, param: &str) -> Option<&Vec<OrGroup>> {
        self.params.get(param)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
