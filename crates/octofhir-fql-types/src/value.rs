//! Typed cell values and column data types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Column data type, as declared by the catalog or inferred for aggregates.
///
/// The numeric codes exposed through introspection follow the JDBC
/// `java.sql.Types` constants so that SQL tooling can consume them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Free-form text
    String,
    /// 64-bit signed integer
    LongInt,
    /// Arbitrary precision decimal
    Decimal,
    /// Calendar date
    Date,
    /// Boolean
    Boolean,
}

impl DataType {
    /// The JDBC type code for this data type
    pub const fn jdbc_code(&self) -> i64 {
        match self {
            Self::String => 12,   // VARCHAR
            Self::LongInt => -5,  // BIGINT
            Self::Decimal => 3,   // DECIMAL
            Self::Date => 91,     // DATE
            Self::Boolean => 16,  // BOOLEAN
        }
    }

    /// The canonical type name
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::LongInt => "LONGINT",
            Self::Decimal => "DECIMAL",
            Self::Date => "DATE",
            Self::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// The runtime value of one projected cell.
///
/// Values compare by kind; absence is an explicit `Null` variant rather
/// than an error, so a missing path never aborts a projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TypedValue {
    /// Missing/unknown value
    Null,
    /// String value
    String(String),
    /// 64-bit signed integer
    LongInt(i64),
    /// Arbitrary precision decimal
    Decimal(Decimal),
    /// Calendar date
    Date(NaiveDate),
    /// Boolean value
    Boolean(bool),
}

impl TypedValue {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this value is the boolean `true`
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Boolean(true))
    }

    /// Get the data type of this value, or `None` for null
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::String(_) => Some(DataType::String),
            Self::LongInt(_) => Some(DataType::LongInt),
            Self::Decimal(_) => Some(DataType::Decimal),
            Self::Date(_) => Some(DataType::Date),
            Self::Boolean(_) => Some(DataType::Boolean),
        }
    }
}

impl fmt::Display for TypedValue {
    /// Canonical stringification: shortest round-trippable decimals,
    /// `true`/`false` booleans, ISO dates.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::String(s) => f.write_str(s),
            Self::LongInt(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{}", d.normalize()),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        Self::LongInt(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Compare two values for ordering and predicate evaluation.
///
/// Returns `None` when either side is null; null ordering policy (always
/// last) is applied by the sort stage, not here. Integers and decimals
/// compare numerically with each other; any other cross-kind pair falls
/// back to comparing canonical string forms.
pub fn compare_values(a: &TypedValue, b: &TypedValue) -> Option<Ordering> {
    use TypedValue::{Boolean, Date, Decimal as Dec, LongInt, Null, String as Str};

    match (a, b) {
        (Null, _) | (_, Null) => None,
        (Str(x), Str(y)) => Some(x.cmp(y)),
        (LongInt(x), LongInt(y)) => Some(x.cmp(y)),
        (Dec(x), Dec(y)) => Some(x.cmp(y)),
        (LongInt(x), Dec(y)) => Some(Decimal::from(*x).cmp(y)),
        (Dec(x), LongInt(y)) => Some(x.cmp(&Decimal::from(*y))),
        (Date(x), Date(y)) => Some(x.cmp(y)),
        (Boolean(x), Boolean(y)) => Some(x.cmp(y)),
        _ => Some(a.to_string().cmp(&b.to_string())),
    }
}

/// Equality for predicate evaluation, with the same cross-kind rules as
/// [`compare_values`]. Null never equals anything, including null.
pub fn values_equal(a: &TypedValue, b: &TypedValue) -> bool {
    compare_values(a, b) == Some(Ordering::Equal)
}
