//! FQL value types - runtime representation of projected cell values
//!
//! This crate defines the `TypedValue` union produced by path-expression
//! evaluation and carried through projection, grouping and ordering, plus
//! the `DataType` column-type codes exposed through introspection.

mod value;

pub use value::*;
