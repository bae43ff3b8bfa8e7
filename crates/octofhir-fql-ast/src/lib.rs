//! FQL Abstract Syntax Tree definitions
//!
//! This crate defines the immutable statement model produced by the parser:
//! the `Statement` with its clause lists, the WHERE expression tree, and
//! literal values. Statements can also be built programmatically, which is
//! how continuation callers re-supply the statement on resume.

mod expression;
mod literal;
mod statement;

pub use expression::*;
pub use literal::*;
pub use statement::*;

/// A node with source span information
pub type Spanned<T> = octofhir_fql_diagnostics::Spanned<T>;
