//! FQL execution engine
//!
//! Wires the parser, search compiler, row engine, aggregation/sort stage
//! and result cursor together behind [`FqlEngine`]. Execution always
//! delegates bulk retrieval to the injected record store and only reasons
//! about the records the store returns.

mod aggregate;
mod cursor;
mod engine;
mod introspect;
mod project;
mod search;
mod sort;

pub use cursor::{Column, ExecutionCursor, Row};
pub use engine::{FqlEngine, validate_statement};
pub use search::compile_search;
