//! FQL - a SQL-like query engine over schema-flexible clinical records
//!
//! FQL lets a caller express a tabular projection, filter, grouping, count
//! aggregation and ordering over a store of clinical resources (Patient,
//! Observation, ...), using a path-expression sublanguage to reach into
//! nested and repeating fields. Storage, indexing and per-record path
//! evaluation are delegated to injected collaborators.
//!
//! # Example
//!
//! ```ignore
//! use octofhir_fql::FqlEngine;
//! use std::sync::Arc;
//!
//! let engine = FqlEngine::new(catalog, store, evaluator);
//! let mut cursor = engine.execute_initial_search(
//!     "from Patient where name.family = 'Simpson' select name.given[1], name.family",
//!     None,
//! )?;
//! while cursor.has_next() {
//!     let row = cursor.next_row()?;
//!     println!("{}: {:?}", row.offset, row.display_values());
//! }
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_fql_ast as ast;
pub use octofhir_fql_diagnostics as diagnostics;
pub use octofhir_fql_exec as exec;
pub use octofhir_fql_model as model;
pub use octofhir_fql_parser as parser;
pub use octofhir_fql_types as types;

// Convenience re-exports
pub use octofhir_fql_ast::{
    BinaryOp, Expression, Literal, OrderByClause, SearchClause, SelectClause, SelectOperator,
    SortDirection, Statement,
};
pub use octofhir_fql_diagnostics::{FqlError, Result};
pub use octofhir_fql_exec::{Column, ExecutionCursor, FqlEngine, Row, compile_search};
pub use octofhir_fql_model::{
    Catalog, MalformedExpressionError, ParamKind, ParamPrefix, PathEvaluator, Record, RecordPage,
    RecordSource, SearchCriteria, SearchId, SearchValue, StaticCatalog, StoreError,
    TableDefinition, WILDCARD_MAX_DEPTH, clinical_catalog,
};
pub use octofhir_fql_parser::FqlParser;
pub use octofhir_fql_types::{DataType, TypedValue};
