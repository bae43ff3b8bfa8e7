//! Collaborator traits: record store and path-expression evaluator

use crate::{Record, SearchCriteria};
use octofhir_fql_types::TypedValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque continuation token minted by the store.
///
/// The engine never inspects or reconstructs its contents; it only hands
/// it back on `resume`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchId(String);

impl SearchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SearchId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One page of records returned by the store
#[derive(Debug, Clone)]
pub struct RecordPage {
    /// Continuation token for this logical search
    pub search_id: SearchId,
    /// Offset of the first record within the logical result stream
    pub from_offset: usize,
    /// The records of this page
    pub records: Vec<Record>,
}

impl RecordPage {
    pub fn new(search_id: SearchId, from_offset: usize, records: Vec<Record>) -> Self {
        Self {
            search_id,
            from_offset,
            records,
        }
    }
}

/// Store-side failure
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The continuation token is no longer resolvable
    #[error("Search {search_id} is no longer available")]
    Expired { search_id: String },

    /// Any other store failure
    #[error("{message}")]
    Failure { message: String },
}

impl StoreError {
    pub fn expired(search_id: impl Into<String>) -> Self {
        Self::Expired {
            search_id: search_id.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }
}

/// The persistence/search backend that stores and indexes records and
/// answers primitive criteria-based queries.
///
/// The paging contract is at-least-once-retrievable per identifier until
/// expiry: `resume` with the same id and offset may be called repeatedly.
pub trait RecordSource: Send + Sync {
    /// Start a logical search and return its first page. `count` is a
    /// page-size hint the store may ignore.
    fn search(
        &self,
        table: &str,
        criteria: &SearchCriteria,
        count: Option<usize>,
    ) -> Result<RecordPage, StoreError>;

    /// Re-attach to a previously started search and fetch records from
    /// the given offset in the logical result stream.
    fn resume(&self, search_id: &SearchId, from_offset: usize) -> Result<RecordPage, StoreError>;
}

/// Failure to evaluate a path expression against a record
#[derive(Debug, Clone, Error)]
#[error("Malformed expression \"{expression}\": {message}")]
pub struct MalformedExpressionError {
    pub expression: String,
    pub message: String,
}

impl MalformedExpressionError {
    pub fn new(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
        }
    }
}

/// The path-expression evaluator: given a record and an expression string,
/// produce zero or more typed values.
///
/// Absence is not an error - an expression that matches nothing returns an
/// empty sequence. Only an expression the evaluator cannot parse fails.
pub trait PathEvaluator: Send + Sync {
    fn evaluate(
        &self,
        record: &Record,
        expression: &str,
    ) -> Result<Vec<TypedValue>, MalformedExpressionError>;
}
