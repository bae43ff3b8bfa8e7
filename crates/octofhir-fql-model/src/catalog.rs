//! Table/column catalog abstraction

use crate::ParamKind;
use octofhir_fql_types::DataType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum dotted-path depth included by `SELECT *` expansion and column
/// introspection. Leaf paths nested deeper than this (e.g. a field of a
/// complex element inside another complex element, `address.period.start`)
/// must be selected explicitly.
pub const WILDCARD_MAX_DEPTH: usize = 2;

/// One declared leaf column of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Dotted leaf path from the record root
    pub path: String,
    /// Native data type
    pub data_type: DataType,
}

/// One registered search parameter of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParamDefinition {
    pub name: String,
    pub kind: ParamKind,
}

/// Declared metadata for one record table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub remarks: Option<String>,
    pub columns: Vec<ColumnDefinition>,
    pub search_params: Vec<SearchParamDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remarks: None,
            columns: Vec::new(),
            search_params: Vec::new(),
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub fn with_column(mut self, path: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(ColumnDefinition {
            path: path.into(),
            data_type,
        });
        self
    }

    pub fn with_search_param(mut self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.search_params.push(SearchParamDefinition {
            name: name.into(),
            kind,
        });
        self
    }

    /// Look up the declared type of a leaf path
    pub fn column_type(&self, path: &str) -> Option<DataType> {
        self.columns
            .iter()
            .find(|c| c.path == path)
            .map(|c| c.data_type)
    }

    /// The columns included by `SELECT *`: declaration order, dotted depth
    /// capped at [`WILDCARD_MAX_DEPTH`]
    pub fn wildcard_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns
            .iter()
            .filter(|c| c.path.split('.').count() <= WILDCARD_MAX_DEPTH)
    }
}

/// The catalog/schema registry: table and column metadata per record type,
/// plus the per-table search parameter registry.
///
/// Process-wide, read-mostly configuration - implementations are built once
/// at startup and injected into the parser, search compiler and
/// introspection service.
pub trait Catalog: Send + Sync {
    /// All supported table names, sorted
    fn table_names(&self) -> Vec<String>;

    /// Metadata for one table
    fn table(&self, name: &str) -> Option<&TableDefinition>;

    /// The kind of a search parameter registered for a table, or `None`
    /// when the parameter is unknown for that table
    fn resolve_search_param(&self, table: &str, name: &str) -> Option<ParamKind> {
        self.table(table)?
            .search_params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.kind)
    }
}

/// Immutable in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tables: BTreeMap<String, TableDefinition>,
}

impl StaticCatalog {
    pub fn new(tables: Vec<TableDefinition>) -> Self {
        Self {
            tables: tables
                .into_iter()
                .map(|t| (t.name.clone(), t))
                .collect(),
        }
    }
}

impl Catalog for StaticCatalog {
    fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.get(name)
    }
}
