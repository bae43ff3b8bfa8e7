//! The FQL execution engine

use crate::cursor::{Column, ExecutionCursor, Row};
use crate::project::Projector;
use crate::{aggregate, introspect, search, sort};
use log::debug;
use octofhir_fql_ast::{SelectClause, Statement};
use octofhir_fql_diagnostics::{FqlError, Result};
use octofhir_fql_model::{Catalog, PathEvaluator, RecordPage, RecordSource, SearchId, StoreError};
use octofhir_fql_parser::FqlParser;
use octofhir_fql_types::DataType;
use std::sync::Arc;

/// Executes FQL statements against an injected record store, path
/// evaluator and catalog.
///
/// The engine is stateless across calls: continuation callers hold the
/// statement, search id and row offset themselves. Collaborators are
/// shared immutably, so independent cursors may be open concurrently.
pub struct FqlEngine {
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn RecordSource>,
    evaluator: Arc<dyn PathEvaluator>,
}

impl FqlEngine {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn RecordSource>,
        evaluator: Arc<dyn PathEvaluator>,
    ) -> Self {
        Self {
            catalog,
            store,
            evaluator,
        }
    }

    /// Parse, validate and execute a statement, returning a cursor over
    /// the first page of results. `limit` caps the returned rows and is
    /// forwarded to the store as a page-size hint.
    pub fn execute_initial_search(
        &self,
        statement_text: &str,
        limit: Option<usize>,
    ) -> Result<ExecutionCursor> {
        let statement = FqlParser::new(self.catalog.as_ref()).parse(statement_text)?;
        validate_statement(&statement)?;
        let criteria =
            search::compile_search(self.catalog.as_ref(), &statement.from, &statement.search)?;
        debug!("executing initial search against {}", statement.from);
        let page = self
            .store
            .search(&statement.from, &criteria, limit)
            .map_err(map_store_error)?;
        self.cursor_for(statement, page, limit)
    }

    /// Re-attach to a previously started search and resume row production
    /// at `from_row_offset`, re-applying the same WHERE/SELECT logic. The
    /// statement must be supplied again because the engine keeps no state
    /// between calls.
    pub fn execute_continuation(
        &self,
        statement: &Statement,
        search_id: &SearchId,
        from_row_offset: usize,
        limit: Option<usize>,
    ) -> Result<ExecutionCursor> {
        validate_statement(statement)?;
        debug!("resuming search {search_id} at offset {from_row_offset}");
        let page = self
            .store
            .resume(search_id, from_row_offset)
            .map_err(map_store_error)?;
        self.cursor_for(statement.clone(), page, limit)
    }

    /// One row per supported table, sorted by table name
    pub fn introspect_tables(&self) -> ExecutionCursor {
        introspect::introspect_tables(self.catalog.as_ref())
    }

    /// One row per (table, column, type code); selectors are exact names
    /// or SQL-LIKE patterns
    pub fn introspect_columns(
        &self,
        table_selector: Option<&str>,
        column_selector: Option<&str>,
    ) -> ExecutionCursor {
        introspect::introspect_columns(self.catalog.as_ref(), table_selector, column_selector)
    }

    fn cursor_for(
        &self,
        statement: Statement,
        page: RecordPage,
        limit: Option<usize>,
    ) -> Result<ExecutionCursor> {
        let columns = self.columns_for(&statement);
        if !statement.requires_buffering() {
            return Ok(ExecutionCursor::streaming(
                columns,
                page.search_id,
                statement,
                self.evaluator.clone(),
                page.records,
                page.from_offset,
                limit,
            ));
        }

        let projector = Projector::new(&statement, self.evaluator.as_ref());
        let cells = if statement.has_aggregate() || !statement.group_by.is_empty() {
            aggregate::aggregate_rows(&statement, &page.records, &projector)?
        } else {
            let mut rows = Vec::new();
            for record in &page.records {
                if projector.matches(record)? {
                    rows.push(projector.project_first(record));
                }
            }
            rows
        };

        // grouped/sorted output no longer maps 1:1 to records; re-offset
        let mut rows: Vec<Row> = cells
            .into_iter()
            .map(|values| Row { offset: 0, values })
            .collect();
        sort::sort_rows(&statement, &mut rows)?;
        for (i, row) in rows.iter_mut().enumerate() {
            row.offset = page.from_offset + i;
        }
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(ExecutionCursor::buffered(
            columns,
            Some(page.search_id),
            rows,
        ))
    }

    fn columns_for(&self, statement: &Statement) -> Vec<Column> {
        statement
            .select
            .iter()
            .map(|clause| Column {
                name: clause.alias.clone(),
                data_type: self.resolve_column_type(&statement.from, clause),
            })
            .collect()
    }

    /// Column types come from the catalog; aggregates are LONGINT and
    /// unknown/speculative paths default to STRING
    fn resolve_column_type(&self, table_name: &str, clause: &SelectClause) -> DataType {
        if clause.is_aggregate() {
            return DataType::LongInt;
        }
        let Some(table) = self.catalog.table(table_name) else {
            return DataType::String;
        };
        let path = normalize_path(&clause.expression, table_name);
        table.column_type(&path).unwrap_or(DataType::String)
    }
}

/// Strip `[n]` index suffixes and an optional leading table qualifier so
/// that `Patient.name.given[1]` resolves like `name.given`
fn normalize_path(expression: &str, table: &str) -> String {
    let mut normalized = String::with_capacity(expression.len());
    let mut chars = expression.chars();
    while let Some(c) = chars.next() {
        if c == '[' {
            for c in chars.by_ref() {
                if c == ']' {
                    break;
                }
            }
        } else {
            normalized.push(c);
        }
    }
    let qualifier = format!("{table}.");
    match normalized.strip_prefix(&qualifier) {
        Some(rest) => rest.to_string(),
        None => normalized,
    }
}

fn map_store_error(err: StoreError) -> FqlError {
    match err {
        StoreError::Expired { search_id } => FqlError::ExpiredSearch { search_id },
        StoreError::Failure { message } => FqlError::store(message),
    }
}

/// Statement-level validation, applied before any record is fetched:
/// the aggregate invariant plus GROUP BY / ORDER BY reference checks.
pub fn validate_statement(statement: &Statement) -> Result<()> {
    if statement.has_aggregate() {
        for clause in statement.select.iter().filter(|c| !c.is_aggregate()) {
            let grouped = statement
                .group_by
                .iter()
                .any(|g| *g == clause.alias || *g == clause.expression);
            if !grouped {
                return Err(FqlError::validation(format!(
                    "Unable to select on non-grouped column in a count expression: {}",
                    clause.alias
                )));
            }
        }
    }
    for reference in &statement.group_by {
        let resolves_to_value = statement
            .resolve_column(reference)
            .is_some_and(|i| !statement.select[i].is_aggregate());
        if !resolves_to_value {
            return Err(FqlError::validation(format!(
                "Unable to group on column that is not in SELECT clause: {reference}"
            )));
        }
    }
    for entry in &statement.order_by {
        if statement.resolve_column(&entry.expression).is_none() {
            return Err(FqlError::validation(format!(
                "Unable to order on column that is not in SELECT clause: {}",
                entry.expression
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_fql_ast::OrderByClause;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_non_grouped_select_under_count_rejected() {
        let statement = Statement::new("Patient")
            .add_select(SelectClause::count("*"))
            .add_select_clause("name.family");
        let err = validate_statement(&statement).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to select on non-grouped column in a count expression: name.family"
        );
    }

    #[test]
    fn test_grouped_select_under_count_accepted() {
        let statement = Statement::new("Patient")
            .add_select_clause("name.family")
            .add_select(SelectClause::count("*"))
            .add_group_by("name.family");
        assert!(validate_statement(&statement).is_ok());
    }

    #[test]
    fn test_group_by_must_reference_select_column() {
        let statement = Statement::new("Patient")
            .add_select_clause("name.family")
            .add_group_by("name.given");
        let err = validate_statement(&statement).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to group on column that is not in SELECT clause: name.given"
        );
    }

    #[test]
    fn test_order_by_must_reference_select_column() {
        let statement = Statement::new("Patient")
            .add_select_clause("name.family")
            .add_order_by(OrderByClause::ascending("birthDate"));
        let err = validate_statement(&statement).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to order on column that is not in SELECT clause: birthDate"
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("name.given[1]", "Patient"), "name.given");
        assert_eq!(normalize_path("Patient.name.given", "Patient"), "name.given");
        assert_eq!(
            normalize_path("value.ofType(Quantity).value", "Observation"),
            "value.ofType(Quantity).value"
        );
    }
}
