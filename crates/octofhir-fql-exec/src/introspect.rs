//! Table/column catalog exposed as query results
//!
//! Both listings are shaped like their JDBC metadata counterparts
//! (`getTables`/`getColumns`) so SQL tooling can consume them unchanged.

use crate::cursor::{Column, ExecutionCursor, Row};
use octofhir_fql_model::Catalog;
use octofhir_fql_types::{DataType, TypedValue};

const TABLE_COLUMNS: [&str; 5] = [
    "TABLE_CAT",
    "TABLE_SCHEM",
    "TABLE_NAME",
    "TABLE_TYPE",
    "REMARKS",
];

const COLUMN_COLUMNS: [&str; 6] = [
    "TABLE_CAT",
    "TABLE_SCHEM",
    "TABLE_NAME",
    "COLUMN_NAME",
    "DATA_TYPE",
    "TYPE_NAME",
];

/// One row per supported table, sorted by table name
pub(crate) fn introspect_tables(catalog: &dyn Catalog) -> ExecutionCursor {
    let mut rows = Vec::new();
    for (offset, name) in catalog.table_names().iter().enumerate() {
        let remarks = catalog
            .table(name)
            .and_then(|t| t.remarks.clone())
            .map(TypedValue::String)
            .unwrap_or(TypedValue::Null);
        rows.push(Row {
            offset,
            values: vec![
                TypedValue::Null,
                TypedValue::Null,
                TypedValue::String(name.clone()),
                TypedValue::String("TABLE".into()),
                remarks,
            ],
        });
    }

    let columns = TABLE_COLUMNS
        .iter()
        .map(|name| Column::new(*name, DataType::String))
        .collect();
    ExecutionCursor::buffered(columns, None, rows)
}

/// One row per (table, leaf path, type code), optionally filtered by exact
/// or wildcard selectors, flattened to dotted paths and capped at the
/// wildcard nesting depth
pub(crate) fn introspect_columns(
    catalog: &dyn Catalog,
    table_selector: Option<&str>,
    column_selector: Option<&str>,
) -> ExecutionCursor {
    let mut rows = Vec::new();
    for name in catalog.table_names() {
        if !selector_matches(table_selector, &name) {
            continue;
        }
        let Some(table) = catalog.table(&name) else {
            continue;
        };
        for column in table.wildcard_columns() {
            if !selector_matches(column_selector, &column.path) {
                continue;
            }
            rows.push(Row {
                offset: rows.len(),
                values: vec![
                    TypedValue::Null,
                    TypedValue::Null,
                    TypedValue::String(name.clone()),
                    TypedValue::String(column.path.clone()),
                    TypedValue::LongInt(column.data_type.jdbc_code()),
                    TypedValue::String(column.data_type.type_name().into()),
                ],
            });
        }
    }

    let columns = COLUMN_COLUMNS
        .iter()
        .map(|name| {
            let data_type = if *name == "DATA_TYPE" {
                DataType::LongInt
            } else {
                DataType::String
            };
            Column::new(*name, data_type)
        })
        .collect();
    ExecutionCursor::buffered(columns, None, rows)
}

fn selector_matches(selector: Option<&str>, value: &str) -> bool {
    match selector {
        None => true,
        Some(pattern) => like_match(pattern, value),
    }
}

/// SQL-LIKE matching: `%` matches any run of characters, `_` any single
/// character; a pattern without wildcards is an exact match
fn like_match(pattern: &str, value: &str) -> bool {
    fn matches(pattern: &[char], value: &[char]) -> bool {
        match pattern.split_first() {
            None => value.is_empty(),
            Some((&'%', rest)) => (0..=value.len()).any(|i| matches(rest, &value[i..])),
            Some((&'_', rest)) => !value.is_empty() && matches(rest, &value[1..]),
            Some((&c, rest)) => value.first() == Some(&c) && matches(rest, &value[1..]),
        }
    }
    let pattern: Vec<char> = pattern.chars().collect();
    let value: Vec<char> = value.chars().collect();
    matches(&pattern, &value)
}
