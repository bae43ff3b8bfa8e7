//! Forward-only result cursor
//!
//! Plain-select cursors evaluate records lazily as rows are pulled;
//! grouped/sorted cursors hold their fully materialized output. Either way
//! iteration is single-pass and each cursor exclusively owns its offset
//! and pending-row state.

use crate::project::Projector;
use octofhir_fql_ast::Statement;
use octofhir_fql_diagnostics::{FqlError, Result};
use octofhir_fql_model::{PathEvaluator, Record, SearchId};
use octofhir_fql_types::{DataType, TypedValue};
use std::collections::VecDeque;
use std::sync::Arc;

/// One projected column: rendered name plus resolved type
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// One projected row: its offset within the logical search plus the cell
/// values aligned to the cursor's column list
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub offset: usize,
    pub values: Vec<TypedValue>,
}

impl Row {
    /// Cells in canonical string form; null cells become `None`
    pub fn display_values(&self) -> Vec<Option<String>> {
        self.values
            .iter()
            .map(|v| if v.is_null() { None } else { Some(v.to_string()) })
            .collect()
    }
}

/// Forward-only iterator over the rows of one executed statement
pub struct ExecutionCursor {
    columns: Vec<Column>,
    search_id: Option<SearchId>,
    inner: CursorInner,
}

enum CursorInner {
    Buffered(VecDeque<Row>),
    Streaming(Box<StreamingRows>),
}

struct StreamingRows {
    statement: Statement,
    evaluator: Arc<dyn PathEvaluator>,
    records: Vec<Record>,
    next_index: usize,
    base_offset: usize,
    remaining: Option<usize>,
    pending: Option<Result<Row>>,
}

impl StreamingRows {
    /// Produce the next surviving row. Records skipped by WHERE consume
    /// their offset; an evaluation failure is yielded in place of a row.
    fn advance(&mut self) -> Option<Result<Row>> {
        if self.remaining == Some(0) {
            return None;
        }
        let projector = Projector::new(&self.statement, self.evaluator.as_ref());
        while self.next_index < self.records.len() {
            let index = self.next_index;
            self.next_index += 1;
            let record = &self.records[index];
            match projector.matches(record) {
                Err(err) => return Some(Err(err)),
                Ok(false) => continue,
                Ok(true) => {
                    if let Some(remaining) = &mut self.remaining {
                        *remaining -= 1;
                    }
                    return Some(Ok(Row {
                        offset: self.base_offset + index,
                        values: projector.project_first(record),
                    }));
                }
            }
        }
        None
    }
}

impl ExecutionCursor {
    pub(crate) fn buffered(
        columns: Vec<Column>,
        search_id: Option<SearchId>,
        rows: Vec<Row>,
    ) -> Self {
        Self {
            columns,
            search_id,
            inner: CursorInner::Buffered(rows.into()),
        }
    }

    pub(crate) fn streaming(
        columns: Vec<Column>,
        search_id: SearchId,
        statement: Statement,
        evaluator: Arc<dyn PathEvaluator>,
        records: Vec<Record>,
        base_offset: usize,
        limit: Option<usize>,
    ) -> Self {
        Self {
            columns,
            search_id: Some(search_id),
            inner: CursorInner::Streaming(Box::new(StreamingRows {
                statement,
                evaluator,
                records,
                next_index: 0,
                base_offset,
                remaining: limit,
                pending: None,
            })),
        }
    }

    /// The projected columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rendered column names, in select order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Resolved column types, aligned with `column_names`
    pub fn column_types(&self) -> Vec<DataType> {
        self.columns.iter().map(|c| c.data_type).collect()
    }

    /// The store's continuation token, when this cursor came from a search
    pub fn search_id(&self) -> Option<&SearchId> {
        self.search_id.as_ref()
    }

    /// Whether another row is available. A row-evaluation failure counts
    /// as available and surfaces from the following `next_row` call.
    pub fn has_next(&mut self) -> bool {
        match &mut self.inner {
            CursorInner::Buffered(rows) => !rows.is_empty(),
            CursorInner::Streaming(streaming) => {
                if streaming.pending.is_none() {
                    streaming.pending = streaming.advance();
                }
                streaming.pending.is_some()
            }
        }
    }

    /// The next row; fails once the cursor is exhausted
    pub fn next_row(&mut self) -> Result<Row> {
        match &mut self.inner {
            CursorInner::Buffered(rows) => rows.pop_front().ok_or_else(exhausted),
            CursorInner::Streaming(streaming) => match streaming.pending.take() {
                Some(row) => row,
                None => streaming.advance().unwrap_or_else(|| Err(exhausted())),
            },
        }
    }
}

fn exhausted() -> FqlError {
    FqlError::system("Cursor is exhausted")
}

impl std::fmt::Debug for ExecutionCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.inner {
            CursorInner::Buffered(_) => "Buffered",
            CursorInner::Streaming(_) => "Streaming",
        };
        f.debug_struct("ExecutionCursor")
            .field("columns", &self.columns)
            .field("search_id", &self.search_id)
            .field("inner", &kind)
            .finish()
    }
}

impl Iterator for ExecutionCursor {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() { Some(self.next_row()) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_cursor_exhaustion() {
        let mut cursor = ExecutionCursor::buffered(
            vec![Column::new("id", DataType::String)],
            None,
            vec![Row {
                offset: 0,
                values: vec![TypedValue::from("123")],
            }],
        );
        assert!(cursor.has_next());
        let row = cursor.next_row().unwrap();
        assert_eq!(row.offset, 0);
        assert!(!cursor.has_next());
        assert!(cursor.next_row().is_err());
    }

    #[test]
    fn test_display_values_renders_null_as_none() {
        let row = Row {
            offset: 3,
            values: vec![TypedValue::from("Marie"), TypedValue::Null],
        };
        assert_eq!(row.display_values(), vec![Some("Marie".to_string()), None]);
    }
}
