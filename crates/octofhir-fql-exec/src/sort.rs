//! Multi-key ordering with the global null-last policy

use crate::cursor::Row;
use octofhir_fql_ast::{SortDirection, Statement};
use octofhir_fql_diagnostics::{FqlError, Result};
use octofhir_fql_types::compare_values;
use std::cmp::Ordering;

/// Sort rows by the statement's ORDER BY keys in listed priority.
///
/// Direction applies per key; a null in a key sorts after every non-null
/// value irrespective of declared direction. Ties preserve input order.
pub(crate) fn sort_rows(statement: &Statement, rows: &mut [Row]) -> Result<()> {
    if statement.order_by.is_empty() {
        return Ok(());
    }

    let keys = statement
        .order_by
        .iter()
        .map(|entry| {
            statement
                .resolve_column(&entry.expression)
                .map(|index| (index, entry.direction))
                .ok_or_else(|| {
                    FqlError::validation(format!(
                        "Unable to order on column that is not in SELECT clause: {}",
                        entry.expression
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    rows.sort_by(|a, b| {
        for &(index, direction) in &keys {
            let left = &a.values[index];
            let right = &b.values[index];
            let ordering = match (left.is_null(), right.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ordering = compare_values(left, right).unwrap_or(Ordering::Equal);
                    match direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(())
}
