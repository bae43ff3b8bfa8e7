//! SEARCH clause compilation into native store criteria

use octofhir_fql_ast::{Literal, SearchClause};
use octofhir_fql_diagnostics::{FqlError, Result};
use octofhir_fql_model::{Catalog, OrGroup, ParamKind, ParamPrefix, SearchCriteria, SearchValue};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Special parameters that are legal for every table regardless of the
/// per-table registry
fn special_param_kind(name: &str) -> Option<ParamKind> {
    match name {
        "_id" => Some(ParamKind::Token),
        "_lastUpdated" => Some(ParamKind::Date),
        _ => None,
    }
}

/// Compile SEARCH clauses into store criteria.
///
/// Each clause contributes one OR-group under its parameter; clauses
/// sharing a parameter (joined by `and` in the statement) stack as
/// AND-level groups.
pub fn compile_search(
    catalog: &dyn Catalog,
    table: &str,
    clauses: &[SearchClause],
) -> Result<SearchCriteria> {
    let mut criteria = SearchCriteria::new();
    for clause in clauses {
        let kind = special_param_kind(&clause.param)
            .or_else(|| catalog.resolve_search_param(table, &clause.param))
            .ok_or_else(|| {
                FqlError::validation(format!(
                    "Unknown/unsupported search parameter: {}",
                    clause.param
                ))
            })?;
        let values = clause
            .values
            .iter()
            .map(|value| coerce_value(kind, clause, value))
            .collect::<Result<Vec<_>>>()?;
        criteria.add_group(clause.param.clone(), OrGroup::new(values));
    }
    Ok(criteria)
}

fn coerce_value(kind: ParamKind, clause: &SearchClause, value: &Literal) -> Result<SearchValue> {
    let raw = value.as_text();
    match kind {
        ParamKind::Token => Ok(match raw.split_once('|') {
            Some((system, code)) => SearchValue::Token {
                system: Some(system.to_string()),
                code: code.to_string(),
            },
            None => SearchValue::Token {
                system: None,
                code: raw,
            },
        }),
        ParamKind::String => Ok(SearchValue::String {
            value: raw,
            exact: clause.modifier.as_deref() == Some("exact"),
        }),
        ParamKind::Quantity => {
            let (prefix, rest) = ParamPrefix::split(&raw);
            let mut parts = rest.splitn(3, '|');
            let number = parts.next().unwrap_or_default().trim();
            let value = Decimal::from_str(number).map_err(|_| {
                FqlError::validation(format!(
                    "Invalid quantity value for search parameter {}: {}",
                    clause.param, raw
                ))
            })?;
            let system = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
            let units = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
            Ok(SearchValue::Quantity {
                prefix,
                value,
                system,
                units,
            })
        }
        ParamKind::Date => {
            let (prefix, rest) = ParamPrefix::split(&raw);
            Ok(SearchValue::Date {
                prefix,
                value: rest.to_string(),
            })
        }
    }
}
