//! In-memory grouping and count aggregation
//!
//! Groups finalize only after the whole fetched record set has been
//! consumed - aggregation cannot be paginated mid-group.

use crate::project::Projector;
use indexmap::IndexMap;
use octofhir_fql_ast::Statement;
use octofhir_fql_diagnostics::Result;
use octofhir_fql_model::Record;
use octofhir_fql_types::TypedValue;

/// Bucket fanned rows by their non-aggregate cell tuple and assemble one
/// output row per group, cells back in select order. Null is a distinct,
/// stable key component. Groups appear in first-encounter order.
pub(crate) fn aggregate_rows(
    statement: &Statement,
    records: &[Record],
    projector: &Projector<'_>,
) -> Result<Vec<Vec<TypedValue>>> {
    let value_positions: Vec<usize> = statement
        .select
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_aggregate())
        .map(|(i, _)| i)
        .collect();
    let count_positions: Vec<usize> = statement
        .select
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_aggregate())
        .map(|(i, _)| i)
        .collect();

    let mut groups: IndexMap<Vec<TypedValue>, Vec<i64>> = IndexMap::new();
    for record in records {
        if !projector.matches(record)? {
            continue;
        }
        // count(expr) looks at the record once, not at each fanned row
        let indicators: Vec<bool> = count_positions
            .iter()
            .map(|&i| projector.count_indicator(record, &statement.select[i]))
            .collect();
        for key in projector.project_fanned(record, &value_positions) {
            let counts = groups
                .entry(key)
                .or_insert_with(|| vec![0; count_positions.len()]);
            for (count, &hit) in counts.iter_mut().zip(&indicators) {
                if hit {
                    *count += 1;
                }
            }
        }
    }

    // a pure count query over zero matching records still has one group
    if groups.is_empty() && value_positions.is_empty() {
        groups.insert(Vec::new(), vec![0; count_positions.len()]);
    }

    let mut rows = Vec::with_capacity(groups.len());
    for (key, counts) in groups {
        let mut values = vec![TypedValue::Null; statement.select.len()];
        for (&slot, value) in value_positions.iter().zip(key) {
            values[slot] = value;
        }
        for (&slot, count) in count_positions.iter().zip(counts) {
            values[slot] = TypedValue::LongInt(count);
        }
        rows.push(values);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_fql_ast::SelectClause;
    use octofhir_fql_model::{MalformedExpressionError, PathEvaluator};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Evaluates plain dotted paths against flat JSON test records where
    /// every field is a string or an array of strings
    struct FlatEvaluator;

    impl PathEvaluator for FlatEvaluator {
        fn evaluate(
            &self,
            record: &Record,
            expression: &str,
        ) -> std::result::Result<Vec<TypedValue>, MalformedExpressionError> {
            let Some(value) = record.document().get(expression) else {
                return Ok(Vec::new());
            };
            Ok(match value {
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(TypedValue::from)
                    .collect(),
                serde_json::Value::String(s) => vec![TypedValue::from(s.as_str())],
                _ => Vec::new(),
            })
        }
    }

    fn patient(family: Option<&str>, given: &[&str]) -> Record {
        let mut doc = json!({});
        if let Some(family) = family {
            doc["family"] = json!(family);
        }
        if !given.is_empty() {
            doc["given"] = json!(given);
        }
        Record::new(doc)
    }

    fn statement() -> Statement {
        Statement::new("Patient")
            .add_select_clause("family")
            .add_select_clause("given")
            .add_select(SelectClause::count("*"))
            .add_select(SelectClause::count("family"))
            .add_group_by("family")
            .add_group_by("given")
    }

    #[test]
    fn test_sparse_records_group_with_null_keys() {
        let records = vec![
            patient(None, &[]),
            patient(Some("Simpson"), &[]),
            patient(None, &["Homer"]),
            patient(Some("Simpson"), &["Homer"]),
        ];
        let statement = statement();
        let projector = Projector::new(&statement, &FlatEvaluator);
        let rows = aggregate_rows(&statement, &records, &projector).unwrap();

        let null = TypedValue::Null;
        let expected: Vec<Vec<TypedValue>> = vec![
            vec![null.clone(), null.clone(), TypedValue::LongInt(1), TypedValue::LongInt(0)],
            vec![TypedValue::from("Simpson"), null.clone(), TypedValue::LongInt(1), TypedValue::LongInt(1)],
            vec![null, TypedValue::from("Homer"), TypedValue::LongInt(1), TypedValue::LongInt(0)],
            vec![TypedValue::from("Simpson"), TypedValue::from("Homer"), TypedValue::LongInt(1), TypedValue::LongInt(1)],
        ];
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_multi_valued_select_fans_out_per_group() {
        let records = vec![
            patient(Some("Simpson"), &["Homer", "Jay"]),
            patient(Some("Simpson"), &["Homer", "Jay"]),
        ];
        let statement = statement();
        let projector = Projector::new(&statement, &FlatEvaluator);
        let rows = aggregate_rows(&statement, &records, &projector).unwrap();

        assert_eq!(
            rows,
            vec![
                vec![
                    TypedValue::from("Simpson"),
                    TypedValue::from("Homer"),
                    TypedValue::LongInt(2),
                    TypedValue::LongInt(2),
                ],
                vec![
                    TypedValue::from("Simpson"),
                    TypedValue::from("Jay"),
                    TypedValue::LongInt(2),
                    TypedValue::LongInt(2),
                ],
            ]
        );
    }

    #[test]
    fn test_ungrouped_counts_aggregate_to_one_row() {
        let records = vec![
            patient(None, &[]),
            patient(Some("Simpson"), &[]),
            patient(None, &["Homer"]),
            patient(Some("Simpson"), &["Homer"]),
        ];
        let statement = Statement::new("Patient")
            .add_select(SelectClause::count("*"))
            .add_select(SelectClause::count("family"));
        let projector = Projector::new(&statement, &FlatEvaluator);
        let rows = aggregate_rows(&statement, &records, &projector).unwrap();

        assert_eq!(
            rows,
            vec![vec![TypedValue::LongInt(4), TypedValue::LongInt(2)]]
        );
    }

    #[test]
    fn test_count_star_over_no_records_is_zero() {
        let statement = Statement::new("Patient").add_select(SelectClause::count("*"));
        let projector = Projector::new(&statement, &FlatEvaluator);
        let rows = aggregate_rows(&statement, &[], &projector).unwrap();
        assert_eq!(rows, vec![vec![TypedValue::LongInt(0)]]);
    }
}
