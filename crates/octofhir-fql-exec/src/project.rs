//! Per-record row projection and WHERE predicate evaluation
//!
//! All field access goes through the injected path evaluator. Absence is
//! lenient in SELECT position (a cell becomes null) and strict in WHERE
//! position (a broken filter is a validation error, never a silent
//! non-match).

use octofhir_fql_ast::{BinaryOp, Expression, SelectClause, Statement};
use octofhir_fql_diagnostics::{FqlError, Result};
use octofhir_fql_model::{PathEvaluator, Record};
use octofhir_fql_types::{TypedValue, compare_values, values_equal};
use std::cmp::Ordering;

pub(crate) struct Projector<'a> {
    statement: &'a Statement,
    evaluator: &'a dyn PathEvaluator,
}

impl<'a> Projector<'a> {
    pub(crate) fn new(statement: &'a Statement, evaluator: &'a dyn PathEvaluator) -> Self {
        Self {
            statement,
            evaluator,
        }
    }

    /// WHERE gate: exactly one predicate evaluation per record
    pub(crate) fn matches(&self, record: &Record) -> Result<bool> {
        match &self.statement.where_clause {
            Some(predicate) => self.evaluate_predicate(predicate, record),
            None => Ok(true),
        }
    }

    fn evaluate_predicate(&self, predicate: &Expression, record: &Record) -> Result<bool> {
        match predicate {
            Expression::Path(text) => Ok(self
                .evaluate_where(record, text)?
                .iter()
                .any(TypedValue::is_true)),
            Expression::Literal(literal) => Ok(literal.to_typed_value().is_true()),
            Expression::Binary { op, lhs, rhs } => {
                let lhs = self.evaluate_operand(lhs, record)?;
                let rhs = self.evaluate_operand(rhs, record)?;
                Ok(lhs
                    .iter()
                    .any(|l| rhs.iter().any(|r| satisfies(*op, l, r))))
            }
            Expression::InList { operand, values } => {
                let operand = self.evaluate_operand(operand, record)?;
                Ok(operand.iter().any(|v| {
                    values
                        .iter()
                        .any(|literal| values_equal(v, &literal.to_typed_value()))
                }))
            }
        }
    }

    fn evaluate_operand(&self, expression: &Expression, record: &Record) -> Result<Vec<TypedValue>> {
        match expression {
            Expression::Path(text) => self.evaluate_where(record, text),
            Expression::Literal(literal) => Ok(vec![literal.to_typed_value()]),
            nested => Ok(vec![TypedValue::Boolean(
                self.evaluate_predicate(nested, record)?,
            )]),
        }
    }

    fn evaluate_where(&self, record: &Record, text: &str) -> Result<Vec<TypedValue>> {
        self.evaluator.evaluate(record, text).map_err(|err| {
            FqlError::validation(format!(
                "Failed to evaluate WHERE expression \"{}\": {}",
                text, err.message
            ))
        })
    }

    /// Evaluator output in SELECT position; failures and unknown paths
    /// resolve to no values
    fn evaluate_select(&self, record: &Record, text: &str) -> Vec<TypedValue> {
        self.evaluator.evaluate(record, text).unwrap_or_default()
    }

    /// One row per record: each cell is the expression's first evaluated
    /// value, or null when the evaluator yields nothing
    pub(crate) fn project_first(&self, record: &Record) -> Vec<TypedValue> {
        self.statement
            .select
            .iter()
            .map(|clause| {
                self.evaluate_select(record, &clause.expression)
                    .into_iter()
                    .next()
                    .unwrap_or(TypedValue::Null)
            })
            .collect()
    }

    /// Fan out the cells at the given select positions, aligned by value
    /// position: single-valued columns broadcast across all fanned rows,
    /// exhausted multi-valued columns yield null. Always produces at least
    /// one row per record.
    pub(crate) fn project_fanned(
        &self,
        record: &Record,
        positions: &[usize],
    ) -> Vec<Vec<TypedValue>> {
        let evaluated: Vec<Vec<TypedValue>> = positions
            .iter()
            .map(|&i| self.evaluate_select(record, &self.statement.select[i].expression))
            .collect();
        let fan = evaluated.iter().map(Vec::len).max().unwrap_or(0).max(1);
        (0..fan)
            .map(|i| {
                evaluated
                    .iter()
                    .map(|values| match values.get(i) {
                        Some(value) => value.clone(),
                        None if values.len() == 1 => values[0].clone(),
                        None => TypedValue::Null,
                    })
                    .collect()
            })
            .collect()
    }

    /// Whether a count clause counts this record: `count(*)` always does,
    /// `count(expr)` only when the expression has a non-null value
    pub(crate) fn count_indicator(&self, record: &Record, clause: &SelectClause) -> bool {
        if clause.is_count_star() {
            true
        } else {
            self.evaluate_select(record, &clause.expression)
                .iter()
                .any(|value| !value.is_null())
        }
    }
}

fn satisfies(op: BinaryOp, lhs: &TypedValue, rhs: &TypedValue) -> bool {
    let Some(ordering) = compare_values(lhs, rhs) else {
        return false;
    };
    match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::Ne => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
    }
}
