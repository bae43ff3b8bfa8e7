//! The parsed, immutable representation of an FQL query

use crate::{Expression, Literal};
use serde::{Deserialize, Serialize};

/// How a SELECT clause contributes to the projected row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectOperator {
    /// Project the evaluated value of the expression
    #[default]
    Value,
    /// Count aggregate: `count(*)` or `count(<expr>)`
    Count,
}

/// One SELECT clause: an expression, the column name it renders under,
/// and its operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectClause {
    /// The path expression handed to the evaluator; `*` inside `count(*)`
    pub expression: String,
    /// The rendered column name; defaults to the clause's source text
    pub alias: String,
    /// Value projection or count aggregate
    pub operator: SelectOperator,
}

impl SelectClause {
    /// A plain value clause whose column name is the expression itself
    pub fn value(expression: impl Into<String>) -> Self {
        let expression = expression.into();
        Self {
            alias: expression.clone(),
            expression,
            operator: SelectOperator::Value,
        }
    }

    /// A value clause rendered under an explicit alias
    pub fn aliased(alias: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            alias: alias.into(),
            operator: SelectOperator::Value,
        }
    }

    /// A count aggregate over an inner expression (`*` counts every row)
    pub fn count(expression: impl Into<String>) -> Self {
        let expression = expression.into();
        Self {
            alias: format!("count({expression})"),
            expression,
            operator: SelectOperator::Count,
        }
    }

    /// Whether this clause is an aggregate
    pub fn is_aggregate(&self) -> bool {
        self.operator == SelectOperator::Count
    }

    /// Whether this clause is `count(*)`
    pub fn is_count_star(&self) -> bool {
        self.is_aggregate() && self.expression == "*"
    }
}

/// One SEARCH clause, combined with its siblings by AND.
///
/// `values` holds a single literal for `param = value` and the whole list
/// for `param in ('a' | 'b')`; either way the values form one OR-group in
/// the compiled criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchClause {
    /// Native search parameter name
    pub param: String,
    /// Optional modifier, e.g. `exact` in `name:exact`
    pub modifier: Option<String>,
    /// One or more value literals forming an OR-group
    pub values: Vec<Literal>,
}

impl SearchClause {
    /// A single-valued clause: `param = value`
    pub fn equals(param: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self {
            param: param.into(),
            modifier: None,
            values: vec![value.into()],
        }
    }

    /// An in-list clause: `param in (a | b | ...)`
    pub fn in_list(param: impl Into<String>, values: Vec<Literal>) -> Self {
        Self {
            param: param.into(),
            modifier: None,
            values,
        }
    }

    /// Attach a modifier (`:exact`)
    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifier = Some(modifier.into());
        self
    }
}

/// Sort direction for an ORDER BY entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One ORDER BY entry: a select-column reference plus direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByClause {
    /// Column reference: a select alias or select source text
    pub expression: String,
    /// Requested direction; nulls sort last either way
    pub direction: SortDirection,
}

impl OrderByClause {
    pub fn ascending(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// A parsed FQL statement.
///
/// Built once by the parser (or programmatically by continuation callers)
/// and immutable thereafter; execution never mutates it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statement {
    /// The record type the query operates over
    pub from: String,
    /// Ordered projection list
    pub select: Vec<SelectClause>,
    /// Optional per-record predicate, evaluated after retrieval
    pub where_clause: Option<Expression>,
    /// Native-store filter clauses, compiled into search criteria
    pub search: Vec<SearchClause>,
    /// Grouping column references (select aliases or source text)
    pub group_by: Vec<String>,
    /// Ordering entries in priority order
    pub order_by: Vec<OrderByClause>,
}

impl Statement {
    /// Create an empty statement over a table
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            ..Self::default()
        }
    }

    /// Append a plain select clause (column name = expression text)
    pub fn add_select_clause(mut self, expression: impl Into<String>) -> Self {
        self.select.push(SelectClause::value(expression));
        self
    }

    /// Append an arbitrary select clause
    pub fn add_select(mut self, clause: SelectClause) -> Self {
        self.select.push(clause);
        self
    }

    /// Set the WHERE predicate
    pub fn with_where(mut self, predicate: Expression) -> Self {
        self.where_clause = Some(predicate);
        self
    }

    /// Append a search clause
    pub fn add_search(mut self, clause: SearchClause) -> Self {
        self.search.push(clause);
        self
    }

    /// Append a grouping column reference
    pub fn add_group_by(mut self, expression: impl Into<String>) -> Self {
        self.group_by.push(expression.into());
        self
    }

    /// Append an ordering entry
    pub fn add_order_by(mut self, clause: OrderByClause) -> Self {
        self.order_by.push(clause);
        self
    }

    /// Whether any select clause is an aggregate
    pub fn has_aggregate(&self) -> bool {
        self.select.iter().any(SelectClause::is_aggregate)
    }

    /// Whether execution must buffer the fetched page before yielding rows
    /// (grouping and ordering cannot stream)
    pub fn requires_buffering(&self) -> bool {
        self.has_aggregate() || !self.group_by.is_empty() || !self.order_by.is_empty()
    }

    /// The rendered column names, in select order
    pub fn column_names(&self) -> Vec<&str> {
        self.select.iter().map(|c| c.alias.as_str()).collect()
    }

    /// Find the select index a column reference resolves to, matching the
    /// alias first and the raw expression text second
    pub fn resolve_column(&self, reference: &str) -> Option<usize> {
        self.select
            .iter()
            .position(|c| c.alias == reference)
            .or_else(|| self.select.iter().position(|c| c.expression == reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_clause_alias() {
        assert_eq!(SelectClause::count("*").alias, "count(*)");
        assert_eq!(SelectClause::count("name.family").alias, "count(name.family)");
    }

    #[test]
    fn test_builder_round_trip() {
        let statement = Statement::new("Patient")
            .add_select_clause("name.given[1]")
            .add_select_clause("name.family")
            .with_where(Expression::binary(
                crate::BinaryOp::Eq,
                Expression::path("name.family"),
                Expression::Literal(Literal::from("Simpson")),
            ));

        assert_eq!(statement.from, "Patient");
        assert_eq!(statement.column_names(), vec!["name.given[1]", "name.family"]);
        assert!(!statement.has_aggregate());
        assert!(!statement.requires_buffering());
    }

    #[test]
    fn test_resolve_column_prefers_alias() {
        let statement = Statement::new("Patient")
            .add_select(SelectClause::aliased("Given", "name.given"))
            .add_select(SelectClause::count("*"));

        assert_eq!(statement.resolve_column("Given"), Some(0));
        assert_eq!(statement.resolve_column("name.given"), Some(0));
        assert_eq!(statement.resolve_column("count(*)"), Some(1));
        assert_eq!(statement.resolve_column("missing"), None);
    }
}
