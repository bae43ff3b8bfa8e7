//! Recursive-descent statement parser over the token stream

use crate::lexer::{Token, lex};
use octofhir_fql_ast::{
    BinaryOp, Expression, Literal, OrderByClause, SearchClause, SelectClause, SortDirection,
    Statement,
};
use octofhir_fql_diagnostics::{FqlError, Result, SourceLocation, Span, Spanned, offset_to_line_col};
use octofhir_fql_model::Catalog;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Statement parser with the catalog injected at construction.
///
/// The catalog is needed at parse time to validate the FROM table and to
/// expand `SELECT *` into the table's wildcard column list.
pub struct FqlParser<'c> {
    catalog: &'c dyn Catalog,
}

impl<'c> FqlParser<'c> {
    pub fn new(catalog: &'c dyn Catalog) -> Self {
        Self { catalog }
    }

    /// Parse a statement, failing with a positioned `Parse` error on
    /// malformed grammar or a `Validation` error on an unknown table
    pub fn parse(&self, source: &str) -> Result<Statement> {
        let tokens = lex(source)?;
        Cursor {
            source,
            tokens,
            pos: 0,
            catalog: self.catalog,
        }
        .parse()
    }
}

/// The clause keywords; an identifier only acts as one at bracket depth 0
/// and when not preceded by `.`
fn clause_keyword(token: &Token) -> Option<&'static str> {
    for keyword in ["from", "select", "where", "search", "group", "order"] {
        if token.is_word(keyword) {
            return Some(keyword);
        }
    }
    None
}

/// Stop conditions for expression-text collection, applied at depth 0 only
#[derive(Default, Clone, Copy)]
struct Stops {
    comma: bool,
    compare_op: bool,
    in_word: bool,
    direction: bool,
}

struct Cursor<'a, 'c> {
    source: &'a str,
    tokens: Vec<Spanned<Token>>,
    pos: usize,
    catalog: &'c dyn Catalog,
}

impl Cursor<'_, '_> {
    fn parse(mut self) -> Result<Statement> {
        let mut from: Option<(String, Span)> = None;
        let mut select: Vec<SelectClause> = Vec::new();
        let mut wildcard = false;
        let mut where_clause: Option<Expression> = None;
        let mut search: Vec<SearchClause> = Vec::new();
        let mut group_by: Vec<String> = Vec::new();
        let mut order_by: Vec<OrderByClause> = Vec::new();

        while let Some(spanned) = self.peek().cloned() {
            let Some(keyword) = clause_keyword(&spanned.inner) else {
                return Err(self.unexpected(&spanned));
            };
            self.pos += 1;
            match keyword {
                "from" => {
                    if from.is_some() {
                        return Err(self.error_at("Duplicate FROM clause", spanned.span));
                    }
                    from = Some(self.parse_from()?);
                }
                "select" => {
                    if wildcard || !select.is_empty() {
                        return Err(self.error_at("Duplicate SELECT clause", spanned.span));
                    }
                    wildcard = self.parse_select(&mut select)?;
                }
                "where" => {
                    if where_clause.is_some() {
                        return Err(self.error_at("Duplicate WHERE clause", spanned.span));
                    }
                    where_clause = Some(self.parse_where()?);
                }
                "search" => self.parse_search(&mut search)?,
                "group" => {
                    self.expect_word("by")?;
                    self.parse_group_by(&mut group_by)?;
                }
                "order" => {
                    self.expect_word("by")?;
                    self.parse_order_by(&mut order_by)?;
                }
                _ => unreachable!(),
            }
        }

        let Some((table_name, table_span)) = from else {
            return Err(self.error_at_end("Missing FROM clause"));
        };
        let Some(table) = self.catalog.table(&table_name) else {
            let location = self.location(table_span);
            return Err(FqlError::validation_at(
                format!(
                    "Invalid FROM statement. Unknown table name '{}' at line {}, column {}",
                    table_name, location.line, location.column
                ),
                location,
            ));
        };

        if wildcard {
            select = table
                .wildcard_columns()
                .map(|c| SelectClause::value(&c.path))
                .collect();
        }
        if select.is_empty() {
            return Err(self.error_at_end("Missing SELECT clause"));
        }

        Ok(Statement {
            from: table_name,
            select,
            where_clause,
            search,
            group_by,
            order_by,
        })
    }

    // === Clause parsers ===

    /// FROM takes a table name; consecutive bare words are joined so that
    /// multi-word names reach catalog validation as one token run
    fn parse_from(&mut self) -> Result<(String, Span)> {
        let mut parts: Vec<String> = Vec::new();
        let mut span: Option<Span> = None;
        while let Some(spanned) = self.peek().cloned() {
            match &spanned.inner {
                Token::Ident(word) if clause_keyword(&spanned.inner).is_none() => {
                    parts.push(word.clone());
                    span = Some(span.map_or(spanned.span, |s: Span| s.merge(spanned.span)));
                    self.pos += 1;
                }
                _ => break,
            }
        }
        match span {
            Some(span) if !parts.is_empty() => Ok((parts.join(" "), span)),
            _ => Err(self.error_here("Expected table name after FROM")),
        }
    }

    /// Returns true when the clause was `SELECT *`
    fn parse_select(&mut self, select: &mut Vec<SelectClause>) -> Result<bool> {
        if matches!(self.peek().map(|t| &t.inner), Some(Token::Star)) {
            self.pos += 1;
            if matches!(self.peek().map(|t| &t.inner), Some(Token::Comma)) {
                return Err(self.error_here("SELECT * cannot be combined with other select clauses"));
            }
            return Ok(true);
        }

        loop {
            let alias = self.try_alias();
            let stops = Stops {
                comma: true,
                ..Stops::default()
            };
            let Some(collected) = self.collect_expression(stops) else {
                return Err(self.error_here("Expected select expression"));
            };
            select.push(self.build_select_clause(alias, collected)?);
            if matches!(self.peek().map(|t| &t.inner), Some(Token::Comma)) {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(false)
    }

    /// An `Alias:` prefix is an identifier directly followed by a colon
    fn try_alias(&mut self) -> Option<String> {
        if let (Some(first), Some(second)) = (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)) {
            if let Token::Ident(word) = &first.inner {
                if second.inner == Token::Colon {
                    let alias = word.clone();
                    self.pos += 2;
                    return Some(alias);
                }
            }
        }
        None
    }

    fn build_select_clause(
        &self,
        alias: Option<String>,
        collected: Collected,
    ) -> Result<SelectClause> {
        let Collected { text, first, last } = collected;

        // count(...) is the one aggregate form; everything else is a value.
        // The closing paren must be the one matching the opening paren, so
        // an expression merely starting with count( is not mistaken for it.
        let is_count = self.tokens[first].inner.is_word("count")
            && last - first >= 3
            && self.tokens[first + 1].inner == Token::LParen
            && self.tokens[last - 1].inner == Token::RParen
            && self.matching_paren(first + 1) == Some(last - 1);

        if is_count {
            let inner = if last - first == 3 {
                return Err(self.error_at("Expected expression inside count()", self.tokens[first].span));
            } else if last - first == 4 && self.tokens[first + 2].inner == Token::Star {
                "*".to_string()
            } else {
                let span = self.tokens[first + 2]
                    .span
                    .merge(self.tokens[last - 2].span);
                self.source[span.as_range()].to_string()
            };
            let mut clause = SelectClause::count(inner);
            clause.alias = alias.unwrap_or(text);
            Ok(clause)
        } else {
            Ok(match alias {
                Some(alias) => SelectClause::aliased(alias, text),
                None => SelectClause::value(text),
            })
        }
    }

    fn parse_where(&mut self) -> Result<Expression> {
        let stops = Stops {
            comma: true,
            compare_op: true,
            in_word: true,
            ..Stops::default()
        };
        let Some(operand) = self.collect_expression(stops) else {
            return Err(self.error_here("Expected expression after WHERE"));
        };
        let lhs = Expression::path(operand.text);

        match self.peek().map(|t| t.inner.clone()) {
            Some(Token::Eq) => self.parse_comparison(lhs, BinaryOp::Eq),
            Some(Token::Ne) => self.parse_comparison(lhs, BinaryOp::Ne),
            Some(Token::Lt) => self.parse_comparison(lhs, BinaryOp::Lt),
            Some(Token::Le) => self.parse_comparison(lhs, BinaryOp::Le),
            Some(Token::Gt) => self.parse_comparison(lhs, BinaryOp::Gt),
            Some(Token::Ge) => self.parse_comparison(lhs, BinaryOp::Ge),
            Some(token) if token.is_word("in") => {
                self.pos += 1;
                let values = self.parse_value_list()?;
                Ok(Expression::in_list(lhs, values))
            }
            Some(Token::Comma) => Err(self.error_here("Unexpected ',' in WHERE clause")),
            _ => Ok(lhs),
        }
    }

    fn parse_comparison(&mut self, lhs: Expression, op: BinaryOp) -> Result<Expression> {
        self.pos += 1;
        let rhs = self.parse_literal()?;
        Ok(Expression::binary(op, lhs, Expression::Literal(rhs)))
    }

    fn parse_search(&mut self, search: &mut Vec<SearchClause>) -> Result<()> {
        loop {
            let param = match self.peek().cloned() {
                Some(spanned) => match &spanned.inner {
                    Token::Ident(word) if clause_keyword(&spanned.inner).is_none() => {
                        self.pos += 1;
                        word.clone()
                    }
                    _ => return Err(self.error_here("Expected search parameter name")),
                },
                None => return Err(self.error_at_end("Expected search parameter name")),
            };

            let modifier = self.try_modifier();

            let values = match self.peek().map(|t| t.inner.clone()) {
                Some(Token::Eq) => {
                    self.pos += 1;
                    vec![self.parse_literal()?]
                }
                Some(token) if token.is_word("in") => {
                    self.pos += 1;
                    self.parse_value_list()?
                }
                _ => return Err(self.error_here("Expected '=' or 'in' after search parameter")),
            };

            search.push(SearchClause {
                param,
                modifier,
                values,
            });

            if self.peek_word("and") {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// A `:modifier` suffix on a search parameter name, e.g. `name:exact`
    fn try_modifier(&mut self) -> Option<String> {
        if let (Some(first), Some(second)) = (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)) {
            if first.inner == Token::Colon {
                if let Token::Ident(word) = &second.inner {
                    let modifier = word.clone();
                    self.pos += 2;
                    return Some(modifier);
                }
            }
        }
        None
    }

    fn parse_group_by(&mut self, group_by: &mut Vec<String>) -> Result<()> {
        loop {
            let stops = Stops {
                comma: true,
                ..Stops::default()
            };
            let Some(collected) = self.collect_expression(stops) else {
                return Err(self.error_here("Expected expression after GROUP BY"));
            };
            group_by.push(collected.text);
            if matches!(self.peek().map(|t| &t.inner), Some(Token::Comma)) {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn parse_order_by(&mut self, order_by: &mut Vec<OrderByClause>) -> Result<()> {
        loop {
            let stops = Stops {
                comma: true,
                direction: true,
                ..Stops::default()
            };
            let Some(collected) = self.collect_expression(stops) else {
                return Err(self.error_here("Expected expression after ORDER BY"));
            };
            let direction = if self.peek_word("desc") {
                self.pos += 1;
                SortDirection::Descending
            } else {
                if self.peek_word("asc") {
                    self.pos += 1;
                }
                SortDirection::Ascending
            };
            order_by.push(OrderByClause {
                expression: collected.text,
                direction,
            });
            if matches!(self.peek().map(|t| &t.inner), Some(Token::Comma)) {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(())
    }

    // === Literals and value lists ===

    fn parse_literal(&mut self) -> Result<Literal> {
        let Some(spanned) = self.peek().cloned() else {
            return Err(self.error_at_end("Expected literal value"));
        };
        let literal = match &spanned.inner {
            Token::QuotedString(s) => Literal::String(s.clone()),
            Token::Number(n) if n.contains('.') => {
                let value = Decimal::from_str(n)
                    .map_err(|_| self.error_at("Invalid decimal literal", spanned.span))?;
                Literal::Decimal(value)
            }
            Token::Number(n) => {
                let value = n
                    .parse::<i64>()
                    .map_err(|_| self.error_at("Invalid integer literal", spanned.span))?;
                Literal::Integer(value)
            }
            token if token.is_word("true") => Literal::Boolean(true),
            token if token.is_word("false") => Literal::Boolean(false),
            _ => return Err(self.unexpected(&spanned)),
        };
        self.pos += 1;
        Ok(literal)
    }

    /// `( value | value | ... )`; both `|` and `,` separate values
    fn parse_value_list(&mut self) -> Result<Vec<Literal>> {
        self.expect_token(&Token::LParen, "Expected '(' after 'in'")?;
        let mut values = vec![self.parse_literal()?];
        loop {
            match self.peek().map(|t| &t.inner) {
                Some(Token::Pipe) | Some(Token::Comma) => {
                    self.pos += 1;
                    values.push(self.parse_literal()?);
                }
                Some(Token::RParen) => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error_here("Expected '|', ',' or ')' in value list")),
            }
        }
        Ok(values)
    }

    // === Expression text collection ===

    /// Consume tokens until a stop condition holds at depth 0 and return
    /// the covered source text. Returns `None` when nothing was consumed.
    fn collect_expression(&mut self, stops: Stops) -> Option<Collected> {
        let first = self.pos;
        let mut depth = 0usize;

        while let Some(spanned) = self.tokens.get(self.pos) {
            let token = &spanned.inner;
            if depth == 0 {
                match token {
                    Token::Comma if stops.comma => break,
                    Token::Eq | Token::Ne | Token::Lt | Token::Le | Token::Gt | Token::Ge
                        if stops.compare_op =>
                    {
                        break;
                    }
                    Token::RParen | Token::RBracket => break,
                    Token::Ident(_) if !self.follows_dot(self.pos) => {
                        if clause_keyword(token).is_some() {
                            break;
                        }
                        if stops.in_word && token.is_word("in") {
                            break;
                        }
                        if stops.direction && (token.is_word("asc") || token.is_word("desc")) {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            match token {
                Token::LParen | Token::LBracket => depth += 1,
                Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.pos += 1;
        }

        if self.pos == first {
            return None;
        }
        let span = self.tokens[first].span.merge(self.tokens[self.pos - 1].span);
        Some(Collected {
            text: self.source[span.as_range()].to_string(),
            first,
            last: self.pos,
        })
    }

    /// Whether the token at `pos` is directly preceded by a `.` (and is
    /// therefore a path segment, never a keyword)
    fn follows_dot(&self, pos: usize) -> bool {
        pos > 0 && self.tokens[pos - 1].inner == Token::Dot
    }

    /// Index of the parenthesis closing the one at `open`, if balanced
    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, spanned) in self.tokens.iter().enumerate().skip(open) {
            match spanned.inner {
                Token::LParen | Token::LBracket => depth += 1,
                Token::RParen | Token::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    // === Token stream helpers ===

    fn peek(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn peek_word(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.inner.is_word(word))
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        match self.peek() {
            Some(spanned) if spanned.inner.is_word(word) => {
                self.pos += 1;
                Ok(())
            }
            Some(spanned) => {
                let spanned = spanned.clone();
                Err(self.error_at(
                    format!("Expected '{}', found '{}'", word.to_uppercase(), spanned.inner.describe()),
                    spanned.span,
                ))
            }
            None => Err(self.error_at_end(format!("Expected '{}'", word.to_uppercase()))),
        }
    }

    fn expect_token(&mut self, token: &Token, message: &str) -> Result<()> {
        match self.peek() {
            Some(spanned) if spanned.inner == *token => {
                self.pos += 1;
                Ok(())
            }
            Some(spanned) => {
                let span = spanned.span;
                Err(self.error_at(message.to_string(), span))
            }
            None => Err(self.error_at_end(message.to_string())),
        }
    }

    // === Errors ===

    fn location(&self, span: Span) -> SourceLocation {
        SourceLocation::from_span(span, self.source)
    }

    fn error_at(&self, message: impl Into<String>, span: Span) -> FqlError {
        FqlError::parse(message, self.location(span))
    }

    /// Error at the current token, or at end of input when exhausted
    fn error_here(&self, message: impl Into<String>) -> FqlError {
        match self.peek() {
            Some(spanned) => self.error_at(message, spanned.span),
            None => self.error_at_end(message),
        }
    }

    fn error_at_end(&self, message: impl Into<String>) -> FqlError {
        let offset = self.source.len();
        let (line, column) = offset_to_line_col(self.source, offset);
        FqlError::parse(message, SourceLocation::point(line, column, offset))
    }

    fn unexpected(&self, spanned: &Spanned<Token>) -> FqlError {
        self.error_at(
            format!("Unexpected token '{}'", spanned.inner.describe()),
            spanned.span,
        )
    }
}

/// The result of expression-text collection: the source slice plus the
/// token range it covers
struct Collected {
    text: String,
    first: usize,
    last: usize,
}
