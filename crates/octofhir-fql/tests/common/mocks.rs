//! Mock implementations for testing
//!
//! Provides a configurable in-memory record store and a JSON path
//! evaluator covering the expression subset the executor tests exercise.

use chrono::NaiveDate;
use octofhir_fql::{
    MalformedExpressionError, PathEvaluator, Record, RecordPage, RecordSource, SearchCriteria,
    SearchId, StoreError, TypedValue,
};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One captured `search` call, for criteria assertions
#[derive(Debug, Clone)]
pub struct CapturedSearch {
    pub table: String,
    pub criteria: SearchCriteria,
    pub count: Option<usize>,
}

/// In-memory record store with a search-id registry.
///
/// Like the mocked DAO in the original executor tests, `search` returns
/// the table's canned record list regardless of criteria; the criteria are
/// captured for assertions instead of being applied.
#[derive(Default)]
pub struct MemoryRecordSource {
    tables: HashMap<String, Vec<Record>>,
    searches: Mutex<HashMap<String, Vec<Record>>>,
    captured: Mutex<Vec<CapturedSearch>>,
    expired: Mutex<HashSet<String>>,
    next_id: AtomicUsize,
}

impl MemoryRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: &str, records: Vec<Record>) -> Self {
        self.tables.insert(table.to_string(), records);
        self
    }

    /// Pre-register a continuation result set under a fixed search id
    pub fn register_search(&self, id: &str, records: Vec<Record>) {
        self.searches
            .lock()
            .unwrap()
            .insert(id.to_string(), records);
    }

    /// Make a search id fail resolution from now on
    pub fn expire(&self, id: &str) {
        self.expired.lock().unwrap().insert(id.to_string());
        self.searches.lock().unwrap().remove(id);
    }

    pub fn captured(&self) -> Vec<CapturedSearch> {
        self.captured.lock().unwrap().clone()
    }

    pub fn last_captured(&self) -> CapturedSearch {
        self.captured
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no search was issued")
    }
}

impl RecordSource for MemoryRecordSource {
    fn search(
        &self,
        table: &str,
        criteria: &SearchCriteria,
        count: Option<usize>,
    ) -> Result<RecordPage, StoreError> {
        self.captured.lock().unwrap().push(CapturedSearch {
            table: table.to_string(),
            criteria: criteria.clone(),
            count,
        });
        let records = self.tables.get(table).cloned().unwrap_or_default();
        let id = format!("search-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.searches
            .lock()
            .unwrap()
            .insert(id.clone(), records.clone());
        Ok(RecordPage::new(SearchId::new(id), 0, records))
    }

    fn resume(&self, search_id: &SearchId, from_offset: usize) -> Result<RecordPage, StoreError> {
        if self.expired.lock().unwrap().contains(search_id.as_str()) {
            return Err(StoreError::expired(search_id.as_str()));
        }
        let searches = self.searches.lock().unwrap();
        let Some(records) = searches.get(search_id.as_str()) else {
            return Err(StoreError::expired(search_id.as_str()));
        };
        let window: Vec<Record> = records.iter().skip(from_offset).cloned().collect();
        Ok(RecordPage::new(search_id.clone(), from_offset, window))
    }
}

/// Path evaluator over JSON records.
///
/// Supports dotted navigation with array flattening, `[n]` indexing,
/// `where(field = 'value')`, `ofType(Type)` over FHIR choice elements,
/// `lower()`, `contains('text')`, a leading resource-type qualifier and
/// top-level `+` string concatenation.
pub struct JsonPathEvaluator;

impl PathEvaluator for JsonPathEvaluator {
    fn evaluate(
        &self,
        record: &Record,
        expression: &str,
    ) -> Result<Vec<TypedValue>, MalformedExpressionError> {
        evaluate_expression(record, expression)
            .map_err(|message| MalformedExpressionError::new(expression, message))
    }
}

#[derive(Debug, Clone)]
struct Node {
    value: Value,
    /// Choice-type suffix when this node came from a `value[x]` lookup
    choice: Option<String>,
}

impl Node {
    fn plain(value: Value) -> Self {
        Self {
            value,
            choice: None,
        }
    }
}

#[derive(Debug)]
enum Segment {
    Field(String),
    Index(usize),
    Where(String, String),
    OfType(String),
    Lower,
    Contains(String),
}

fn evaluate_expression(record: &Record, expression: &str) -> Result<Vec<TypedValue>, String> {
    let parts = split_top_level(expression, '+')
        .ok_or_else(|| String::from("unbalanced quotes or brackets"))?;
    if parts.len() > 1 {
        let mut out = String::new();
        for part in &parts {
            let part = part.trim();
            if let Some(literal) = string_literal(part) {
                out.push_str(&literal);
            } else {
                match eval_path(record, part)?.into_iter().next() {
                    Some(value) => out.push_str(&value.to_string()),
                    None => return Ok(Vec::new()),
                }
            }
        }
        return Ok(vec![TypedValue::String(out)]);
    }
    eval_path(record, expression)
}

fn eval_path(record: &Record, path: &str) -> Result<Vec<TypedValue>, String> {
    let segments = parse_segments(path)?;
    let mut nodes = vec![Node::plain(record.document().clone())];
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Field(name) => {
                if i == 0 && record.resource_type() == Some(name.as_str()) {
                    continue;
                }
                nodes = nodes.iter().flat_map(|node| get_field(node, name)).collect();
            }
            Segment::Index(index) => {
                nodes = nodes.get(*index).cloned().into_iter().collect();
            }
            Segment::Where(field, expected) => {
                nodes.retain(|node| {
                    get_field(node, field)
                        .first()
                        .and_then(|n| n.value.as_str())
                        == Some(expected.as_str())
                });
            }
            Segment::OfType(type_name) => {
                nodes.retain(|node| {
                    node.choice
                        .as_deref()
                        .is_some_and(|tag| tag.eq_ignore_ascii_case(type_name))
                });
            }
            Segment::Lower => {
                nodes = nodes
                    .iter()
                    .filter_map(|node| node.value.as_str())
                    .map(|s| Node::plain(Value::String(s.to_lowercase())))
                    .collect();
            }
            Segment::Contains(needle) => {
                nodes = nodes
                    .iter()
                    .filter_map(|node| node.value.as_str())
                    .map(|s| Node::plain(Value::Bool(s.contains(needle.as_str()))))
                    .collect();
            }
        }
    }
    Ok(nodes.iter().filter_map(|node| to_typed(&node.value)).collect())
}

fn get_field(node: &Node, name: &str) -> Vec<Node> {
    match &node.value {
        Value::Array(items) => items
            .iter()
            .flat_map(|item| get_field(&Node::plain(item.clone()), name))
            .collect(),
        Value::Object(map) => {
            if let Some(value) = map.get(name) {
                explode(value)
            } else {
                // FHIR choice elements: `value` reaches valueQuantity etc.
                map.iter()
                    .filter(|(key, _)| {
                        key.len() > name.len()
                            && key.starts_with(name)
                            && key[name.len()..].chars().next().is_some_and(char::is_uppercase)
                    })
                    .map(|(key, value)| Node {
                        value: value.clone(),
                        choice: Some(key[name.len()..].to_string()),
                    })
                    .collect()
            }
        }
        _ => Vec::new(),
    }
}

fn explode(value: &Value) -> Vec<Node> {
    match value {
        Value::Array(items) => items.iter().map(|v| Node::plain(v.clone())).collect(),
        other => vec![Node::plain(other.clone())],
    }
}

fn to_typed(value: &Value) -> Option<TypedValue> {
    match value {
        Value::String(s) => {
            if s.len() == 10 {
                if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    return Some(TypedValue::Date(date));
                }
            }
            Some(TypedValue::String(s.clone()))
        }
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok().map(TypedValue::Decimal),
        Value::Bool(b) => Some(TypedValue::Boolean(*b)),
        _ => None,
    }
}

fn parse_segments(path: &str) -> Result<Vec<Segment>, String> {
    let raw =
        split_top_level(path, '.').ok_or_else(|| String::from("unbalanced quotes or brackets"))?;
    let mut segments = Vec::new();
    for part in raw {
        let part = part.trim();
        if part.is_empty() {
            return Err(String::from("empty path segment"));
        }
        if let Some(open) = part.find('(') {
            if !part.ends_with(')') {
                return Err(String::from("unterminated function call"));
            }
            let func = &part[..open];
            let arg = part[open + 1..part.len() - 1].trim();
            match func {
                "where" => {
                    let (field, expected) = arg
                        .split_once('=')
                        .ok_or_else(|| String::from("where() expects field = 'value'"))?;
                    let expected = string_literal(expected.trim())
                        .ok_or_else(|| String::from("where() expects a string literal"))?;
                    segments.push(Segment::Where(field.trim().to_string(), expected));
                }
                "ofType" => segments.push(Segment::OfType(arg.to_string())),
                "lower" => segments.push(Segment::Lower),
                "contains" => {
                    let needle = string_literal(arg)
                        .ok_or_else(|| String::from("contains() expects a string literal"))?;
                    segments.push(Segment::Contains(needle));
                }
                _ => return Err(format!("unknown function {func}()")),
            }
        } else if let Some(open) = part.find('[') {
            if !part.ends_with(']') {
                return Err(String::from("unterminated index"));
            }
            let index: usize = part[open + 1..part.len() - 1]
                .trim()
                .parse()
                .map_err(|_| String::from("invalid index"))?;
            segments.push(Segment::Field(part[..open].to_string()));
            segments.push(Segment::Index(index));
        } else {
            segments.push(Segment::Field(part.to_string()));
        }
    }
    Ok(segments)
}

/// Split at a separator outside quotes and brackets; `None` on unbalanced
/// input
fn split_top_level(text: &str, separator: char) -> Option<Vec<String>> {
    let mut parts = vec![String::new()];
    let mut depth = 0usize;
    let mut in_string = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_string {
            parts.last_mut().unwrap().push(c);
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    parts.last_mut().unwrap().push(chars.next().unwrap());
                } else {
                    in_string = false;
                }
            }
            continue;
        }
        match c {
            '\'' => {
                in_string = true;
                parts.last_mut().unwrap().push(c);
            }
            '(' | '[' => {
                depth += 1;
                parts.last_mut().unwrap().push(c);
            }
            ')' | ']' => {
                depth = depth.checked_sub(1)?;
                parts.last_mut().unwrap().push(c);
            }
            c if c == separator && depth == 0 => parts.push(String::new()),
            c => parts.last_mut().unwrap().push(c),
        }
    }
    if in_string || depth != 0 {
        return None;
    }
    Some(parts)
}

fn string_literal(text: &str) -> Option<String> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'"))
}
