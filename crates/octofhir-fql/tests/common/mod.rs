//! Shared test fixtures
#![allow(dead_code)]

pub mod fhir_data;
pub mod mocks;

use mocks::{JsonPathEvaluator, MemoryRecordSource};
use octofhir_fql::{FqlEngine, Record, clinical_catalog};
use std::sync::Arc;

/// An engine over the built-in catalog, a canned record table and the JSON
/// path evaluator. Also returns the store for criteria/continuation
/// assertions.
pub fn engine_with(table: &str, records: Vec<Record>) -> (FqlEngine, Arc<MemoryRecordSource>) {
    let store = Arc::new(MemoryRecordSource::new().with_table(table, records));
    let engine = FqlEngine::new(
        Arc::new(clinical_catalog().clone()),
        store.clone(),
        Arc::new(JsonPathEvaluator),
    );
    (engine, store)
}

/// An engine with an empty store
pub fn engine() -> (FqlEngine, Arc<MemoryRecordSource>) {
    engine_with("Patient", Vec::new())
}
