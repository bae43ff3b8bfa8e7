//! Built-in catalog for common clinical (FHIR R4) tables
//!
//! A deployment normally derives its catalog from the server's structure
//! definitions; this built-in subset covers the tables the engine's own
//! tests and tooling exercise. Columns are declared leaf paths with their
//! native types; choice-typed elements are declared under their
//! `ofType(...)` projections.

use crate::{Catalog, ParamKind, StaticCatalog, TableDefinition};
use octofhir_fql_types::DataType;
use once_cell::sync::Lazy;

static CLINICAL_CATALOG: Lazy<StaticCatalog> = Lazy::new(|| {
    StaticCatalog::new(vec![
        account(),
        encounter(),
        observation(),
        patient(),
        practitioner(),
    ])
});

/// The built-in clinical catalog
pub fn clinical_catalog() -> &'static StaticCatalog {
    &CLINICAL_CATALOG
}

/// Shortcut for a `&'static dyn Catalog` view of the built-in catalog
pub fn clinical_catalog_dyn() -> &'static dyn Catalog {
    clinical_catalog() as &dyn Catalog
}

fn account() -> TableDefinition {
    TableDefinition::new("Account")
        .with_remarks("Tracks balance, charges, for patient or cost center")
        .with_column("id", DataType::String)
        .with_column("meta.versionId", DataType::LongInt)
        .with_column("meta.lastUpdated", DataType::Date)
        .with_column("status", DataType::String)
        .with_column("name", DataType::String)
        .with_column("description", DataType::String)
        .with_column("owner.reference", DataType::String)
        .with_search_param("status", ParamKind::Token)
        .with_search_param("name", ParamKind::String)
}

fn encounter() -> TableDefinition {
    TableDefinition::new("Encounter")
        .with_remarks("An interaction during which services are provided to the patient")
        .with_column("id", DataType::String)
        .with_column("meta.versionId", DataType::LongInt)
        .with_column("meta.lastUpdated", DataType::Date)
        .with_column("status", DataType::String)
        .with_column("class.code", DataType::String)
        .with_column("period.start", DataType::Date)
        .with_column("period.end", DataType::Date)
        .with_column("subject.reference", DataType::String)
        .with_search_param("status", ParamKind::Token)
        .with_search_param("date", ParamKind::Date)
        .with_search_param("subject", ParamKind::Token)
}

fn observation() -> TableDefinition {
    TableDefinition::new("Observation")
        .with_remarks("Measurements and simple assertions")
        .with_column("id", DataType::String)
        .with_column("meta.versionId", DataType::LongInt)
        .with_column("meta.lastUpdated", DataType::Date)
        .with_column("status", DataType::String)
        .with_column("code.coding.system", DataType::String)
        .with_column("code.coding.code", DataType::String)
        .with_column("code.text", DataType::String)
        .with_column("subject.reference", DataType::String)
        .with_column("effectiveDateTime", DataType::Date)
        .with_column("value.ofType(Quantity).value", DataType::Decimal)
        .with_column("value.ofType(Quantity).system", DataType::String)
        .with_column("value.ofType(Quantity).code", DataType::String)
        .with_column("value.ofType(string)", DataType::String)
        .with_column("note.text", DataType::String)
        .with_search_param("status", ParamKind::Token)
        .with_search_param("code", ParamKind::Token)
        .with_search_param("value-quantity", ParamKind::Quantity)
        .with_search_param("date", ParamKind::Date)
        .with_search_param("subject", ParamKind::Token)
        .with_search_param("patient", ParamKind::Token)
}

fn patient() -> TableDefinition {
    TableDefinition::new("Patient")
        .with_remarks("Information about an individual receiving health care services")
        .with_column("id", DataType::String)
        .with_column("meta.versionId", DataType::LongInt)
        .with_column("meta.lastUpdated", DataType::Date)
        .with_column("active", DataType::Boolean)
        .with_column("name.family", DataType::String)
        .with_column("name.given", DataType::String)
        .with_column("name.use", DataType::String)
        .with_column("gender", DataType::String)
        .with_column("birthDate", DataType::Date)
        .with_column("address.use", DataType::String)
        .with_column("address.city", DataType::String)
        .with_column("address.state", DataType::String)
        .with_column("address.postalCode", DataType::String)
        .with_column("address.country", DataType::String)
        .with_column("address.period.start", DataType::Date)
        .with_column("address.period.end", DataType::Date)
        .with_column("telecom.system", DataType::String)
        .with_column("telecom.value", DataType::String)
        .with_column("identifier.system", DataType::String)
        .with_column("identifier.value", DataType::String)
        .with_column("maritalStatus.text", DataType::String)
        .with_search_param("name", ParamKind::String)
        .with_search_param("family", ParamKind::String)
        .with_search_param("given", ParamKind::String)
        .with_search_param("active", ParamKind::Token)
        .with_search_param("gender", ParamKind::Token)
        .with_search_param("identifier", ParamKind::Token)
        .with_search_param("birthdate", ParamKind::Date)
        .with_search_param("address-city", ParamKind::String)
}

fn practitioner() -> TableDefinition {
    TableDefinition::new("Practitioner")
        .with_remarks("A person with a formal responsibility in the provisioning of healthcare")
        .with_column("id", DataType::String)
        .with_column("meta.versionId", DataType::LongInt)
        .with_column("meta.lastUpdated", DataType::Date)
        .with_column("active", DataType::Boolean)
        .with_column("name.family", DataType::String)
        .with_column("name.given", DataType::String)
        .with_column("gender", DataType::String)
        .with_search_param("name", ParamKind::String)
        .with_search_param("active", ParamKind::Token)
}
