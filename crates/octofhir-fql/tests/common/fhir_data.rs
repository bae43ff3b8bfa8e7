//! Canned clinical records for executor tests

use octofhir_fql::Record;
use serde_json::json;

pub fn patient_homer_simpson() -> Record {
    patient(&[("Simpson", &["Homer", "Jay"])], "value0")
}

pub fn patient_ned_flanders() -> Record {
    patient(&[("Flanders", &["Ned"])], "value1")
}

pub fn patient_bart_simpson() -> Record {
    patient(&[("Simpson", &["Bart", "El Barto"])], "value2")
}

pub fn patient_lisa_simpson() -> Record {
    patient(&[("Simpson", &["Lisa", "Marie"])], "value3")
}

pub fn patient_maggie_simpson() -> Record {
    patient(&[("Simpson", &["Maggie", "Evelyn"])], "value4")
}

fn patient(names: &[(&str, &[&str])], identifier_value: &str) -> Record {
    let names: Vec<_> = names
        .iter()
        .map(|(family, given)| json!({"family": family, "given": given}))
        .collect();
    Record::new(json!({
        "resourceType": "Patient",
        "name": names,
        "identifier": [{"system": "http://system", "value": identifier_value}],
    }))
}

/// Set a top-level field on an existing record
pub fn with_field(record: Record, field: &str, value: serde_json::Value) -> Record {
    let mut document = record.document().clone();
    document[field] = value;
    Record::new(document)
}

pub fn empty_patient() -> Record {
    Record::new(json!({"resourceType": "Patient"}))
}

pub fn simpsons_and_flanders() -> Vec<Record> {
    vec![
        patient_homer_simpson(),
        patient_ned_flanders(),
        patient_bart_simpson(),
        patient_lisa_simpson(),
        patient_maggie_simpson(),
    ]
}

pub fn simpsons_and_flanders_with_duplicates() -> Vec<Record> {
    vec![
        patient_homer_simpson(),
        patient_homer_simpson(),
        patient_ned_flanders(),
        patient_ned_flanders(),
        patient_bart_simpson(),
        patient_lisa_simpson(),
        patient_maggie_simpson(),
    ]
}

/// Four patients with progressively sparser names: none, family only,
/// given only, both
pub fn sparse_names() -> Vec<Record> {
    vec![
        Record::new(json!({"resourceType": "Patient", "active": true})),
        Record::new(json!({"resourceType": "Patient", "name": [{"family": "Simpson"}]})),
        Record::new(json!({"resourceType": "Patient", "name": [{"given": ["Homer"]}]})),
        Record::new(json!({
            "resourceType": "Patient",
            "name": [{"family": "Simpson", "given": ["Homer"]}],
        })),
    ]
}

pub fn cardiology_note_observation(id: &str, note_text: &str) -> Record {
    Record::new(json!({
        "resourceType": "Observation",
        "id": id,
        "code": {"coding": [{"system": "http://loinc.org", "code": "34752-6"}]},
        "valueString": note_text,
    }))
}

pub fn weight_observation_kilos(id: &str, kilos: i64) -> Record {
    Record::new(json!({
        "resourceType": "Observation",
        "id": id,
        "code": {"coding": [{"system": "http://loinc.org", "code": "29463-7"}]},
        "valueQuantity": {
            "value": kilos,
            "system": "http://unitsofmeasure.org",
            "code": "kg",
        },
    }))
}
