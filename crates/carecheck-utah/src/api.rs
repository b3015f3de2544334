//! Utah CCL public API: `facilities/{id}.json`
//!
//! Every field is optional upstream. Missing or null values become empty
//! strings, `false` or empty lists.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::model::{Finding, Id};

/// Null or missing → `T::default()`
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strings as-is, numbers and booleans stringified, null → ""
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, got {other}"
        ))),
    }
}

/// Null or missing → empty; entries that are not usable IDs are dropped with a warning
fn id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Id>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .filter_map(|value| match Id::deserialize(&value) {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("Ignoring checklist ID {value}: {e}");
                None
            }
        })
        .collect())
}

fn empty_string() -> Value {
    Value::String(String::new())
}

/// Null or missing → `""`, anything else passed through
fn types<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => empty_string(),
        other => other,
    })
}

/// Facility detail document
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityResponse {
    #[serde(default, deserialize_with = "text")]
    pub name: String,

    #[serde(default, deserialize_with = "nullable")]
    pub address: Address,

    /// First licensed date
    #[serde(default, deserialize_with = "text")]
    pub initial_regulation_date: String,

    #[serde(default, deserialize_with = "text")]
    pub expiration_date: String,

    /// License held under conditions
    #[serde(default, deserialize_with = "nullable")]
    pub conditional: bool,

    /// Newest first, as served
    #[serde(default, deserialize_with = "nullable")]
    pub inspections: Vec<Inspection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, deserialize_with = "text")]
    pub address_one: String,
    #[serde(default, deserialize_with = "text")]
    pub city: String,
    #[serde(default, deserialize_with = "text")]
    pub state: String,
    #[serde(default, deserialize_with = "text")]
    pub zip_code: String,
}

impl Address {
    /// `addressOne, city, state, zipCode` with empty parts skipped
    pub fn formatted(&self) -> String {
        [&self.address_one, &self.city, &self.state, &self.zip_code]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    #[serde(default, deserialize_with = "text")]
    pub inspection_date: String,

    /// Either a single string or a list
    #[serde(default = "empty_string", deserialize_with = "types")]
    pub inspection_types: Value,

    #[serde(default, deserialize_with = "nullable")]
    pub findings: Vec<ApiFinding>,

    #[serde(default, deserialize_with = "id_list")]
    pub checklist_ids: Vec<Id>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFinding {
    #[serde(default, deserialize_with = "text")]
    pub rule_number: String,
    #[serde(default, deserialize_with = "text")]
    pub rule_description: String,
    #[serde(default, deserialize_with = "text")]
    pub finding_text: String,
}

impl From<ApiFinding> for Finding {
    fn from(f: ApiFinding) -> Self {
        Self {
            rule_number: f.rule_number,
            rule_description: f.rule_description,
            finding_text: f.finding_text,
        }
    }
}

/// Parse a facility document.
pub fn parse_facility(body: &[u8]) -> Result<FacilityResponse, serde_json::Error> {
    serde_json::from_slice(body)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn full_document() {
        let body = json!({
            "name": "Canyon Youth Ranch",
            "address": {
                "addressOne": "100 N Main",
                "city": "Provo",
                "state": "UT",
                "zipCode": 84601
            },
            "initialRegulationDate": "2015-03-01",
            "expirationDate": "2025-03-01",
            "conditional": true,
            "inspections": [{
                "inspectionDate": "2024-01-05",
                "inspectionTypes": ["Annual", "Announced"],
                "findings": [{
                    "ruleNumber": "R501-2-5",
                    "ruleDescription": "Staff training",
                    "findingText": "Missing CPR card"
                }],
                "checklistIds": [501, "502"]
            }]
        });
        let facility = parse_facility(body.to_string().as_bytes()).unwrap();
        assert_eq!(facility.name, "Canyon Youth Ranch");
        assert_eq!(facility.address.formatted(), "100 N Main, Provo, UT, 84601");
        assert!(facility.conditional);
        let inspection = &facility.inspections[0];
        assert_eq!(inspection.inspection_types, json!(["Annual", "Announced"]));
        assert_eq!(inspection.findings[0].rule_number, "R501-2-5");
        assert_eq!(
            inspection.checklist_ids,
            vec![Id::Number(501), Id::Text("502".into())]
        );
    }

    #[test]
    fn missing_fields_default() {
        let facility = parse_facility(br#"{"inspections": [{}]}"#).unwrap();
        assert_eq!(facility.name, "");
        assert_eq!(facility.address.formatted(), "");
        assert!(!facility.conditional);
        let inspection = &facility.inspections[0];
        assert_eq!(inspection.inspection_date, "");
        assert_eq!(inspection.inspection_types, json!(""));
        assert!(inspection.findings.is_empty());
        assert!(inspection.checklist_ids.is_empty());
    }

    #[test]
    fn nulls_default() {
        let body = br#"{"name": null, "address": null, "conditional": null,
            "inspections": [{"inspectionTypes": null, "findings": null, "checklistIds": null}]}"#;
        let facility = parse_facility(body).unwrap();
        assert_eq!(facility.name, "");
        assert!(!facility.conditional);
        assert_eq!(facility.inspections[0].inspection_types, json!(""));
        assert!(facility.inspections[0].checklist_ids.is_empty());
    }

    #[test]
    fn unsafe_checklist_ids_are_dropped() {
        let body = br#"{"inspections": [{"checklistIds": ["x/../../escape", 7, "ok-1", null]}]}"#;
        let facility = parse_facility(body).unwrap();
        assert_eq!(
            facility.inspections[0].checklist_ids,
            vec![Id::Number(7), Id::Text("ok-1".into())]
        );
    }

    #[test]
    fn address_skips_empty_parts() {
        let address = Address {
            address_one: String::new(),
            city: "Ogden".into(),
            state: "UT".into(),
            zip_code: String::new(),
        };
        assert_eq!(address.formatted(), "Ogden, UT");
    }

    #[test]
    fn not_a_facility() {
        assert!(parse_facility(b"<html>Not Found</html>").is_err());
        assert!(parse_facility(b"[1, 2]").is_err());
    }
}
