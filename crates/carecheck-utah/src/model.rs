//! Output records: facility → inspection → finding / checklist

use std::fmt;
use std::str::FromStr;

use carecheck_extract::Extraction;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Facility or checklist identifier.
///
/// The API uses numbers, but some exports carry them as strings; either form
/// is written back the way it was received. IDs end up in file names, so
/// text IDs are limited to `[A-Za-z0-9_-]` however they arrive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Id {
    Number(u64),
    Text(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Non-empty and only `[A-Za-z0-9_-]`
fn is_safe_text(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Id {
    /// Safe to use as part of a file name.
    pub fn is_safe(&self) -> bool {
        match self {
            Self::Number(_) => true,
            Self::Text(s) => is_safe_text(s),
        }
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl FromStr for Id {
    type Err = String;

    /// Digits become [`Id::Number`]; other non-blank tokens without
    /// whitespace or path separators become [`Id::Text`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty ID".to_string());
        }
        if let Ok(n) = s.parse::<u64>() {
            return Ok(Self::Number(n));
        }
        if is_safe_text(s) {
            Ok(Self::Text(s.to_string()))
        } else {
            Err(format!("invalid ID: {s:?}"))
        }
    }
}

struct IdVisitor;

impl Visitor<'_> for IdVisitor {
    type Value = Id;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a string of [A-Za-z0-9_-]")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Id, E> {
        Ok(Id::Number(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Id, E> {
        u64::try_from(v)
            .map(Id::Number)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    // Strings stay strings, even all-digit ones
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Id, E> {
        if is_safe_text(v) {
            Ok(Id::Text(v.to_string()))
        } else {
            Err(E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IdVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub facility_id: Id,
    pub name: String,
    pub address: String,
    pub regulation_date: String,
    pub expiration_date: String,
    pub conditional: bool,
    pub inspections: Vec<InspectionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub inspection_date: String,
    /// Passed through as received: a string or a list of strings
    pub inspection_types: Value,
    pub findings: Vec<Finding>,
    pub checklists: Vec<ChecklistResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_number: String,
    pub rule_description: String,
    pub finding_text: String,
}

/// Extraction result for one downloaded checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistResult {
    pub checklist_id: Id,
    #[serde(flatten)]
    pub extraction: Extraction,
    /// Where the PDF was saved
    pub pdf_file: String,
}
