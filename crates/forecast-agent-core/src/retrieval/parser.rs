//! Field extraction from `header1,header2:value1,value2` candidate text

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Header → value mapping parsed from one candidate's text, in header order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCandidateRecord {
    fields: Vec<(String, String)>,
}

impl ParsedCandidateRecord {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Exact-key lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Compact JSON object, keys in header order
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn insert(&mut self, key: String, value: String) {
        // Repeated headers keep their first position and take the last value
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.fields.push((key, value)),
        }
    }
}

impl Serialize for ParsedCandidateRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Parse candidate text of the form `header1,...,headerN:value1,...,valueN`.
///
/// Splits on the first colon only; each side is read as one CSV record
/// (quote-aware) and the two are zipped positionally, truncating to the
/// shorter side. Text without a colon yields an empty record.
pub fn parse_candidate_text(text: &str) -> ParsedCandidateRecord {
    let mut record = ParsedCandidateRecord::default();

    let Some((header_part, value_part)) = text.split_once(':') else {
        return record;
    };

    let headers = read_csv_record(header_part);
    let values = read_csv_record(value_part);

    for (header, value) in headers.iter().zip(values.iter()) {
        record.insert(header.to_string(), value.to_string());
    }

    record
}

fn read_csv_record(segment: &str) -> StringRecord {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(segment.as_bytes());

    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record,
        Ok(false) => StringRecord::new(),
        Err(e) => {
            tracing::debug!("Unparseable CSV segment {:?}: {}", segment, e);
            StringRecord::new()
        }
    }
}

/// Anything that exposes string key/value pairs for [`get_field`]
pub trait FieldSource {
    fn field_entries(&self) -> Vec<(&str, &str)>;
}

impl FieldSource for ParsedCandidateRecord {
    fn field_entries(&self) -> Vec<(&str, &str)> {
        self.iter().collect()
    }
}

impl FieldSource for BTreeMap<String, String> {
    fn field_entries(&self) -> Vec<(&str, &str)> {
        self.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }
}

impl FieldSource for HashMap<String, String> {
    fn field_entries(&self) -> Vec<(&str, &str)> {
        self.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }
}

/// Lowercase, alphanumeric-only form of a key
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Look up the first alias present in `source`.
///
/// Exact keys are tried first, in alias order; then keys are compared in
/// normalized form so `"Content With Weight"` matches `content_with_weight`.
pub fn get_field<'a, S>(source: &'a S, aliases: &[&str]) -> Option<&'a str>
where
    S: FieldSource + ?Sized,
{
    let entries = source.field_entries();
    if entries.is_empty() {
        return None;
    }

    for alias in aliases {
        if let Some((_, value)) = entries.iter().find(|(k, _)| k == alias) {
            return Some(*value);
        }
    }

    let normalized: Vec<(String, &'a str)> = entries
        .iter()
        .map(|(k, v)| (normalize_key(k), *v))
        .collect();

    for alias in aliases {
        let wanted = normalize_key(alias);
        if let Some((_, value)) = normalized.iter().find(|(k, _)| *k == wanted) {
            return Some(*value);
        }
    }

    None
}
