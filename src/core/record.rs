//! Record abstraction consumed by the list-view engine

use crate::core::field::FieldValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A displayable row: anything that can hand out field values by name.
///
/// The engine never inspects records any other way, so typed domain
/// structs and loose field maps are interchangeable.
pub trait Record {
    /// Get the value of a field by name, `None` if the record has no such field
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Lowercased concatenation of the given fields, space separated
    fn search_text(&self, fields: &[&str]) -> String {
        fields
            .iter()
            .map(|field| {
                self.field_value(field)
                    .map(|value| value.search_text())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// An opaque field-name to value mapping that keeps insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicRecord {
    fields: IndexMap<String, FieldValue>,
}

impl DynamicRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Record for DynamicRecord {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        self.fields.get(field).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for DynamicRecord
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_text_joins_fields_in_order() {
        let record = DynamicRecord::new()
            .with("name", "Ayesha Khan")
            .with("email", "ayesha.khan@example.com")
            .with("position", "Frontend Developer");

        assert_eq!(
            record.search_text(&["name", "position"]),
            "ayesha khan frontend developer"
        );
    }

    #[test]
    fn test_search_text_missing_field_is_empty() {
        let record = DynamicRecord::new().with("name", "Ali Raza");
        assert_eq!(record.search_text(&["name", "position"]), "ali raza ");
        assert_eq!(record.search_text(&[]), "");
    }

    #[test]
    fn test_dynamic_record_from_iter() {
        let record: DynamicRecord = vec![("name", "Sara"), ("status", "pending")]
            .into_iter()
            .collect();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("status"), Some(&FieldValue::from("pending")));
        assert!(record.field_value("missing").is_none());
    }

    #[test]
    fn test_dynamic_record_json_is_flat() {
        let record = DynamicRecord::new()
            .with("name", "Hassan Ali")
            .with("match_score", 79_i64);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Hassan Ali", "match_score": 79}));
    }
}
