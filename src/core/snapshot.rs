//! Request-scoped form snapshot
//!
//! One `FormSnapshot` exists per form-processing run. It holds the ordered
//! structural field set, the mutable field->value data the pipeline stages
//! operate on, and the originally bound record. It is created when the form
//! is instantiated and discarded after the validate/persist cycle; no
//! history is kept.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::field::FieldDescriptor;

/// The previously persisted values a form was bound to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, String>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Like `get`, but an empty string counts as absent
    pub fn get_nonempty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The mutable form state one pipeline invocation works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    fields: Vec<FieldDescriptor>,
    data: Vec<(String, String)>,
    record: Record,
    discarded: bool,
}

impl FormSnapshot {
    /// Create a snapshot over the statically declared field set
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            fields,
            data: Vec::new(),
            record: Record::new(),
            discarded: false,
        }
    }

    // ----- structural field set -----

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Replace the descriptor with the same name in place, or append it
    pub fn upsert_field(&mut self, descriptor: FieldDescriptor) {
        match self.fields.iter_mut().find(|f| f.name == descriptor.name) {
            Some(slot) => *slot = descriptor,
            None => self.fields.push(descriptor),
        }
    }

    /// Remove a descriptor; returns whether it existed
    pub fn remove_field(&mut self, name: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.name != name);
        self.fields.len() != before
    }

    // ----- bound record -----

    /// Bind a record: remembers it and seeds values for declared fields
    pub fn bind_record(&mut self, record: Record) {
        for field in &self.fields {
            if let Some(value) = record.get(&field.name) {
                let name = field.name.clone();
                let value = value.to_string();
                set_pair(&mut self.data, name, value);
            }
        }
        self.record = record;
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    // ----- field values -----

    /// Replace the working data with a raw submission, as received
    pub fn begin_submission(&mut self, data: impl IntoIterator<Item = (String, String)>) {
        self.data = data.into_iter().collect();
    }

    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.data.iter().any(|(k, _)| k == name)
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        set_pair(&mut self.data, name.into(), value.into());
    }

    /// Drop a key from the data; absent keys are a no-op
    pub fn unset_value(&mut self, name: &str) -> bool {
        let before = self.data.len();
        self.data.retain(|(k, _)| k != name);
        self.data.len() != before
    }

    /// Field->value pairs in their current order
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether every present value is the empty string
    pub fn all_values_empty(&self) -> bool {
        self.data.iter().all(|(_, v)| v.is_empty())
    }

    // ----- discard flag -----

    /// Mark the whole submission as discarded (bound record cleared)
    pub fn mark_discarded(&mut self) {
        self.discarded = true;
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded
    }
}

fn set_pair(data: &mut Vec<(String, String)>, name: String, value: String) {
    match data.iter_mut().find(|(k, _)| *k == name) {
        Some((_, slot)) => *slot = value,
        None => data.push((name, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::WidgetKind;

    fn snapshot() -> FormSnapshot {
        FormSnapshot::new(vec![
            FieldDescriptor::new("country", WidgetKind::Select),
            FieldDescriptor::new("region_text", WidgetKind::Text),
        ])
    }

    #[test]
    fn test_bind_record_seeds_declared_fields_only() {
        let mut snap = snapshot();
        let record: Record = [
            ("country".to_string(), "US".to_string()),
            ("region".to_string(), "US-CA".to_string()),
        ]
        .into_iter()
        .collect();

        snap.bind_record(record);

        assert_eq!(snap.value_of("country"), Some("US"));
        // "region" is not a declared field, so binding must not create it
        assert!(!snap.has_value("region"));
        assert_eq!(snap.record().get("region"), Some("US-CA"));
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut snap = snapshot();
        let replacement = FieldDescriptor::new("country", WidgetKind::Hidden);
        snap.upsert_field(replacement);

        assert_eq!(snap.fields().len(), 2);
        assert_eq!(snap.fields()[0].name, "country");
        assert_eq!(snap.fields()[0].widget, WidgetKind::Hidden);
    }

    #[test]
    fn test_upsert_appends_new_field() {
        let mut snap = snapshot();
        snap.upsert_field(FieldDescriptor::new("region", WidgetKind::Select));

        let names: Vec<&str> = snap.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["country", "region_text", "region"]);
    }

    #[test]
    fn test_unset_value_is_noop_for_absent_key() {
        let mut snap = snapshot();
        snap.begin_submission([("country".to_string(), "US".to_string())]);

        assert!(!snap.unset_value("region"));
        assert!(snap.unset_value("country"));
        assert!(!snap.has_value("country"));
    }

    #[test]
    fn test_begin_submission_replaces_bound_data() {
        let mut snap = snapshot();
        snap.bind_record([("country".to_string(), "US".to_string())].into_iter().collect());
        snap.begin_submission([("region_text".to_string(), "Somewhere".to_string())]);

        assert!(!snap.has_value("country"));
        assert_eq!(snap.value_of("region_text"), Some("Somewhere"));
        // the bound record survives submission start
        assert_eq!(snap.record().get("country"), Some("US"));
    }

    #[test]
    fn test_all_values_empty() {
        let mut snap = snapshot();
        snap.begin_submission([
            ("country".to_string(), String::new()),
            ("region_text".to_string(), String::new()),
        ]);
        assert!(snap.all_values_empty());

        snap.set_value("country", "US");
        assert!(!snap.all_values_empty());
    }
}
