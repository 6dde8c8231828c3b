//! Shared primitive types used across the entire valuation pipeline.
//!
//! RULE: A `PropertyRecord` is what callers hand us (sparse, loosely typed).
//! A `FeatureVector` is what the estimator receives (dense, schema-ordered).
//! Nothing converts one into the other except the pipeline.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A currency amount in USD.
pub type Usd = f64;

/// A single raw or aligned feature value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Flag(bool),
    Number(f64),
    Category(String),
}

impl FeatureValue {
    pub fn category(s: impl Into<String>) -> Self {
        Self::Category(s.into())
    }

    /// Numeric view. Only `Number` answers; categories are never parsed here.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Category(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// NaN and ±∞ count as missing data, not as values.
    pub fn is_non_finite(&self) -> bool {
        matches!(self, Self::Number(x) if !x.is_finite())
    }
}

impl From<f64> for FeatureValue {
    fn from(x: f64) -> Self {
        Self::Number(x)
    }
}

impl From<i64> for FeatureValue {
    fn from(x: i64) -> Self {
        Self::Number(x as f64)
    }
}

impl From<i32> for FeatureValue {
    fn from(x: i32) -> Self {
        Self::Number(f64::from(x))
    }
}

impl From<bool> for FeatureValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        Self::Category(s.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        Self::Category(s)
    }
}

/// Anything the aligner can read named fields from.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<&FeatureValue>;
}

/// A sparse, caller-supplied description of a property.
///
/// Keys outside the schema are kept for audit; alignment ignores them.
/// JSON `null` values deserialize as absent. Serializes as a flat object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawRecord")]
pub struct PropertyRecord {
    fields: BTreeMap<String, FeatureValue>,
}

#[derive(Deserialize)]
struct RawRecord(BTreeMap<String, Option<FeatureValue>>);

impl From<RawRecord> for PropertyRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            fields: raw
                .0
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k, v)))
                .collect(),
        }
    }
}

impl PropertyRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy in tests and fixtures.
    pub fn with(mut self, name: &str, value: impl Into<FeatureValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FeatureValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FeatureValue)> {
        self.fields.iter()
    }
}

impl Serialize for PropertyRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl FieldSource for PropertyRecord {
    fn field(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.get(name)
    }
}

impl FromIterator<(String, FeatureValue)> for PropertyRecord {
    fn from_iter<I: IntoIterator<Item = (String, FeatureValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A dense, ordered feature vector. The only input type an estimator accepts.
///
/// Column order is the schema order, followed by any engineered columns in
/// the order they were derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    columns: IndexMap<String, FeatureValue>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FeatureValue::as_number)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Overwrites in place if the column exists, appends otherwise.
    pub fn set(&mut self, name: &str, value: impl Into<FeatureValue>) {
        match self.columns.get_mut(name) {
            Some(slot) => *slot = value.into(),
            None => {
                self.columns.insert(name.to_string(), value.into());
            }
        }
    }

    /// Removes a column, keeping the relative order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<FeatureValue> {
        self.columns.shift_remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FeatureValue)> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FieldSource for FeatureVector {
    fn field(&self, name: &str) -> Option<&FeatureValue> {
        self.columns.get(name)
    }
}

impl FromIterator<(String, FeatureValue)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (String, FeatureValue)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_json_nulls_are_absent() {
        let record: PropertyRecord =
            serde_json::from_str(r#"{"GrLivArea": 1500, "PoolQC": null, "Neighborhood": "NAmes"}"#)
                .unwrap();

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("GrLivArea"), Some(&FeatureValue::Number(1500.0)));
        assert!(record.get("PoolQC").is_none());
    }

    #[test]
    fn vector_set_keeps_column_position() {
        let mut v: FeatureVector = vec![
            ("A".to_string(), FeatureValue::Number(1.0)),
            ("B".to_string(), FeatureValue::Number(2.0)),
        ]
        .into_iter()
        .collect();

        v.set("A", 5.0);
        v.set("C", 3.0);

        let names: Vec<&str> = v.names().collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(v.number("A"), Some(5.0));
    }
}
