//! Training-time lookup tables: per-feature defaults and the correlation drop-list.
//!
//! Both are loaded once and never written to afterwards.

use crate::{
    schema::Schema,
    transform::Coercion,
    types::FeatureValue,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Fallback value per feature (training median for numerics, mode for categoricals).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultsTable {
    values: HashMap<String, FeatureValue>,
}

impl DefaultsTable {
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Coerce each default to its feature's kind.
    ///
    /// A default that cannot be coerced is dropped (the imputer then falls
    /// back to the kind's neutral value). Entries for features outside the
    /// schema are kept; they are harmless and useful when reading the table.
    pub fn normalized(self, schema: &Schema, coercion: &Coercion) -> Self {
        let values = self
            .values
            .into_iter()
            .filter_map(|(name, value)| match schema.kind(&name) {
                None => Some((name, value)),
                Some(kind) => match coercion.coerce(kind, &value) {
                    Some(v) => Some((name, v)),
                    None => {
                        log::warn!("defaults: dropping '{name}' = {value:?} (not a valid {kind:?} value)");
                        None
                    }
                },
            })
            .collect();
        Self { values }
    }
}

impl FromIterator<(String, FeatureValue)> for DefaultsTable {
    fn from_iter<I: IntoIterator<Item = (String, FeatureValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Columns removed before valuation, chosen offline by an upper-triangular
/// scan of pairwise absolute correlation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationPruneList {
    columns: BTreeSet<String>,
}

impl CorrelationPruneList {
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CorrelationPruneList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(Into::into).collect(),
        }
    }
}
