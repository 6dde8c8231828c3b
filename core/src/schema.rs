//! The ordered feature schema the estimator was trained on.
//!
//! RULE: Order is significant. Every vector the pipeline produces starts
//! with these columns, in exactly this order.

use crate::{
    error::{AppraisalError, AppraisalResult},
    types::FeatureValue,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The placeholder category used when a categorical feature has no value at all.
pub const NONE_CATEGORY: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Numeric,
    Categorical,
}

impl FeatureKind {
    /// Last-resort fill value when the defaults table has nothing.
    pub fn neutral(self) -> FeatureValue {
        match self {
            Self::Numeric => FeatureValue::Number(0.0),
            Self::Categorical => FeatureValue::category(NONE_CATEGORY),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn numeric(name: &str) -> Self {
        Self { name: name.to_string(), kind: FeatureKind::Numeric }
    }

    pub fn categorical(name: &str) -> Self {
        Self { name: name.to_string(), kind: FeatureKind::Categorical }
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    features: Vec<FeatureSpec>,
    index:    HashMap<String, usize>,
}

impl Schema {
    /// Build a schema, rejecting empty and duplicate names.
    pub fn new(features: Vec<FeatureSpec>) -> AppraisalResult<Self> {
        let mut index = HashMap::with_capacity(features.len());
        for (pos, spec) in features.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(AppraisalError::InvalidSchema {
                    reason: format!("feature #{pos} has an empty name"),
                });
            }
            if index.insert(spec.name.clone(), pos).is_some() {
                return Err(AppraisalError::InvalidSchema {
                    reason: format!("duplicate feature '{}'", spec.name),
                });
            }
        }
        Ok(Self { features, index })
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&FeatureSpec> {
        self.index.get(name).map(|&i| &self.features[i])
    }

    pub fn kind(&self, name: &str) -> Option<FeatureKind> {
        self.get(name).map(|f| f.kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_feature_rejected() {
        let err = Schema::new(vec![
            FeatureSpec::numeric("GrLivArea"),
            FeatureSpec::categorical("Neighborhood"),
            FeatureSpec::numeric("GrLivArea"),
        ])
        .unwrap_err();

        assert!(matches!(err, AppraisalError::InvalidSchema { .. }));
    }

    #[test]
    fn positions_follow_declaration_order() {
        let schema = Schema::new(vec![
            FeatureSpec::numeric("LotArea"),
            FeatureSpec::categorical("Neighborhood"),
        ])
        .unwrap();

        assert_eq!(schema.position("Neighborhood"), Some(1));
        assert_eq!(schema.kind("LotArea"), Some(FeatureKind::Numeric));
        assert!(schema.get("MarsBase").is_none());
    }
}
