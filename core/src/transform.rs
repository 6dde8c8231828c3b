//! Named, versioned value transforms.
//!
//! RULE: A transform is resolved by its registry key (`name@version`) when the
//! artifact bundle is built. Nothing is looked up by symbol at request time,
//! and an unknown key fails bundle initialization.
//!
//! Every transform must be idempotent: `t(t(x)) == t(x)`. Alignment relies on
//! this to be idempotent itself.

use crate::{
    error::{AppraisalError, AppraisalResult},
    schema::FeatureKind,
    types::FeatureValue,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub trait FeatureTransform: Send + Sync {
    fn name(&self) -> &'static str;

    fn version(&self) -> u32;

    /// `None` means the value cannot be represented and is treated as absent.
    fn apply(&self, value: &FeatureValue) -> Option<FeatureValue>;

    fn key(&self) -> String {
        format!("{}@{}", self.name(), self.version())
    }
}

/// Coerces raw values onto the numeric axis.
pub struct ToNumber;

impl FeatureTransform for ToNumber {
    fn name(&self) -> &'static str {
        "to_number"
    }

    fn version(&self) -> u32 {
        1
    }

    fn apply(&self, value: &FeatureValue) -> Option<FeatureValue> {
        let x = match value {
            FeatureValue::Number(x) => *x,
            FeatureValue::Flag(b) => f64::from(u8::from(*b)),
            FeatureValue::Category(s) => s.trim().parse::<f64>().ok()?,
        };
        x.is_finite().then_some(FeatureValue::Number(x))
    }
}

/// Casts raw values to category labels, so `5` and `"5"` land on the same level.
pub struct CastToStr;

impl FeatureTransform for CastToStr {
    fn name(&self) -> &'static str {
        "cast_to_str"
    }

    fn version(&self) -> u32 {
        1
    }

    fn apply(&self, value: &FeatureValue) -> Option<FeatureValue> {
        match value {
            FeatureValue::Category(s) => Some(FeatureValue::Category(s.clone())),
            FeatureValue::Flag(b) => Some(FeatureValue::category(if *b { "Y" } else { "N" })),
            FeatureValue::Number(x) if x.is_finite() => Some(FeatureValue::Category(x.to_string())),
            FeatureValue::Number(_) => None,
        }
    }
}

#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, Arc<dyn FeatureTransform>>,
}

impl TransformRegistry {
    /// Registry pre-loaded with every transform this crate ships.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(ToNumber));
        registry.register(Arc::new(CastToStr));
        registry
    }

    pub fn register(&mut self, transform: Arc<dyn FeatureTransform>) {
        self.transforms.insert(transform.key(), transform);
    }

    pub fn resolve(&self, key: &str) -> AppraisalResult<Arc<dyn FeatureTransform>> {
        self.transforms
            .get(key)
            .cloned()
            .ok_or_else(|| AppraisalError::UnknownTransform { name: key.to_string() })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }
}

/// Transform keys per feature kind, as written in `schema.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformNames {
    pub numeric:     String,
    pub categorical: String,
}

impl Default for TransformNames {
    fn default() -> Self {
        Self {
            numeric:     ToNumber.key(),
            categorical: CastToStr.key(),
        }
    }
}

/// The resolved per-kind transforms used by alignment.
#[derive(Clone)]
pub struct Coercion {
    numeric:     Arc<dyn FeatureTransform>,
    categorical: Arc<dyn FeatureTransform>,
}

impl Coercion {
    pub fn resolve(names: &TransformNames, registry: &TransformRegistry) -> AppraisalResult<Self> {
        Ok(Self {
            numeric:     registry.resolve(&names.numeric)?,
            categorical: registry.resolve(&names.categorical)?,
        })
    }

    pub fn coerce(&self, kind: FeatureKind, value: &FeatureValue) -> Option<FeatureValue> {
        if value.is_non_finite() {
            return None;
        }
        match kind {
            FeatureKind::Numeric => self.numeric.apply(value),
            FeatureKind::Categorical => self.categorical.apply(value),
        }
    }

    pub fn names(&self) -> TransformNames {
        TransformNames {
            numeric:     self.numeric.key(),
            categorical: self.categorical.key(),
        }
    }
}

impl Default for Coercion {
    fn default() -> Self {
        Self {
            numeric:     Arc::new(ToNumber),
            categorical: Arc::new(CastToStr),
        }
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coercion")
            .field("numeric", &self.numeric.key())
            .field("categorical", &self.categorical.key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_number_parses_and_rejects() {
        let t = ToNumber;
        assert_eq!(t.apply(&FeatureValue::category(" 1500 ")), Some(FeatureValue::Number(1500.0)));
        assert_eq!(t.apply(&FeatureValue::Flag(true)), Some(FeatureValue::Number(1.0)));
        assert_eq!(t.apply(&FeatureValue::category("Ex")), None);
        assert_eq!(t.apply(&FeatureValue::category("inf")), None);
    }

    #[test]
    fn cast_to_str_renders_numbers_as_levels() {
        let t = CastToStr;
        assert_eq!(t.apply(&FeatureValue::Number(5.0)), Some(FeatureValue::category("5")));
        assert_eq!(t.apply(&FeatureValue::Number(2.5)), Some(FeatureValue::category("2.5")));
        assert_eq!(t.apply(&FeatureValue::Flag(false)), Some(FeatureValue::category("N")));
    }

    #[test]
    fn transforms_are_idempotent() {
        let samples = [
            FeatureValue::Number(60.0),
            FeatureValue::category("60"),
            FeatureValue::category("NAmes"),
            FeatureValue::Flag(true),
        ];
        let transforms: [&dyn FeatureTransform; 2] = [&ToNumber, &CastToStr];
        for t in transforms {
            for s in &samples {
                let once = t.apply(s);
                let twice = once.as_ref().and_then(|v| t.apply(v));
                assert_eq!(once, twice, "{} not idempotent on {s:?}", t.key());
            }
        }
    }

    #[test]
    fn unknown_transform_key_fails() {
        let names = TransformNames {
            numeric:     "to_number@1".into(),
            categorical: "cast_to_str@9".into(),
        };
        let err = Coercion::resolve(&names, &TransformRegistry::builtin()).unwrap_err();
        assert!(matches!(err, AppraisalError::UnknownTransform { name } if name == "cast_to_str@9"));
    }
}
