//! Guardrails: clamp magnitudes the estimator was never trained on.
//!
//! This is the last line of defence against a 200,000 sqft "house" being
//! extrapolated linearly into a nine-figure price.
//!
//! RULES:
//!   - A rule applies only when its feature is present and numeric.
//!     Anything else is a silent pass-through.
//!   - Clamping is total. Any f64 goes in, a bounded f64 comes out.

use crate::{
    columns::{GR_LIV_AREA, OVERALL_QUAL},
    stage::{ClampEvent, PipelineTrace, VectorStage},
    types::{FeatureValue, FeatureVector},
};
use serde::{Deserialize, Serialize};

/// Largest living area the estimator is trusted with.
pub const MAX_GR_LIV_AREA: f64 = 10_000.0;

/// Top of the 1–10 quality scale.
pub const MAX_OVERALL_QUAL: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Clamp {
    AtMost { max: f64 },
    AtLeast { min: f64 },
    Between { min: f64, max: f64 },
}

impl Clamp {
    /// NaN collapses onto the bound (`f64::min`/`max` ignore a NaN operand).
    pub fn apply(&self, x: f64) -> f64 {
        match *self {
            Self::AtMost { max } => x.min(max),
            Self::AtLeast { min } => x.max(min),
            Self::Between { min, max } => x.max(min).min(max),
        }
    }

    /// Bounds must be finite and `min <= max`.
    pub fn is_well_formed(&self) -> bool {
        match *self {
            Self::AtMost { max } => max.is_finite(),
            Self::AtLeast { min } => min.is_finite(),
            Self::Between { min, max } => min.is_finite() && max.is_finite() && min <= max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailRule {
    pub feature: String,
    pub clamp:   Clamp,
}

impl GuardrailRule {
    pub fn at_most(feature: &str, max: f64) -> Self {
        Self {
            feature: feature.to_string(),
            clamp:   Clamp::AtMost { max },
        }
    }
}

/// `GrLivArea <= 10000`, `OverallQual <= 10`.
pub fn default_rules() -> Vec<GuardrailRule> {
    vec![
        GuardrailRule::at_most(GR_LIV_AREA, MAX_GR_LIV_AREA),
        GuardrailRule::at_most(OVERALL_QUAL, MAX_OVERALL_QUAL),
    ]
}

#[derive(Debug, Clone)]
pub struct Guardrail {
    rules: Vec<GuardrailRule>,
}

impl Guardrail {
    pub fn new(rules: Vec<GuardrailRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[GuardrailRule] {
        &self.rules
    }
}

impl Default for Guardrail {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl VectorStage for Guardrail {
    fn name(&self) -> &'static str {
        "guardrail"
    }

    fn apply(&self, vector: &mut FeatureVector, trace: &mut PipelineTrace) {
        for rule in &self.rules {
            let Some(raw) = vector.number(&rule.feature) else {
                continue;
            };
            let clamped = rule.clamp.apply(raw);
            // Bit comparison so a NaN input still counts as an intervention.
            if clamped.to_bits() != raw.to_bits() {
                log::warn!(
                    "guardrail: capping {} {} -> {}",
                    rule.feature, raw, clamped
                );
                vector.set(&rule.feature, FeatureValue::Number(clamped));
                trace.clamped.push(ClampEvent {
                    feature: rule.feature.clone(),
                    raw,
                    clamped,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_is_total() {
        let c = Clamp::AtMost { max: 10.0 };
        assert_eq!(c.apply(1e300), 10.0);
        assert_eq!(c.apply(f64::INFINITY), 10.0);
        assert_eq!(c.apply(-5.0), -5.0);
        assert_eq!(c.apply(f64::NAN), 10.0);

        let b = Clamp::Between { min: 1.0, max: 10.0 };
        assert_eq!(b.apply(-3.0), 1.0);
        assert_eq!(b.apply(f64::NEG_INFINITY), 1.0);
    }

    #[test]
    fn categorical_value_on_ruled_feature_passes_through() {
        let mut v: FeatureVector =
            vec![("OverallQual".to_string(), FeatureValue::category("Ex"))].into_iter().collect();
        let mut trace = PipelineTrace::default();

        Guardrail::default().apply(&mut v, &mut trace);

        assert_eq!(v.get("OverallQual"), Some(&FeatureValue::category("Ex")));
        assert!(trace.clamped.is_empty());
    }

    #[test]
    fn rule_json_shape() {
        let rule: GuardrailRule =
            serde_json::from_str(r#"{"feature":"LotArea","clamp":{"op":"between","min":0,"max":200000}}"#)
                .unwrap();
        assert_eq!(rule.clamp, Clamp::Between { min: 0.0, max: 200_000.0 });
        assert!(rule.clamp.is_well_formed());
    }
}
