//! The estimator seam.
//!
//! The valuation model itself is opaque to this crate: anything that turns a
//! `FeatureVector` into a price can sit behind `Estimator`. `LinearEstimator`
//! is the reference implementation shipped with the data bundle.
//!
//! RULE: Estimator failures propagate to the caller unchanged. There is no
//! retry and no fallback price.

use crate::{
    error::{AppraisalError, AppraisalResult},
    types::{FeatureValue, FeatureVector, Usd},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The contract every valuation model must fulfill.
pub trait Estimator: Send + Sync {
    fn name(&self) -> &str;

    /// May fail on malformed input. May return a non-finite value; the
    /// caller checks (see [`checked_predict`]).
    fn predict(&self, vector: &FeatureVector) -> AppraisalResult<Usd>;
}

/// Call the estimator and reject non-finite output.
pub fn checked_predict(estimator: &dyn Estimator, vector: &FeatureVector) -> AppraisalResult<Usd> {
    let value = estimator.predict(vector)?;
    if !value.is_finite() {
        return Err(AppraisalError::NonFiniteValuation {
            estimator: estimator.name().to_string(),
            value,
        });
    }
    Ok(value)
}

/// A linear model over numeric columns plus per-level categorical effects.
///
/// `score = intercept + Σ coef·x + Σ effect(level)`; with `log_target` the
/// price is `exp(score)`. Unknown categorical levels contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearEstimator {
    pub name:        String,
    pub intercept:   f64,
    #[serde(default)]
    pub log_target:  bool,
    #[serde(default)]
    pub numeric:     HashMap<String, f64>,
    #[serde(default)]
    pub categorical: HashMap<String, HashMap<String, f64>>,
}

impl LinearEstimator {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let estimator: Self = serde_json::from_str(&content)?;
        log::info!(
            "estimator: loaded '{}' ({} numeric, {} categorical terms)",
            estimator.name,
            estimator.numeric.len(),
            estimator.categorical.len()
        );
        Ok(estimator)
    }

    fn fail(&self, message: String) -> AppraisalError {
        AppraisalError::Estimator {
            estimator: self.name.clone(),
            message,
        }
    }

    fn score(&self, vector: &FeatureVector) -> AppraisalResult<f64> {
        let mut score = self.intercept;

        for (column, coef) in &self.numeric {
            let x = match vector.get(column) {
                Some(FeatureValue::Number(x)) => *x,
                Some(other) => {
                    return Err(self.fail(format!("column '{column}' must be numeric, got {other:?}")))
                }
                None => return Err(self.fail(format!("missing numeric column '{column}'"))),
            };
            score += coef * x;
        }

        for (column, effects) in &self.categorical {
            let level = match vector.get(column) {
                Some(FeatureValue::Category(level)) => level,
                Some(other) => {
                    return Err(self.fail(format!("column '{column}' must be categorical, got {other:?}")))
                }
                None => return Err(self.fail(format!("missing categorical column '{column}'"))),
            };
            score += effects.get(level).copied().unwrap_or(0.0);
        }

        Ok(score)
    }
}

impl Estimator for LinearEstimator {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, vector: &FeatureVector) -> AppraisalResult<Usd> {
        let score = self.score(vector)?;
        Ok(if self.log_target { score.exp() } else { score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LinearEstimator {
        LinearEstimator {
            name:        "test".into(),
            intercept:   50_000.0,
            log_target:  false,
            numeric:     HashMap::from([("GrLivArea".to_string(), 100.0)]),
            categorical: HashMap::from([(
                "Neighborhood".to_string(),
                HashMap::from([("NoRidge".to_string(), 40_000.0)]),
            )]),
        }
    }

    fn vector(area: FeatureValue, hood: &str) -> FeatureVector {
        vec![
            ("GrLivArea".to_string(), area),
            ("Neighborhood".to_string(), FeatureValue::category(hood)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn unknown_level_contributes_nothing() {
        let m = model();
        let known = m.predict(&vector(FeatureValue::Number(1000.0), "NoRidge")).unwrap();
        let unknown = m.predict(&vector(FeatureValue::Number(1000.0), "MarsBase")).unwrap();
        assert_eq!(known, 190_000.0);
        assert_eq!(unknown, 150_000.0);
    }

    #[test]
    fn wrong_column_type_is_an_estimator_error() {
        let err = model()
            .predict(&vector(FeatureValue::category("big"), "NAmes"))
            .unwrap_err();
        assert!(matches!(err, AppraisalError::Estimator { .. }));
    }

    #[test]
    fn non_finite_output_rejected() {
        let mut m = model();
        m.log_target = true;
        let err = checked_predict(&m, &vector(FeatureValue::Number(1000.0), "NAmes")).unwrap_err();
        assert!(matches!(err, AppraisalError::NonFiniteValuation { .. }));
    }
}
