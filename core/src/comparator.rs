//! Valuation comparison: lift and ROI for one plan against one baseline.
//!
//! ROI is `(lift - cost) / cost × 100`. With zero cost it is `Undefined`,
//! never 0% and never infinity.

use crate::{
    error::AppraisalResult,
    estimator::{checked_predict, Estimator},
    pipeline::ValuationPipeline,
    types::{FeatureVector, FieldSource, Usd},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "percent", rename_all = "snake_case")]
pub enum Roi {
    Defined(f64),
    Undefined,
}

impl Roi {
    /// Net return on `cost`, in percent.
    pub fn from_net(net: Usd, cost: Usd) -> Self {
        if cost > 0.0 {
            Self::Defined(net / cost * 100.0)
        } else {
            Self::Undefined
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::Defined(p) => Some(*p),
            Self::Undefined => None,
        }
    }

    /// Presentation order: highest ROI first, undefined last.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Defined(a), Self::Defined(b)) => b.total_cmp(a),
            (Self::Defined(_), Self::Undefined) => Ordering::Less,
            (Self::Undefined, Self::Defined(_)) => Ordering::Greater,
            (Self::Undefined, Self::Undefined) => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub plan:            String,
    pub baseline_price:  Usd,
    pub renovated_price: Usd,
    pub cost:            Usd,
    pub lift:            Usd,
    pub roi:             Roi,
}

impl SimulationResult {
    pub fn new(plan: &str, baseline_price: Usd, renovated_price: Usd, cost: Usd) -> Self {
        let lift = renovated_price - baseline_price;
        Self {
            plan: plan.to_string(),
            baseline_price,
            renovated_price,
            cost,
            lift,
            roi: Roi::from_net(lift - cost, cost),
        }
    }

    /// Value created beyond the money spent.
    pub fn net_gain(&self) -> Usd {
        self.lift - self.cost
    }
}

/// Stable sort by descending ROI; ties keep their incoming order.
pub fn sort_by_roi(results: &mut [SimulationResult]) {
    results.sort_by(|a, b| a.roi.rank_cmp(&b.roi));
}

pub struct ValuationComparator<'a> {
    pipeline:  &'a ValuationPipeline,
    estimator: &'a dyn Estimator,
}

impl<'a> ValuationComparator<'a> {
    pub fn new(pipeline: &'a ValuationPipeline, estimator: &'a dyn Estimator) -> Self {
        Self { pipeline, estimator }
    }

    /// Full pipeline, then the estimator.
    pub fn value<S: FieldSource + ?Sized>(&self, source: &S) -> AppraisalResult<Usd> {
        let prepared = self.pipeline.prepare(source);
        checked_predict(self.estimator, &prepared.vector)
    }

    /// Value both vectors independently and difference them.
    pub fn compare(
        &self,
        plan: &str,
        baseline: &FeatureVector,
        renovated: &FeatureVector,
        cost: Usd,
    ) -> AppraisalResult<SimulationResult> {
        let baseline_price = self.value(baseline)?;
        self.compare_against(plan, baseline_price, renovated, cost)
    }

    /// As `compare`, reusing an already computed baseline price.
    pub fn compare_against(
        &self,
        plan: &str,
        baseline_price: Usd,
        renovated: &FeatureVector,
        cost: Usd,
    ) -> AppraisalResult<SimulationResult> {
        let renovated_price = self.value(renovated)?;
        let result = SimulationResult::new(plan, baseline_price, renovated_price, cost);
        log::info!(
            "simulate: {} lift=${:.0} cost=${:.0} roi={}",
            result.plan,
            result.lift,
            result.cost,
            match result.roi {
                Roi::Defined(p) => format!("{p:.1}%"),
                Roi::Undefined => "undefined".to_string(),
            }
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roi_formula() {
        let r = SimulationResult::new("Kitchen", 200_000.0, 230_000.0, 20_000.0);
        assert_eq!(r.lift, 30_000.0);
        assert_eq!(r.roi, Roi::Defined(50.0));
        assert_eq!(r.net_gain(), 10_000.0);
    }

    #[test]
    fn zero_cost_roi_is_undefined() {
        let r = SimulationResult::new("Free", 200_000.0, 201_000.0, 0.0);
        assert_eq!(r.roi, Roi::Undefined);
        assert_eq!(r.roi.percent(), None);
    }

    #[test]
    fn roi_json_shape() {
        let defined = serde_json::to_value(Roi::Defined(12.5)).unwrap();
        let undefined = serde_json::to_value(Roi::Undefined).unwrap();
        assert_eq!(defined, serde_json::json!({"status": "defined", "percent": 12.5}));
        assert_eq!(undefined, serde_json::json!({"status": "undefined"}));
    }
}
