//! The appraisal engine: the surface the transport layer talks to.
//!
//! RULES:
//!   - The engine holds only read-only state. Every call works on its own
//!     copies, so one engine can serve any number of threads.
//!   - A simulation values baseline and twin through the same pipeline.
//!   - Per-plan simulations are independent; catalog runs fan out on rayon.

use crate::{
    artifacts::ArtifactBundle,
    comparator::{sort_by_roi, SimulationResult, ValuationComparator},
    config::PipelineConfig,
    deal::DealAnalysis,
    error::AppraisalResult,
    estimator::{checked_predict, Estimator, LinearEstimator},
    pipeline::{PreparedVector, ValuationPipeline},
    renovation::{RenovationPlan, RenovationSimulator},
    types::{FeatureVector, PropertyRecord, Usd},
};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

/// A single valuation with its audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct Valuation {
    pub price:            Usd,
    pub estimator:        String,
    pub pipeline_version: String,
    pub vector:           FeatureVector,
    pub trace:            crate::stage::PipelineTrace,
}

pub struct AppraisalEngine {
    bundle:    Arc<ArtifactBundle>,
    pipeline:  ValuationPipeline,
    estimator: Box<dyn Estimator>,
}

impl AppraisalEngine {
    /// Wire an engine using the bundle's own pipeline profile.
    pub fn new(bundle: ArtifactBundle, estimator: Box<dyn Estimator>) -> Self {
        let config = bundle.pipeline.clone();
        Self::with_config(bundle, config, estimator)
    }

    /// Wire an engine with an explicit pipeline profile.
    pub fn with_config(
        bundle: ArtifactBundle,
        config: PipelineConfig,
        estimator: Box<dyn Estimator>,
    ) -> Self {
        let bundle = Arc::new(bundle);
        let pipeline = ValuationPipeline::build(Arc::clone(&bundle), config);
        log::info!(
            "engine: pipeline '{}' stages {:?}, estimator '{}'",
            pipeline.config().version,
            pipeline.stage_names(),
            estimator.name()
        );
        Self {
            bundle,
            pipeline,
            estimator,
        }
    }

    /// Load artifacts and the reference estimator from the data/ directory.
    pub fn build(data_dir: &str) -> anyhow::Result<Self> {
        let bundle = ArtifactBundle::load(data_dir)?;
        let estimator = LinearEstimator::load(&format!("{data_dir}/model/linear_estimator.json"))?;
        Ok(Self::new(bundle, Box::new(estimator)))
    }

    /// Engine over `ArtifactBundle::default_test()` and a small linear model.
    pub fn build_test() -> Self {
        Self::new(ArtifactBundle::default_test(), Box::new(test_estimator()))
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn pipeline(&self) -> &ValuationPipeline {
        &self.pipeline
    }

    fn comparator(&self) -> ValuationComparator<'_> {
        ValuationComparator::new(&self.pipeline, self.estimator.as_ref())
    }

    /// Full pipeline, single price.
    pub fn align_and_value(&self, record: &PropertyRecord) -> AppraisalResult<Usd> {
        self.comparator().value(record)
    }

    /// As `align_and_value`, keeping the final vector and what was done to it.
    pub fn value_detailed(&self, record: &PropertyRecord) -> AppraisalResult<Valuation> {
        let PreparedVector { vector, trace } = self.pipeline.prepare(record);
        let price = checked_predict(self.estimator.as_ref(), &vector)?;
        Ok(Valuation {
            price,
            estimator: self.estimator.name().to_string(),
            pipeline_version: self.pipeline.config().version.clone(),
            vector,
            trace,
        })
    }

    /// Simulate one plan. Ad-hoc plans get the same validation as catalog plans.
    pub fn simulate(
        &self,
        baseline: &PropertyRecord,
        plan: &RenovationPlan,
    ) -> AppraisalResult<SimulationResult> {
        let plan = plan
            .clone()
            .validated(&self.bundle.schema, &self.bundle.coercion)?;
        let (base, _) = self.pipeline.complete(baseline);
        let twin = RenovationSimulator::apply(&base, &plan);
        self.comparator().compare(&plan.name, &base, &twin, plan.cost)
    }

    /// Simulate a catalog plan by name.
    pub fn simulate_named(
        &self,
        baseline: &PropertyRecord,
        name: &str,
    ) -> AppraisalResult<SimulationResult> {
        let plan = self.bundle.catalog.get(name)?;
        self.simulate(baseline, plan)
    }

    /// Simulate every plan independently; results sorted by descending ROI.
    ///
    /// The first failing plan's error is returned.
    pub fn simulate_catalog(
        &self,
        baseline: &PropertyRecord,
        plans: &[RenovationPlan],
    ) -> AppraisalResult<Vec<SimulationResult>> {
        let plans = plans
            .iter()
            .map(|p| p.clone().validated(&self.bundle.schema, &self.bundle.coercion))
            .collect::<AppraisalResult<Vec<_>>>()?;

        let (base, _) = self.pipeline.complete(baseline);
        let comparator = self.comparator();
        let baseline_price = comparator.value(&base)?;

        let mut results = plans
            .par_iter()
            .map(|plan| {
                let twin = RenovationSimulator::apply(&base, plan);
                comparator.compare_against(&plan.name, baseline_price, &twin, plan.cost)
            })
            .collect::<AppraisalResult<Vec<_>>>()?;

        sort_by_roi(&mut results);
        Ok(results)
    }

    /// `simulate_catalog` over the configured renovation catalog.
    pub fn simulate_configured_catalog(
        &self,
        baseline: &PropertyRecord,
    ) -> AppraisalResult<Vec<SimulationResult>> {
        self.simulate_catalog(baseline, self.bundle.catalog.plans())
    }

    /// Apply several catalog plans cumulatively, in the given order, as one.
    pub fn simulate_combined(
        &self,
        baseline: &PropertyRecord,
        names: &[&str],
    ) -> AppraisalResult<SimulationResult> {
        let combined = self.combine(names)?;
        self.simulate(baseline, &combined)
    }

    /// Buy at a discount, renovate with the named plans, sell.
    pub fn analyze_deal(
        &self,
        baseline: &PropertyRecord,
        names: &[&str],
        purchase_discount_pct: f64,
    ) -> AppraisalResult<DealAnalysis> {
        let combined = self.combine(names)?;
        let sim = self.simulate(baseline, &combined)?;
        Ok(DealAnalysis::new(
            names.iter().map(|n| n.to_string()).collect(),
            sim.baseline_price,
            purchase_discount_pct,
            sim.cost,
            sim.renovated_price,
        ))
    }

    fn combine(&self, names: &[&str]) -> AppraisalResult<RenovationPlan> {
        let plans = names
            .iter()
            .map(|n| self.bundle.catalog.get(n))
            .collect::<AppraisalResult<Vec<_>>>()?;
        let mut combined = RenovationPlan::combine(&plans);
        if combined.name.is_empty() {
            combined.name = "No Renovation".to_string();
        }
        Ok(combined)
    }
}

/// Log-linear model over the `default_test()` schema. Produces Ames-scale
/// prices (roughly $100k–$500k) for ordinary inputs.
pub fn test_estimator() -> LinearEstimator {
    let numeric = [
        ("GrLivArea", 0.000_25),
        ("OverallQual", 0.085),
        ("OverallCond", 0.03),
        ("TotalHouseSqFt", 0.000_12),
        ("HouseAge", -0.002_5),
        ("TotalBath", 0.035),
        ("BsmtFinSF1", 0.000_06),
        ("GarageCars", 0.045),
        ("GarageArea", 0.000_1),
        ("Fireplaces", 0.03),
        ("LotArea", 0.000_002),
        ("WoodDeckSF", 0.000_08),
        ("OpenPorchSF", 0.000_05),
    ];
    let categorical = [
        ("KitchenQual", vec![("Ex", 0.09), ("Gd", 0.04), ("Fa", -0.06)]),
        ("CentralAir", vec![("Y", 0.08)]),
        ("GarageType", vec![("Attchd", 0.03), ("BuiltIn", 0.04), ("None", -0.06)]),
        ("FireplaceQu", vec![("Ex", 0.03), ("Gd", 0.02)]),
        (
            "Neighborhood",
            vec![("NoRidge", 0.18), ("NridgHt", 0.2), ("Somerst", 0.08), ("CollgCr", 0.05), ("OldTown", -0.1), ("Edwards", -0.08)],
        ),
    ];

    LinearEstimator {
        name: "ames-loglinear-test".to_string(),
        intercept: 10.35,
        log_target: true,
        numeric: numeric
            .into_iter()
            .map(|(k, c)| (k.to_string(), c))
            .collect(),
        categorical: categorical
            .into_iter()
            .map(|(k, levels)| {
                (
                    k.to_string(),
                    levels.into_iter().map(|(l, e)| (l.to_string(), e)).collect(),
                )
            })
            .collect(),
    }
}
