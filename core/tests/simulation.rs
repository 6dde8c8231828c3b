//! Simulation tests: lift, ROI, batch ordering and failure propagation.

use appraisal_core::{
    artifacts::ArtifactBundle,
    comparator::Roi,
    engine::AppraisalEngine,
    error::{AppraisalError, AppraisalResult},
    estimator::Estimator,
    renovation::{RenovationCatalog, RenovationPlan},
    types::{FeatureVector, PropertyRecord, Usd},
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Prices a house at a base amount plus whatever is in `WoodDeckSF`, so a
/// plan's lift is exactly the deck value it writes.
struct DeckPricer {
    base: Usd,
}

impl Estimator for DeckPricer {
    fn name(&self) -> &str {
        "deck-pricer"
    }

    fn predict(&self, vector: &FeatureVector) -> AppraisalResult<Usd> {
        Ok(self.base + vector.number("WoodDeckSF").unwrap_or(0.0))
    }
}

/// Fails whenever a central air unit is present.
struct Refuses;

impl Estimator for Refuses {
    fn name(&self) -> &str {
        "refuses"
    }

    fn predict(&self, vector: &FeatureVector) -> AppraisalResult<Usd> {
        match vector.get("CentralAir").and_then(|v| v.as_category()) {
            Some("Y") => Err(AppraisalError::Estimator {
                estimator: "refuses".into(),
                message: "model artifact unavailable".into(),
            }),
            _ => Ok(150_000.0),
        }
    }
}

struct Diverges;

impl Estimator for Diverges {
    fn name(&self) -> &str {
        "diverges"
    }

    fn predict(&self, _vector: &FeatureVector) -> AppraisalResult<Usd> {
        Ok(f64::INFINITY)
    }
}

fn engine_with(estimator: impl Estimator + 'static) -> AppraisalEngine {
    AppraisalEngine::new(ArtifactBundle::default_test(), Box::new(estimator))
}

fn deck(name: &str, cost: Usd, deck_value: f64) -> RenovationPlan {
    RenovationPlan::new(name, cost).overwrite("WoodDeckSF", deck_value)
}

fn ranch() -> PropertyRecord {
    PropertyRecord::new()
        .with("Neighborhood", "NAmes")
        .with("GrLivArea", 1100)
        .with("CentralAir", "N")
        .with("WoodDeckSF", 0)
}

// ── ROI ───────────────────────────────────────────────────────────────────────

/// baseline 200k, renovated 230k, cost 20k: lift 30k, ROI 50%.
#[test]
fn lift_and_roi_follow_the_formula() {
    let engine = engine_with(DeckPricer { base: 200_000.0 });

    let result = engine
        .simulate(&ranch(), &deck("Deck", 20_000.0, 30_000.0))
        .unwrap();

    assert_eq!(result.baseline_price, 200_000.0);
    assert_eq!(result.renovated_price, 230_000.0);
    assert_eq!(result.lift, 30_000.0);
    assert_eq!(result.roi, Roi::Defined(50.0));
}

#[test]
fn zero_cost_plan_has_undefined_roi() {
    let engine = engine_with(DeckPricer { base: 200_000.0 });

    let result = engine
        .simulate(&ranch(), &deck("Gifted Deck", 0.0, 5_000.0))
        .unwrap();

    assert_eq!(result.lift, 5_000.0);
    assert_eq!(result.roi, Roi::Undefined);
}

/// A plan that lowers value reports a negative lift, not an error.
#[test]
fn value_destroying_plan_reports_negative_roi() {
    let engine = engine_with(DeckPricer { base: 200_000.0 });
    let record = ranch().with("WoodDeckSF", 4_000);

    let result = engine
        .simulate(&record, &deck("Tear Out Deck", 2_000.0, 0.0))
        .unwrap();

    assert_eq!(result.lift, -4_000.0);
    assert_eq!(result.roi, Roi::Defined(-300.0));
}

// ── Batch ─────────────────────────────────────────────────────────────────────

#[test]
fn batch_is_sorted_by_descending_roi() {
    let engine = engine_with(DeckPricer { base: 180_000.0 });
    let plans = vec![
        deck("Twelve", 10_000.0, 11_200.0),
        deck("FortyFive", 10_000.0, 14_500.0),
        deck("MinusFive", 10_000.0, 9_500.0),
    ];

    let results = engine.simulate_catalog(&ranch(), &plans).unwrap();

    let names: Vec<&str> = results.iter().map(|r| r.plan.as_str()).collect();
    assert_eq!(names, vec!["FortyFive", "Twelve", "MinusFive"]);
    let rois: Vec<f64> = results.iter().map(|r| r.roi.percent().unwrap()).collect();
    assert!((rois[0] - 45.0).abs() < 1e-9);
    assert!((rois[1] - 12.0).abs() < 1e-9);
    assert!((rois[2] + 5.0).abs() < 1e-9);
}

#[test]
fn batch_puts_undefined_roi_last_and_keeps_tie_order() {
    let engine = engine_with(DeckPricer { base: 180_000.0 });
    let plans = vec![
        deck("Free", 0.0, 1_000.0),
        deck("TieA", 1_000.0, 2_000.0),
        deck("TieB", 1_000.0, 2_000.0),
    ];

    let results = engine.simulate_catalog(&ranch(), &plans).unwrap();

    let names: Vec<&str> = results.iter().map(|r| r.plan.as_str()).collect();
    assert_eq!(names, vec!["TieA", "TieB", "Free"]);
}

/// Each plan is measured against the same baseline, never a neighbour's twin.
#[test]
fn batch_plans_are_independent() {
    let engine = engine_with(DeckPricer { base: 100_000.0 });
    let plans = vec![deck("Small", 1_000.0, 1_000.0), deck("Large", 1_000.0, 9_000.0)];

    let results = engine.simulate_catalog(&ranch(), &plans).unwrap();

    assert!(results.iter().all(|r| r.baseline_price == 100_000.0));
    let small = results.iter().find(|r| r.plan == "Small").unwrap();
    assert_eq!(small.lift, 1_000.0);
}

#[test]
fn empty_batch_is_empty() {
    let engine = AppraisalEngine::build_test();
    assert!(engine.simulate_catalog(&ranch(), &[]).unwrap().is_empty());
}

#[test]
fn configured_catalog_covers_every_plan() {
    let engine = AppraisalEngine::build_test();

    let results = engine.simulate_configured_catalog(&ranch()).unwrap();

    assert_eq!(results.len(), engine.bundle().catalog.len());
    assert!(results.iter().all(|r| r.lift.is_finite() && r.roi.percent().is_some()));
    for pair in results.windows(2) {
        assert!(pair[0].roi.percent() >= pair[1].roi.percent());
    }
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[test]
fn estimator_failure_propagates() {
    let engine = engine_with(Refuses);

    let err = engine
        .simulate_named(&ranch(), "Install Central Air")
        .unwrap_err();

    assert!(matches!(err, AppraisalError::Estimator { .. }));
}

#[test]
fn estimator_failure_fails_the_batch() {
    let engine = engine_with(Refuses);
    assert!(engine.simulate_configured_catalog(&ranch()).is_err());
}

#[test]
fn non_finite_valuation_is_rejected() {
    let engine = engine_with(Diverges);

    let err = engine.align_and_value(&ranch()).unwrap_err();

    assert!(matches!(err, AppraisalError::NonFiniteValuation { ref estimator, .. } if estimator == "diverges"));
}

#[test]
fn unknown_plan_name() {
    let engine = AppraisalEngine::build_test();
    let err = engine.simulate_named(&ranch(), "Add Moat").unwrap_err();
    assert!(matches!(err, AppraisalError::UnknownPlan { ref name } if name == "Add Moat"));
}

// ── Combined plans and deals ──────────────────────────────────────────────────

#[test]
fn combined_plans_add_cost_and_lift() {
    let engine = AppraisalEngine::build_test();
    let record = ranch();

    let air = engine.simulate_named(&record, "Install Central Air").unwrap();
    let both = engine
        .simulate_combined(&record, &["Install Central Air", "Add Fireplace"])
        .unwrap();

    assert_eq!(both.plan, "Install Central Air + Add Fireplace");
    assert_eq!(both.cost, 17_000.0);
    assert_eq!(both.baseline_price, air.baseline_price);
    assert!(both.lift > air.lift);
}

#[test]
fn deal_analysis_uses_discounted_purchase() {
    let mut bundle = ArtifactBundle::default_test();
    bundle.catalog = RenovationCatalog::validated(
        vec![deck("Build Deck", 10_000.0, 30_000.0)],
        &bundle.schema,
        &bundle.coercion,
    )
    .unwrap();
    let engine = AppraisalEngine::new(bundle, Box::new(DeckPricer { base: 200_000.0 }));

    let deal = engine
        .analyze_deal(&ranch(), &["Build Deck"], 10.0)
        .unwrap();

    assert_eq!(deal.fair_market_value, 200_000.0);
    assert_eq!(deal.purchase_price, 180_000.0);
    assert_eq!(deal.sale_price, 230_000.0);
    assert_eq!(deal.total_investment, 190_000.0);
    assert_eq!(deal.net_profit, 40_000.0);
    assert!(deal.is_profitable());
}

#[test]
fn deal_without_plans_is_buy_and_resell() {
    let engine = AppraisalEngine::build_test();

    let deal = engine.analyze_deal(&ranch(), &[], 20.0).unwrap();

    assert_eq!(deal.renovation_cost, 0.0);
    assert_eq!(deal.sale_price, deal.fair_market_value);
    assert!(deal.net_profit > 0.0);
}
