//! The immutable artifact bundle: everything training produced, plus the
//! configured renovation menu.
//!
//! Built once at startup, then shared read-only (behind an `Arc`) by every
//! request. A bundle that fails to build is a fatal startup condition, not
//! a request error.

use crate::{
    config::PipelineConfig,
    defaults::{CorrelationPruneList, DefaultsTable},
    error::{AppraisalError, AppraisalResult},
    feature_engineer::{CoordinateTable, LatLon},
    guardrail::{default_rules, GuardrailRule},
    renovation::{RenovationCatalog, RenovationPlan},
    schema::{FeatureSpec, Schema},
    transform::{Coercion, TransformNames, TransformRegistry},
    types::FeatureValue,
};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub schema:      Schema,
    pub coercion:    Coercion,
    pub defaults:    DefaultsTable,
    pub prune_list:  CorrelationPruneList,
    pub guardrails:  Vec<GuardrailRule>,
    pub coordinates: CoordinateTable,
    pub catalog:     RenovationCatalog,
    pub pipeline:    PipelineConfig,
}

/// Raw, unvalidated bundle contents.
#[derive(Debug, Clone)]
pub struct BundleParts {
    pub features:    Vec<FeatureSpec>,
    pub transforms:  TransformNames,
    pub defaults:    DefaultsTable,
    pub prune_list:  CorrelationPruneList,
    pub guardrails:  Vec<GuardrailRule>,
    pub coordinates: CoordinateTable,
    pub plans:       Vec<RenovationPlan>,
    pub pipeline:    PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    transforms: TransformNames,
    features:   Vec<FeatureSpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct GuardrailsFile {
    rules: Vec<GuardrailRule>,
}

#[derive(Debug, Clone, Deserialize)]
struct RenovationCatalogFile {
    plans: Vec<RenovationPlan>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("Invalid JSON in {path}: {e}"))
}

impl ArtifactBundle {
    /// Load from the data/ directory.
    /// In tests, use ArtifactBundle::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let schema_file: SchemaFile = read_json(&format!("{data_dir}/schema/schema.json"))?;
        let defaults: DefaultsTable = read_json(&format!("{data_dir}/schema/defaults.json"))?;
        let prune_list: CorrelationPruneList =
            read_json(&format!("{data_dir}/schema/prune_list.json"))?;
        let guardrails: GuardrailsFile =
            read_json(&format!("{data_dir}/guardrails/guardrails.json"))?;
        let catalog: RenovationCatalogFile =
            read_json(&format!("{data_dir}/renovations/renovation_catalog.json"))?;
        let coordinates: CoordinateTable =
            read_json(&format!("{data_dir}/geo/neighborhood_coords.json"))?;
        let pipeline: PipelineConfig = read_json(&format!("{data_dir}/pipeline/pipeline.json"))?;

        let bundle = Self::from_parts(
            BundleParts {
                features: schema_file.features,
                transforms: schema_file.transforms,
                defaults,
                prune_list,
                guardrails: guardrails.rules,
                coordinates,
                plans: catalog.plans,
                pipeline,
            },
            &TransformRegistry::builtin(),
        )?;

        log::info!(
            "artifacts: loaded {} features, {} defaults, {} pruned columns, {} guardrails, {} plans, {} neighborhoods (pipeline '{}')",
            bundle.schema.len(),
            bundle.defaults.len(),
            bundle.prune_list.len(),
            bundle.guardrails.len(),
            bundle.catalog.len(),
            bundle.coordinates.len(),
            bundle.pipeline.version
        );
        Ok(bundle)
    }

    /// Validate and assemble. Every check that could otherwise fail a request
    /// happens here instead.
    pub fn from_parts(parts: BundleParts, registry: &TransformRegistry) -> AppraisalResult<Self> {
        let schema = Schema::new(parts.features)?;
        let coercion = Coercion::resolve(&parts.transforms, registry)?;

        if let Some(rule) = parts.guardrails.iter().find(|r| !r.clamp.is_well_formed()) {
            return Err(AppraisalError::InvalidSchema {
                reason: format!("guardrail on '{}' has malformed bounds {:?}", rule.feature, rule.clamp),
            });
        }
        for rule in &parts.guardrails {
            if !schema.contains(&rule.feature) {
                log::warn!("artifacts: guardrail on '{}' targets a feature outside the schema", rule.feature);
            }
        }

        let defaults = parts.defaults.normalized(&schema, &coercion);
        let catalog = RenovationCatalog::validated(parts.plans, &schema, &coercion)?;

        Ok(Self {
            schema,
            coercion,
            defaults,
            prune_list: parts.prune_list,
            guardrails: parts.guardrails,
            coordinates: parts.coordinates,
            catalog,
            pipeline: parts.pipeline,
        })
    }

    /// Bundle with hardcoded artifacts for use in unit tests.
    pub fn default_test() -> Self {
        Self::from_parts(test_parts(), &TransformRegistry::builtin())
            .unwrap_or_else(|e| panic!("default_test bundle must be valid: {e}"))
    }
}

/// The parts behind `default_test()`, exposed so tests can tweak one piece.
pub fn test_parts() -> BundleParts {
    let numeric = [
        "LotArea", "OverallQual", "OverallCond", "YearBuilt", "YearRemodAdd",
        "BsmtFinSF1", "TotalBsmtSF", "1stFlrSF", "2ndFlrSF", "GrLivArea",
        "BsmtFullBath", "BsmtHalfBath", "FullBath", "HalfBath", "TotRmsAbvGrd",
        "Fireplaces", "GarageYrBlt", "GarageCars", "GarageArea", "WoodDeckSF",
        "OpenPorchSF", "PoolArea", "YrSold",
    ];
    let categorical = [
        "MSSubClass", "Neighborhood", "BldgType", "HouseStyle", "BsmtQual",
        "CentralAir", "KitchenQual", "FireplaceQu", "GarageType", "GarageFinish",
    ];
    let features = numeric
        .iter()
        .map(|n| FeatureSpec::numeric(n))
        .chain(categorical.iter().map(|n| FeatureSpec::categorical(n)))
        .collect();

    let defaults = [
        ("LotArea", FeatureValue::Number(9478.5)),
        ("OverallQual", FeatureValue::Number(6.0)),
        ("OverallCond", FeatureValue::Number(5.0)),
        ("YearBuilt", FeatureValue::Number(1973.0)),
        ("YearRemodAdd", FeatureValue::Number(1994.0)),
        ("BsmtFinSF1", FeatureValue::Number(383.5)),
        ("TotalBsmtSF", FeatureValue::Number(991.5)),
        ("1stFlrSF", FeatureValue::Number(1087.0)),
        ("2ndFlrSF", FeatureValue::Number(0.0)),
        ("GrLivArea", FeatureValue::Number(1464.0)),
        ("BsmtFullBath", FeatureValue::Number(0.0)),
        ("BsmtHalfBath", FeatureValue::Number(0.0)),
        ("FullBath", FeatureValue::Number(2.0)),
        ("HalfBath", FeatureValue::Number(0.0)),
        ("TotRmsAbvGrd", FeatureValue::Number(6.0)),
        ("Fireplaces", FeatureValue::Number(1.0)),
        ("GarageYrBlt", FeatureValue::Number(1980.0)),
        ("GarageCars", FeatureValue::Number(2.0)),
        ("GarageArea", FeatureValue::Number(480.0)),
        ("WoodDeckSF", FeatureValue::Number(0.0)),
        ("OpenPorchSF", FeatureValue::Number(25.0)),
        ("PoolArea", FeatureValue::Number(0.0)),
        ("YrSold", FeatureValue::Number(2008.0)),
        ("MSSubClass", FeatureValue::Number(20.0)),
        ("Neighborhood", FeatureValue::category("NAmes")),
        ("BldgType", FeatureValue::category("1Fam")),
        ("HouseStyle", FeatureValue::category("1Story")),
        ("BsmtQual", FeatureValue::category("TA")),
        ("CentralAir", FeatureValue::category("Y")),
        ("KitchenQual", FeatureValue::category("TA")),
        ("GarageType", FeatureValue::category("Attchd")),
        ("GarageFinish", FeatureValue::category("Unf")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let plans = vec![
        RenovationPlan::new("Luxury Kitchen Upgrade", 45_000.0).overwrite("KitchenQual", "Ex"),
        RenovationPlan::new("Add Garage (2-Car)", 45_000.0)
            .overwrite("GarageCars", 2)
            .overwrite("GarageArea", 576)
            .overwrite("GarageType", "Attchd")
            .overwrite("GarageFinish", "Unf")
            .overwrite("GarageYrBlt", 2005),
        RenovationPlan::new("Finish Basement (500 sqft)", 30_000.0)
            .additive("BsmtFinSF1", 500.0)
            .set_if_zero("TotalBsmtSF", 500.0),
        RenovationPlan::new("Install Central Air", 12_000.0).overwrite("CentralAir", "Y"),
        RenovationPlan::new("Add Fireplace", 5_000.0)
            .overwrite("Fireplaces", 1)
            .overwrite("FireplaceQu", "Gd"),
    ];

    let coords: HashMap<String, LatLon> = [
        ("NAmes", 42.0463, -93.6223),
        ("CollgCr", 42.0219, -93.6853),
        ("OldTown", 42.0298, -93.6145),
        ("NoRidge", 42.0479, -93.6548),
        ("NridgHt", 42.0597, -93.6499),
        ("Edwards", 42.0158, -93.6853),
        ("Somerst", 42.0522, -93.6445),
    ]
    .into_iter()
    .map(|(code, lat, lon)| (code.to_string(), LatLon { lat, lon }))
    .collect();

    BundleParts {
        features,
        transforms: TransformNames::default(),
        defaults,
        prune_list: ["GarageYrBlt", "TotRmsAbvGrd"].into_iter().collect(),
        guardrails: default_rules(),
        coordinates: CoordinateTable::new(coords),
        plans,
        pipeline: PipelineConfig::default(),
    }
}
