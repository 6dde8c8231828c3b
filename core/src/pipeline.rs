//! The valuation pipeline: record in, estimator-ready vector out.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Schema alignment        (always)
//!   2. Imputation              (always)
//!   3. Guardrail               (config: guardrails)
//!   4. Feature engineering     (config: feature_engineering)
//!   5. Correlation prune       (config: correlation_prune)
//!
//! RULES:
//!   - Defaults are filled before guardrails run.
//!   - Engineering runs after imputation, so its operands are present.
//!   - No stage has a failure path. Only the estimator call can fail.
//!   - The pipeline reads shared artifacts and never writes to them.

use crate::{
    aligner::{AlignedRecord, SchemaAligner},
    artifacts::ArtifactBundle,
    config::PipelineConfig,
    feature_engineer::FeatureEngineer,
    guardrail::Guardrail,
    imputer::Imputer,
    pruner::CorrelationPruner,
    stage::{PipelineTrace, VectorStage},
    types::{FeatureVector, FieldSource},
};
use std::sync::Arc;

/// A vector ready for the estimator, plus what was done to produce it.
#[derive(Debug, Clone)]
pub struct PreparedVector {
    pub vector: FeatureVector,
    pub trace:  PipelineTrace,
}

pub struct ValuationPipeline {
    bundle:  Arc<ArtifactBundle>,
    config:  PipelineConfig,
    stages:  Vec<Box<dyn VectorStage>>,
}

impl ValuationPipeline {
    /// Build the pipeline with stages registered in the documented order.
    pub fn build(bundle: Arc<ArtifactBundle>, config: PipelineConfig) -> Self {
        let mut pipeline = Self {
            bundle,
            config,
            stages: Vec::new(),
        };

        if pipeline.config.guardrails {
            let rules = pipeline.bundle.guardrails.clone();
            pipeline.register(Box::new(Guardrail::new(rules)));
        }
        if pipeline.config.feature_engineering {
            let coords = pipeline.bundle.coordinates.clone();
            pipeline.register(Box::new(FeatureEngineer::new(coords)));
        }
        if pipeline.config.correlation_prune {
            let drop_list = pipeline.bundle.prune_list.clone();
            pipeline.register(Box::new(CorrelationPruner::new(drop_list)));
        }
        pipeline
    }

    fn register(&mut self, stage: Box<dyn VectorStage>) {
        self.stages.push(stage);
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    /// Names of the registered post-imputation stages, in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Step 1 only.
    pub fn align<S: FieldSource + ?Sized>(&self, source: &S) -> AlignedRecord {
        SchemaAligner::new(&self.bundle.schema, &self.bundle.coercion).align(source)
    }

    /// Steps 1–2: the raw, fully populated schema vector.
    ///
    /// This is the baseline a renovation plan mutates. Its columns are the
    /// schema's columns, unclamped and unengineered.
    pub fn complete<S: FieldSource + ?Sized>(&self, source: &S) -> (FeatureVector, Vec<String>) {
        let aligned = self.align(source);
        Imputer::new(&self.bundle.defaults).impute(aligned)
    }

    /// Steps 1–5.
    pub fn prepare<S: FieldSource + ?Sized>(&self, source: &S) -> PreparedVector {
        let (mut vector, imputed) = self.complete(source);
        let mut trace = PipelineTrace {
            imputed,
            ..PipelineTrace::default()
        };
        for stage in &self.stages {
            stage.apply(&mut vector, &mut trace);
        }
        PreparedVector { vector, trace }
    }
}
