//! Post-imputation stage trait.
//!
//! RULE: Every stage after imputation implements VectorStage.
//! The pipeline calls apply() on each registered stage in registration
//! order. Order is fixed and documented in pipeline.rs.
//!
//! Stages are total: there is no error path. A stage that has nothing to
//! do for a given vector leaves it unchanged.

use crate::types::FeatureVector;
use serde::{Deserialize, Serialize};

/// A single guardrail intervention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClampEvent {
    pub feature: String,
    pub raw:     f64,
    pub clamped: f64,
}

/// What the pipeline did to a record on its way to the estimator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineTrace {
    pub imputed: Vec<String>,
    pub clamped: Vec<ClampEvent>,
    pub derived: Vec<String>,
    pub pruned:  Vec<String>,
}

/// The contract every post-imputation stage must fulfill.
pub trait VectorStage: Send + Sync {
    /// Unique stable name for this stage.
    fn name(&self) -> &'static str;

    /// Transform the request-owned vector in place, recording interventions.
    fn apply(&self, vector: &mut FeatureVector, trace: &mut PipelineTrace);
}
