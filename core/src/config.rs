use serde::{Deserialize, Serialize};

/// Which post-imputation stages a deployment runs.
///
/// Imputation is not switchable: every vector reaching the estimator must be
/// fully populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Free-form label reported alongside valuations.
    pub version: String,
    #[serde(default = "enabled")]
    pub guardrails: bool,
    #[serde(default = "enabled")]
    pub feature_engineering: bool,
    #[serde(default = "enabled")]
    pub correlation_prune: bool,
}

fn enabled() -> bool {
    true
}

impl PipelineConfig {
    /// Guardrails only; for estimators that do their own engineering.
    pub fn guardrails_only(version: &str) -> Self {
        Self {
            version: version.to_string(),
            guardrails: true,
            feature_engineering: false,
            correlation_prune: false,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: "production".to_string(),
            guardrails: true,
            feature_engineering: true,
            correlation_prune: true,
        }
    }
}
