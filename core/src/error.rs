use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppraisalError {
    #[error("Estimator '{estimator}' failed: {message}")]
    Estimator { estimator: String, message: String },

    #[error("Estimator '{estimator}' returned a non-finite valuation: {value}")]
    NonFiniteValuation { estimator: String, value: f64 },

    #[error("Invalid renovation plan '{plan}': feature '{feature}' {reason}")]
    InvalidRenovationPlan {
        plan: String,
        feature: String,
        reason: String,
    },

    #[error("Renovation plan '{name}' not found in catalog")]
    UnknownPlan { name: String },

    #[error("Invalid schema: {reason}")]
    InvalidSchema { reason: String },

    #[error("Transform '{name}' is not registered")]
    UnknownTransform { name: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AppraisalResult<T> = Result<T, AppraisalError>;
