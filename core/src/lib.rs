//! Property valuation and renovation economics.
//!
//! A sparse property record is aligned to the trained schema, gap-filled,
//! clamped, engineered and pruned before an opaque estimator prices it.
//! Renovation plans mutate a copy of the baseline (the "digital twin") and
//! the two valuations are differenced into lift and ROI.
//!
//! Start at [`engine::AppraisalEngine`].

pub mod aligner;
pub mod artifacts;
pub mod columns;
pub mod comparator;
pub mod config;
pub mod deal;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod feature_engineer;
pub mod guardrail;
pub mod imputer;
pub mod pipeline;
pub mod pruner;
pub mod renovation;
pub mod schema;
pub mod stage;
pub mod transform;
pub mod types;
