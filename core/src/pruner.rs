//! Correlation pruning at inference time.
//!
//! The drop-list is a training artifact. It is applied as a static lookup
//! here and never recomputed per request.

use crate::{
    defaults::CorrelationPruneList,
    stage::{PipelineTrace, VectorStage},
    types::FeatureVector,
};

#[derive(Debug, Clone, Default)]
pub struct CorrelationPruner {
    drop_list: CorrelationPruneList,
}

impl CorrelationPruner {
    pub fn new(drop_list: CorrelationPruneList) -> Self {
        Self { drop_list }
    }
}

impl VectorStage for CorrelationPruner {
    fn name(&self) -> &'static str {
        "correlation_prune"
    }

    fn apply(&self, vector: &mut FeatureVector, trace: &mut PipelineTrace) {
        for column in self.drop_list.iter() {
            if vector.remove(column).is_some() {
                trace.pruned.push(column.to_string());
            }
        }
        if !trace.pruned.is_empty() {
            log::debug!("prune: dropped {:?}", trace.pruned);
        }
    }
}
