//! Renovation plans and the digital-twin simulator.
//!
//! A plan is a list of field mutations plus a fixed cost. How each mutation
//! combines with the baseline is declared on the mutation itself:
//!
//!   overwrite    feature = value
//!   additive     feature = feature + value
//!   set_if_zero  feature = value when feature == 0, else unchanged
//!
//! `set_if_zero` exists for "total" companions of an additive "finished"
//! field. Finishing 500 sqft of basement adds to `BsmtFinSF1`; `TotalBsmtSF`
//! only moves when there was no basement to finish (0 → 500, digging new
//! space). An existing shell keeps its total.
//!
//! RULE: Plans are validated against the schema when the catalog loads. A
//! simulation never discovers a malformed plan.

use crate::{
    error::{AppraisalError, AppraisalResult},
    schema::{FeatureKind, Schema},
    transform::Coercion,
    types::{FeatureValue, FeatureVector, Usd},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    #[default]
    Overwrite,
    Additive,
    SetIfZero,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub feature: String,
    pub value:   FeatureValue,
    #[serde(default)]
    pub kind:    MutationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenovationPlan {
    pub name:      String,
    pub mutations: Vec<Mutation>,
    pub cost:      Usd,
}

impl RenovationPlan {
    pub fn new(name: &str, cost: Usd) -> Self {
        Self {
            name: name.to_string(),
            mutations: Vec::new(),
            cost,
        }
    }

    pub fn overwrite(self, feature: &str, value: impl Into<FeatureValue>) -> Self {
        self.with_mutation(feature, value.into(), MutationKind::Overwrite)
    }

    pub fn additive(self, feature: &str, amount: f64) -> Self {
        self.with_mutation(feature, FeatureValue::Number(amount), MutationKind::Additive)
    }

    pub fn set_if_zero(self, feature: &str, amount: f64) -> Self {
        self.with_mutation(feature, FeatureValue::Number(amount), MutationKind::SetIfZero)
    }

    fn with_mutation(mut self, feature: &str, value: FeatureValue, kind: MutationKind) -> Self {
        self.mutations.push(Mutation {
            feature: feature.to_string(),
            value,
            kind,
        });
        self
    }

    /// Several plans executed back to back, as one plan.
    ///
    /// Mutations keep their order, so a later overwrite wins and additive
    /// amounts accumulate. Costs add up.
    pub fn combine(plans: &[&RenovationPlan]) -> Self {
        Self {
            name: plans
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(" + "),
            mutations: plans.iter().flat_map(|p| p.mutations.iter().cloned()).collect(),
            cost: plans.iter().map(|p| p.cost).sum(),
        }
    }

    /// Check every mutation against the schema and normalize overwrite values
    /// to the feature's kind.
    pub fn validated(mut self, schema: &Schema, coercion: &Coercion) -> AppraisalResult<Self> {
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(self.invalid("cost", format!("must be a finite amount >= 0, got {}", self.cost)));
        }
        if self.name.trim().is_empty() {
            return Err(self.invalid("name", "must not be empty".to_string()));
        }

        let mut normalized = Vec::with_capacity(self.mutations.len());
        for m in &self.mutations {
            let Some(kind) = schema.kind(&m.feature) else {
                return Err(self.invalid(&m.feature, "is not in the schema".to_string()));
            };
            let value = match m.kind {
                MutationKind::Overwrite => coercion.coerce(kind, &m.value).ok_or_else(|| {
                    self.invalid(&m.feature, format!("cannot take {:?} as a {kind:?} value", m.value))
                })?,
                MutationKind::Additive | MutationKind::SetIfZero => {
                    if kind != FeatureKind::Numeric {
                        return Err(self.invalid(
                            &m.feature,
                            format!("is {kind:?}; {:?} needs a numeric feature", m.kind),
                        ));
                    }
                    match m.value {
                        FeatureValue::Number(x) if x.is_finite() => FeatureValue::Number(x),
                        _ => {
                            return Err(self.invalid(
                                &m.feature,
                                format!("{:?} amount must be a finite number, got {:?}", m.kind, m.value),
                            ))
                        }
                    }
                }
            };
            normalized.push(Mutation {
                feature: m.feature.clone(),
                value,
                kind: m.kind,
            });
        }
        self.mutations = normalized;
        Ok(self)
    }

    fn invalid(&self, feature: &str, reason: String) -> AppraisalError {
        AppraisalError::InvalidRenovationPlan {
            plan: self.name.clone(),
            feature: feature.to_string(),
            reason,
        }
    }
}

/// The configured renovation menu, in presentation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenovationCatalog {
    plans: Vec<RenovationPlan>,
}

impl RenovationCatalog {
    /// Validate every plan; any failure rejects the whole catalog.
    pub fn validated(
        plans: Vec<RenovationPlan>,
        schema: &Schema,
        coercion: &Coercion,
    ) -> AppraisalResult<Self> {
        let mut seen = HashSet::new();
        let mut checked = Vec::with_capacity(plans.len());
        for plan in plans {
            if !seen.insert(plan.name.clone()) {
                return Err(plan.invalid("name", "is used by more than one plan".to_string()));
            }
            checked.push(plan.validated(schema, coercion)?);
        }
        Ok(Self { plans: checked })
    }

    pub fn get(&self, name: &str) -> AppraisalResult<&RenovationPlan> {
        self.plans
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| AppraisalError::UnknownPlan { name: name.to_string() })
    }

    pub fn plans(&self) -> &[RenovationPlan] {
        &self.plans
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plans.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

pub struct RenovationSimulator;

impl RenovationSimulator {
    /// Build the digital twin. The baseline is never modified.
    pub fn apply(baseline: &FeatureVector, plan: &RenovationPlan) -> FeatureVector {
        let mut twin = baseline.clone();
        for m in &plan.mutations {
            match m.kind {
                MutationKind::Overwrite => twin.set(&m.feature, m.value.clone()),
                MutationKind::Additive => {
                    let current = twin.number(&m.feature).unwrap_or(0.0);
                    let amount = m.value.as_number().unwrap_or(0.0);
                    twin.set(&m.feature, current + amount);
                }
                MutationKind::SetIfZero => {
                    let current = twin.number(&m.feature).unwrap_or(0.0);
                    if current == 0.0 {
                        twin.set(&m.feature, m.value.clone());
                    }
                }
            }
        }
        twin
    }
}
