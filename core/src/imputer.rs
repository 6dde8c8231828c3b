//! Gap filling. Runs right after alignment and before any guardrail.
//!
//! Fill order per absent slot:
//!   1. the defaults table entry for that feature
//!   2. the feature kind's neutral value (0.0 or "None")
//!
//! Present slots are never touched.

use crate::{
    aligner::AlignedRecord,
    defaults::DefaultsTable,
    types::FeatureVector,
};

pub struct Imputer<'a> {
    defaults: &'a DefaultsTable,
}

impl<'a> Imputer<'a> {
    pub fn new(defaults: &'a DefaultsTable) -> Self {
        Self { defaults }
    }

    /// Returns the dense vector plus the names of every imputed slot.
    pub fn impute(&self, aligned: AlignedRecord) -> (FeatureVector, Vec<String>) {
        let mut imputed = Vec::new();
        let vector = aligned
            .into_slots()
            .into_iter()
            .map(|slot| {
                let value = match slot.value {
                    Some(v) => v,
                    None => {
                        let fill = self
                            .defaults
                            .get(&slot.name)
                            .cloned()
                            .unwrap_or_else(|| slot.kind.neutral());
                        imputed.push(slot.name.clone());
                        fill
                    }
                };
                (slot.name, value)
            })
            .collect();

        if !imputed.is_empty() {
            log::debug!("impute: filled {} absent slot(s)", imputed.len());
        }
        (vector, imputed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::SchemaAligner;
    use crate::schema::{FeatureSpec, Schema};
    use crate::transform::Coercion;
    use crate::types::{FeatureValue, PropertyRecord};

    #[test]
    fn defaults_then_neutral_fallback() {
        let schema = Schema::new(vec![
            FeatureSpec::numeric("LotArea"),
            FeatureSpec::numeric("PoolArea"),
            FeatureSpec::categorical("PoolQC"),
            FeatureSpec::numeric("GrLivArea"),
        ])
        .unwrap();
        let coercion = Coercion::default();
        let defaults: DefaultsTable =
            vec![("LotArea".to_string(), FeatureValue::Number(9478.5))].into_iter().collect();
        let aligned = SchemaAligner::new(&schema, &coercion)
            .align(&PropertyRecord::new().with("GrLivArea", 1200.0));

        let (vector, imputed) = Imputer::new(&defaults).impute(aligned);

        assert_eq!(vector.number("LotArea"), Some(9478.5));
        assert_eq!(vector.number("PoolArea"), Some(0.0));
        assert_eq!(vector.get("PoolQC"), Some(&FeatureValue::category("None")));
        assert_eq!(vector.number("GrLivArea"), Some(1200.0));
        assert_eq!(imputed, vec!["LotArea", "PoolArea", "PoolQC"]);
    }
}
