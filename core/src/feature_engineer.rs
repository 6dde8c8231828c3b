//! Derived columns: total square footage, house age, bath count, coordinates.
//!
//! Runs after imputation, so every schema column is already populated.
//! RULE: purely additive. Never removes or renames a column.

use crate::{
    columns::*,
    stage::{PipelineTrace, VectorStage},
    types::FeatureVector,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Central Ames; used for any neighborhood code missing from the table.
pub const FALLBACK_COORD: LatLon = LatLon { lat: 42.0347, lon: -93.6200 };

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Neighborhood code → coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateTable {
    #[serde(default = "fallback_coord")]
    pub fallback:       LatLon,
    pub neighborhoods:  HashMap<String, LatLon>,
}

fn fallback_coord() -> LatLon {
    FALLBACK_COORD
}

impl CoordinateTable {
    pub fn new(neighborhoods: HashMap<String, LatLon>) -> Self {
        Self {
            fallback: FALLBACK_COORD,
            neighborhoods,
        }
    }

    /// Unknown codes resolve to the fallback; this never fails.
    pub fn lookup(&self, code: &str) -> LatLon {
        self.neighborhoods.get(code).copied().unwrap_or(self.fallback)
    }

    pub fn knows(&self, code: &str) -> bool {
        self.neighborhoods.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.neighborhoods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighborhoods.is_empty()
    }
}

impl Default for CoordinateTable {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    coords: CoordinateTable,
}

impl FeatureEngineer {
    pub fn new(coords: CoordinateTable) -> Self {
        Self { coords }
    }
}

/// Numeric value or 0 when the column is missing or not numeric.
fn term(vector: &FeatureVector, name: &str) -> f64 {
    vector.number(name).unwrap_or(0.0)
}

impl VectorStage for FeatureEngineer {
    fn name(&self) -> &'static str {
        "feature_engineer"
    }

    fn apply(&self, vector: &mut FeatureVector, trace: &mut PipelineTrace) {
        let total_sqft =
            term(vector, TOTAL_BSMT_SF) + term(vector, FIRST_FLR_SF) + term(vector, SECOND_FLR_SF);
        vector.set(TOTAL_HOUSE_SQFT, total_sqft);
        trace.derived.push(TOTAL_HOUSE_SQFT.to_string());

        if let (Some(built), Some(sold)) = (vector.number(YEAR_BUILT), vector.number(YR_SOLD)) {
            vector.set(HOUSE_AGE, sold - built);
            trace.derived.push(HOUSE_AGE.to_string());
        }

        let baths = term(vector, FULL_BATH)
            + 0.5 * term(vector, HALF_BATH)
            + term(vector, BSMT_FULL_BATH)
            + 0.5 * term(vector, BSMT_HALF_BATH);
        vector.set(TOTAL_BATH, baths);
        trace.derived.push(TOTAL_BATH.to_string());

        if let Some(code) = vector.get(NEIGHBORHOOD).and_then(|v| v.as_category()) {
            if !self.coords.knows(code) {
                log::debug!("engineer: unknown neighborhood '{code}', using fallback coordinate");
            }
            let at = self.coords.lookup(code);
            vector.set(LAT, at.lat);
            vector.set(LON, at.lon);
            trace.derived.push(LAT.to_string());
            trace.derived.push(LON.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureValue;

    fn vector(pairs: &[(&str, FeatureValue)]) -> FeatureVector {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn totals_default_missing_terms_to_zero() {
        let mut v = vector(&[
            (FIRST_FLR_SF, FeatureValue::Number(1000.0)),
            (FULL_BATH, FeatureValue::Number(2.0)),
            (HALF_BATH, FeatureValue::Number(1.0)),
            (BSMT_HALF_BATH, FeatureValue::Number(1.0)),
        ]);
        let mut trace = PipelineTrace::default();

        FeatureEngineer::default().apply(&mut v, &mut trace);

        assert_eq!(v.number(TOTAL_HOUSE_SQFT), Some(1000.0));
        assert_eq!(v.number(TOTAL_BATH), Some(3.0));
        assert!(!v.contains(HOUSE_AGE));
        assert!(!v.contains(LAT));
    }

    #[test]
    fn unknown_neighborhood_maps_to_fallback() {
        let mut v = vector(&[(NEIGHBORHOOD, FeatureValue::category("MarsBase"))]);
        let mut trace = PipelineTrace::default();

        FeatureEngineer::default().apply(&mut v, &mut trace);

        assert_eq!(v.number(LAT), Some(FALLBACK_COORD.lat));
        assert_eq!(v.number(LON), Some(FALLBACK_COORD.lon));
        assert_eq!(v.get(NEIGHBORHOOD), Some(&FeatureValue::category("MarsBase")));
    }
}
