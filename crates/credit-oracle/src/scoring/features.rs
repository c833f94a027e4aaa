use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::knowledge::Feature;

/// Normalized feature values keyed by feature name. Built once per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: BTreeMap<Feature, f64>,
}

impl FeatureVector {
    /// Non-finite values are stored as `0.0`.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Feature, f64)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(feature, value)| (feature, if value.is_finite() { value } else { 0.0 }))
            .collect();
        Self { values }
    }

    /// Value for `feature`, `0.0` when the encoder did not emit it.
    pub fn get(&self, feature: Feature) -> f64 {
        self.values.get(&feature).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.values.contains_key(&feature)
    }

    /// Copy of this vector with one value replaced.
    pub fn with_value(&self, feature: Feature, value: f64) -> Self {
        let mut values = self.values.clone();
        values.insert(feature, if value.is_finite() { value } else { 0.0 });
        Self { values }
    }
}
