use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::encode::FeatureVector;
use crate::models::RegressorModel;

/// Pre-trained linear regression over the mixed feature set.
///
/// `coefficients` is keyed by numeric field name (age, bmi, children,
/// smoker_bmi, age_squared); `levels` maps a categorical field to the
/// per-level offsets fit at training time. Levels absent from the map
/// contribute zero, matching treatment-coded categoricals where the
/// reference level is folded into the intercept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    #[serde(default)]
    pub coefficients: BTreeMap<String, f64>,
    #[serde(default)]
    pub levels: BTreeMap<String, BTreeMap<String, f64>>,
}

impl RegressorModel for LinearModel {
    fn infer(&self, features: &FeatureVector) -> Option<f64> {
        let mixed = match features {
            FeatureVector::Mixed(mixed) => mixed,
            FeatureVector::Numeric(_) => return None,
        };

        let mut total = self.intercept;
        for (name, coefficient) in &self.coefficients {
            total += coefficient * mixed.numeric(name)?;
        }
        for (field, offsets) in &self.levels {
            let level = mixed.level(field)?;
            if let Some(offset) = offsets.get(level) {
                total += offset;
            }
        }
        Some(total)
    }

    fn name(&self) -> &str {
        "linear"
    }
}
