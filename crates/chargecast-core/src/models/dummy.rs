use serde::{Deserialize, Serialize};

use crate::encode::FeatureVector;
use crate::models::RegressorModel;

/// Baseline predictor: always returns the training-set mean charge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DummyModel {
    pub mean: f64,
}

impl RegressorModel for DummyModel {
    fn infer(&self, _features: &FeatureVector) -> Option<f64> {
        Some(self.mean)
    }

    fn name(&self) -> &str {
        "dummy"
    }
}
