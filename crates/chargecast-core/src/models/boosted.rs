use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use crate::encode::{FeatureVector, TrainingSchema};
use crate::models::RegressorModel;

/// Pre-trained gradient-boosted tree regressor.
///
/// The artifact carries the serialized GBDT ensemble together with the
/// training-time column schema; inference input must be aligned to that
/// schema before it reaches `infer`.
#[derive(Serialize, Deserialize)]
pub struct BoostedModel {
    pub schema: TrainingSchema,
    pub model: GBDT,
}

impl RegressorModel for BoostedModel {
    fn infer(&self, features: &FeatureVector) -> Option<f64> {
        let numeric = match features {
            FeatureVector::Numeric(numeric) => numeric,
            FeatureVector::Mixed(_) => return None,
        };

        let row: Vec<ValueType> = numeric.values().iter().map(|&v| v as ValueType).collect();
        let mut batch = DataVec::new();
        batch.push(Data::new_test_data(row, None));

        let predictions = self.model.predict(&batch);
        predictions.first().map(|&v| v as f64)
    }

    fn name(&self) -> &str {
        "boosted-tree"
    }

    fn schema(&self) -> Option<&TrainingSchema> {
        Some(&self.schema)
    }
}
