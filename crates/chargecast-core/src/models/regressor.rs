use crate::encode::{FeatureVector, TrainingSchema};

/// Contract every loaded model fulfils. The registry owns boxed trait
/// objects so the predictor never matches on the concrete model kind.
pub trait RegressorModel: Send + Sync {
    /// Run inference on one encoded record. `None` means the model produced
    /// no output; the predictor turns that into an invalid-output error.
    /// NaN and sign checks also happen at the predictor boundary.
    fn infer(&self, features: &FeatureVector) -> Option<f64>;

    /// Human readable model name.
    fn name(&self) -> &str {
        "regressor"
    }

    /// Declared training-time schema, when the model requires column-exact
    /// input alignment.
    fn schema(&self) -> Option<&TrainingSchema> {
        None
    }
}
