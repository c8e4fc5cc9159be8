//! Single-request orchestration: validate, encode, infer, sanity-check,
//! log.
//!
//! Every failure mode is caught here and returned as a typed
//! `PredictionError`; nothing propagates past this boundary. A returned
//! `Ok` value is always finite and non-negative.
use std::sync::Arc;

use crate::config::ValidationRules;
use crate::encode::Encoder;
use crate::error::PredictionError;
use crate::logger::PredictionLogger;
use crate::models::Variant;
use crate::record::RawInput;
use crate::registry::ModelRegistry;
use crate::validate::validate;

pub struct Predictor {
    rules: ValidationRules,
    encoder: Encoder,
    registry: Arc<ModelRegistry>,
    logger: Arc<PredictionLogger>,
}

impl Predictor {
    pub fn new(
        rules: ValidationRules,
        registry: Arc<ModelRegistry>,
        logger: Arc<PredictionLogger>,
    ) -> Self {
        let encoder = Encoder::new(rules.clone());
        Self {
            rules,
            encoder,
            registry,
            logger,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Run one prediction. Steps run in order and errors short-circuit the
    /// rest; the prediction log write is the only step whose failure is
    /// swallowed.
    pub fn predict(&self, input: &RawInput, variant: Variant) -> Result<f64, PredictionError> {
        let report = validate(input, &self.rules);
        if !report.valid {
            return Err(PredictionError::Validation(report.messages));
        }

        let record = input.parse()?;

        let handle = self
            .registry
            .get(variant)
            .ok_or(PredictionError::ModelUnavailable(variant))?;

        let features = self.encoder.encode(&record, variant, handle.schema())?;

        let raw = handle
            .infer(&features)
            .ok_or_else(|| PredictionError::InvalidOutput("model produced no output".to_string()))?;
        if raw.is_nan() {
            return Err(PredictionError::InvalidOutput("model returned NaN".to_string()));
        }
        if !raw.is_finite() {
            return Err(PredictionError::InvalidOutput(format!(
                "model returned a non-finite value ({})",
                raw
            )));
        }

        // Negative charges are not physically meaningful; clamp rather than
        // abort the request.
        let value = if raw < 0.0 {
            log::warn!(
                "Variant '{}' predicted a negative charge ({}); clamping to 0",
                variant,
                raw
            );
            if let Err(err) = self.logger.log_error(
                &format!("negative prediction {} clamped to 0", raw),
                &format!("variant={} input={}", variant, record.summary()),
            ) {
                log::warn!("Failed to record clamp diagnostic: {:#}", err);
            }
            0.0
        } else {
            raw
        };

        if let Err(err) = self.logger.log_prediction(&record, value, variant) {
            log::warn!("Failed to write prediction log: {:#}", err);
        }

        Ok(value)
    }
}
