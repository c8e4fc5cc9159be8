//! Application startup and command handlers.
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use chargecast_core::config::AppConfig;
use chargecast_core::error::LoadError;
use chargecast_core::explain::{explain_instance, global_importance};
use chargecast_core::logger::PredictionLogger;
use chargecast_core::metrics::compute_metrics;
use chargecast_core::models::Variant;
use chargecast_core::predictor::Predictor;
use chargecast_core::record::{read_reference_csv, RawInput, ReferenceDataset};
use chargecast_core::registry::{load_all, ModelRegistry};

/// Fully started application: models loaded, logger open, predictor ready.
pub struct App {
    pub predictor: Predictor,
    pub logger: Arc<PredictionLogger>,
    pub registry: Arc<ModelRegistry>,
    /// Variants an artifact path was configured for.
    pub attempted: Vec<Variant>,
    /// Per-variant load failures; individually non-fatal.
    pub failures: Vec<(Variant, LoadError)>,
    reference: Option<ReferenceDataset>,
}

impl App {
    /// Load every configured model, open the log files, and wire the
    /// predictor. Model loading must complete (or fail fatally) before any
    /// request is served; zero loaded variants is the one fatal case.
    pub fn bootstrap(config: &AppConfig) -> Result<Self> {
        let logger = Arc::new(
            PredictionLogger::new(&config.log_dir, config.logging_enabled)
                .context("Failed to open log files")?,
        );

        let startup = load_all(&config.models).map_err(|err| {
            let _ = logger.log_error(&err.to_string(), "startup");
            anyhow!("Startup failed: {}", err)
        })?;

        for (variant, err) in &startup.failures {
            let _ = logger.log_error(&err.to_string(), &format!("load variant={}", variant));
        }

        let loaded = startup.registry.loaded_variants();
        log::info!(
            "Serving {} of {} configured variants",
            loaded.len(),
            startup.attempted.len()
        );
        if let Err(err) = logger.log_startup(&loaded) {
            log::warn!("Failed to write startup log: {:#}", err);
        }

        // A broken reference dataset only disables metrics and explain;
        // prediction keeps serving from the loaded registry.
        let reference = match &config.reference_data {
            Some(path) => match read_reference_csv(path) {
                Ok(dataset) => Some(dataset),
                Err(err) => {
                    log::warn!(
                        "Reference dataset {} unavailable: {:#}",
                        path.display(),
                        err
                    );
                    let _ = logger.log_error(
                        &format!("{:#}", err),
                        &format!("reference data {}", path.display()),
                    );
                    None
                }
            },
            None => None,
        };

        let registry = Arc::new(startup.registry);
        let predictor = Predictor::new(config.rules.clone(), Arc::clone(&registry), Arc::clone(&logger));

        Ok(Self {
            predictor,
            logger,
            registry,
            attempted: startup.attempted,
            failures: startup.failures,
            reference,
        })
    }

    fn reference(&self) -> Result<&ReferenceDataset> {
        self.reference
            .as_ref()
            .ok_or_else(|| anyhow!("No reference dataset configured (set 'reference_data')"))
    }

    /// Predict one record and print either the formatted value or the
    /// readable error text.
    pub fn run_predict(&self, input: &RawInput, variant: Variant) -> Result<()> {
        match self.predictor.predict(input, variant) {
            Ok(value) => {
                println!("Estimated charges ({}): ${:.2}", variant, value);
                Ok(())
            }
            Err(err) => {
                let _ = self
                    .logger
                    .log_error(&err.to_string(), &format!("predict variant={}", variant));
                println!("Prediction failed: {}", err);
                Ok(())
            }
        }
    }

    /// Print the per-variant metrics table.
    pub fn run_metrics(&self) -> Result<()> {
        let dataset = self.reference()?;
        let report = compute_metrics(&self.predictor, dataset);
        if report.is_empty() {
            println!("No variant produced a successful prediction on the reference data.");
            return Ok(());
        }

        println!(
            "{:<15} {:>12} {:>12} {:>8} {:>10} {:>8}",
            "variant", "RMSE", "MAE", "R2", "evaluated", "skipped"
        );
        for row in report {
            println!(
                "{:<15} {:>12.2} {:>12.2} {:>8.4} {:>10} {:>8}",
                row.variant.to_string(),
                row.rmse,
                row.mae,
                row.r2,
                row.evaluated,
                row.skipped
            );
        }
        Ok(())
    }

    /// Global permutation importance, or per-instance attribution when a
    /// record was supplied.
    pub fn run_explain(&self, variant: Variant, instance: Option<&RawInput>) -> Result<()> {
        let dataset = self.reference()?;

        match instance {
            Some(input) => {
                let explanation = explain_instance(&self.predictor, dataset, input, variant)
                    .map_err(|err| anyhow!("Explanation failed: {}", err))?;
                println!(
                    "Predicted charges ({}): ${:.2}",
                    variant, explanation.predicted
                );
                println!("Contribution vs. baseline record:");
                for attribution in explanation.attributions {
                    println!("  {:<10} {:>+12.2}", attribution.field, attribution.contribution);
                }
            }
            None => {
                let report = global_importance(&self.predictor, dataset, variant);
                if report.is_empty() {
                    println!("No successful predictions on the reference data.");
                    return Ok(());
                }
                println!("Permutation importance ({}):", variant);
                for row in report {
                    println!("  {:<10} {:>12.2}", row.field, row.importance);
                }
            }
        }
        Ok(())
    }
}
