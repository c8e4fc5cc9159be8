//! Batch error statistics over the held-out reference dataset.
use crate::models::Variant;
use crate::predictor::Predictor;
use crate::record::{RawInput, ReferenceDataset};

/// Aggregated error statistics for one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantMetrics {
    pub variant: Variant,
    pub rmse: f64,
    pub mae: f64,
    /// Coefficient of determination. NaN when the reference labels have
    /// zero variance over the successfully predicted rows.
    pub r2: f64,
    /// Rows that produced a prediction.
    pub evaluated: usize,
    /// Rows whose prediction failed and were skipped.
    pub skipped: usize,
}

/// Run the predictor over every reference row for each loaded
/// numeric-prediction variant (the dummy baseline is excluded). Rows whose
/// prediction fails are skipped; a variant is reported only when at least
/// one row succeeded. An empty dataset yields an empty report.
pub fn compute_metrics(predictor: &Predictor, dataset: &ReferenceDataset) -> Vec<VariantMetrics> {
    let mut report = Vec::new();

    for &variant in Variant::ALL.iter().filter(|v| v.supports_metrics()) {
        if !predictor.registry().contains(variant) {
            continue;
        }

        let mut predictions = Vec::new();
        let mut truths = Vec::new();
        let mut skipped = 0usize;

        for row in &dataset.rows {
            let input = RawInput::from(&row.record);
            match predictor.predict(&input, variant) {
                Ok(value) => {
                    predictions.push(value);
                    truths.push(row.charges);
                }
                Err(err) => {
                    log::debug!(
                        "Skipping reference row for '{}' metrics: {}",
                        variant,
                        err
                    );
                    skipped += 1;
                }
            }
        }

        if predictions.is_empty() {
            log::warn!(
                "No successful predictions for variant '{}'; omitting from metrics",
                variant
            );
            continue;
        }

        report.push(summarize(variant, &predictions, &truths, skipped));
    }

    report
}

fn summarize(variant: Variant, predictions: &[f64], truths: &[f64], skipped: usize) -> VariantMetrics {
    let n = predictions.len() as f64;

    let mut sq_sum = 0.0;
    let mut abs_sum = 0.0;
    for (pred, truth) in predictions.iter().zip(truths) {
        let residual = pred - truth;
        sq_sum += residual * residual;
        abs_sum += residual.abs();
    }

    let mean_truth = truths.iter().sum::<f64>() / n;
    let total_sq = truths
        .iter()
        .map(|t| {
            let d = t - mean_truth;
            d * d
        })
        .sum::<f64>();

    // R² is undefined when the labels have no variance; report NaN.
    let r2 = if total_sq == 0.0 {
        f64::NAN
    } else {
        1.0 - sq_sum / total_sq
    };

    VariantMetrics {
        variant,
        rmse: (sq_sum / n).sqrt(),
        mae: abs_sum / n,
        r2,
        evaluated: predictions.len(),
        skipped,
    }
}
