//! Lightweight explainability over a loaded model and the reference
//! dataset.
//!
//! Global importance is permutation-based: shuffle one raw field across the
//! reference rows and measure the mean absolute shift in predictions.
//! Per-instance attribution compares the query against a dataset-derived
//! baseline record one field at a time. Both views go through the same
//! Predictor path as live requests.
use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::error::PredictionError;
use crate::models::Variant;
use crate::predictor::Predictor;
use crate::record::{Field, RawInput, ReferenceDataset};

/// Mean absolute prediction shift caused by permuting one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldImportance {
    pub field: &'static str,
    pub importance: f64,
}

/// Per-field contribution relative to the baseline record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAttribution {
    pub field: &'static str,
    pub contribution: f64,
}

/// Explanation of one prediction against the dataset baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceExplanation {
    pub predicted: f64,
    pub attributions: Vec<FieldAttribution>,
}

/// Permutation importance per raw field, sorted descending. Rows whose
/// base prediction fails are excluded throughout.
pub fn global_importance(
    predictor: &Predictor,
    dataset: &ReferenceDataset,
    variant: Variant,
) -> Vec<FieldImportance> {
    let mut inputs = Vec::new();
    let mut base = Vec::new();
    for row in &dataset.rows {
        let input = RawInput::from(&row.record);
        if let Ok(value) = predictor.predict(&input, variant) {
            inputs.push(input);
            base.push(value);
        }
    }
    if inputs.is_empty() {
        return Vec::new();
    }

    let mut rng = thread_rng();
    let mut report = Vec::new();

    for field in Field::ALL {
        let mut column: Vec<Option<String>> = inputs
            .iter()
            .map(|input| input.get(field).map(str::to_string))
            .collect();
        column.shuffle(&mut rng);

        let mut delta_sum = 0.0;
        let mut counted = 0usize;
        for ((input, base_value), permuted) in inputs.iter().zip(&base).zip(column) {
            let mut shuffled = input.clone();
            shuffled.set(field, permuted);
            if let Ok(value) = predictor.predict(&shuffled, variant) {
                delta_sum += (value - base_value).abs();
                counted += 1;
            }
        }
        let importance = if counted == 0 {
            0.0
        } else {
            delta_sum / counted as f64
        };
        report.push(FieldImportance {
            field: field.name(),
            importance,
        });
    }

    report.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    report
}

/// Attribute one prediction field-by-field against the dataset baseline
/// (numeric medians, categorical modes).
pub fn explain_instance(
    predictor: &Predictor,
    dataset: &ReferenceDataset,
    input: &RawInput,
    variant: Variant,
) -> Result<InstanceExplanation, PredictionError> {
    let predicted = predictor.predict(input, variant)?;
    let baseline = baseline_input(dataset);

    let mut attributions = Vec::new();
    for field in Field::ALL {
        let mut counterfactual = input.clone();
        counterfactual.set(field, baseline.get(field).map(str::to_string));
        let contribution = match predictor.predict(&counterfactual, variant) {
            Ok(value) => predicted - value,
            // A baseline substitution that fails validation contributes
            // nothing rather than failing the whole explanation.
            Err(_) => 0.0,
        };
        attributions.push(FieldAttribution {
            field: field.name(),
            contribution,
        });
    }

    Ok(InstanceExplanation {
        predicted,
        attributions,
    })
}

/// Baseline record: median for numeric fields, mode for categorical ones.
pub fn baseline_input(dataset: &ReferenceDataset) -> RawInput {
    let mut baseline = RawInput::default();
    if dataset.is_empty() {
        return baseline;
    }

    let median = |mut values: Vec<f64>| -> f64 {
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values[values.len() / 2]
    };

    let ages: Vec<f64> = dataset.rows.iter().map(|r| r.record.age as f64).collect();
    let bmis: Vec<f64> = dataset.rows.iter().map(|r| r.record.bmi).collect();
    let children: Vec<f64> = dataset
        .rows
        .iter()
        .map(|r| r.record.children as f64)
        .collect();

    baseline.age = Some((median(ages) as i64).to_string());
    baseline.bmi = Some(median(bmis).to_string());
    baseline.children = Some((median(children) as i64).to_string());
    baseline.sex = Some(mode(dataset.rows.iter().map(|r| r.record.sex.as_str())));
    baseline.smoker = Some(mode(dataset.rows.iter().map(|r| r.record.smoker.as_str())));
    baseline.region = Some(mode(dataset.rows.iter().map(|r| r.record.region.as_str())));
    baseline
}

fn mode<'a, I: Iterator<Item = &'a str>>(values: I) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(value, _)| value.to_string())
        .unwrap_or_default()
}
