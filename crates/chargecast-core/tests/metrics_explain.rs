//! Integration tests for the metrics reporter and explainability helpers.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use chargecast_core::config::{ArtifactSpec, ModelPaths, ValidationRules};
use chargecast_core::explain::{baseline_input, explain_instance, global_importance};
use chargecast_core::logger::PredictionLogger;
use chargecast_core::metrics::compute_metrics;
use chargecast_core::models::Variant;
use chargecast_core::predictor::Predictor;
use chargecast_core::record::{read_reference_csv, RawInput, ReferenceDataset};
use chargecast_core::registry::load_all;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn write_linear_artifact(dir: &Path) -> ArtifactSpec {
    // charges = 100 * age, everything else ignored.
    let content = json!({
        "m": { "intercept": 0.0, "coefficients": { "age": 100.0 } }
    });
    let path = dir.join("linear.json");
    std::fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();
    ArtifactSpec::new(path)
}

fn linear_predictor(dir: &Path) -> Predictor {
    let paths = ModelPaths {
        linear: Some(write_linear_artifact(dir)),
        ..Default::default()
    };
    let startup = load_all(&paths).unwrap();
    Predictor::new(
        ValidationRules::default(),
        Arc::new(startup.registry),
        Arc::new(PredictionLogger::disabled()),
    )
}

fn write_reference_csv(dir: &Path, rows: &[&str]) -> std::path::PathBuf {
    let mut content = String::from("age,sex,bmi,children,smoker,region,charges\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    let path = dir.join("reference.csv");
    std::fs::write(&path, content).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Reference dataset loading
// ---------------------------------------------------------------------------

#[test]
fn reference_csv_parses_all_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_reference_csv(
        dir.path(),
        &[
            "30,male,25.5,2,no,northeast,3000",
            "45,female,31.2,0,yes,southwest,42000",
        ],
    );
    let dataset = read_reference_csv(&path).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.rows[0].record.age, 30);
    assert_eq!(dataset.rows[1].charges, 42000.0);
}

#[test]
fn reference_csv_missing_column_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "age,sex,bmi\n30,male,25\n").unwrap();
    let err = read_reference_csv(&path).unwrap_err();
    assert!(err.to_string().contains("children"));
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[test]
fn metrics_skip_failed_rows_and_use_only_successes() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = linear_predictor(dir.path());

    // Second row has age 70, outside the default [18, 64] range, so its
    // prediction fails validation and only the first row counts.
    let path = write_reference_csv(
        dir.path(),
        &[
            "30,male,25.5,2,no,northeast,2900",
            "70,male,25.5,2,no,northeast,9999",
        ],
    );
    let dataset = read_reference_csv(&path).unwrap();

    let report = compute_metrics(&predictor, &dataset);
    assert_eq!(report.len(), 1);
    let row = &report[0];
    assert_eq!(row.variant, Variant::Linear);
    assert_eq!(row.evaluated, 1);
    assert_eq!(row.skipped, 1);
    // Prediction for age 30 is 3000 against a truth of 2900.
    assert!((row.rmse - 100.0).abs() < 1e-9);
    assert!((row.mae - 100.0).abs() < 1e-9);
    // A single row has zero label variance, so R² is undefined.
    assert!(row.r2.is_nan());
}

#[test]
fn metrics_compute_r2_over_multiple_rows() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = linear_predictor(dir.path());

    let path = write_reference_csv(
        dir.path(),
        &[
            "20,male,25.5,2,no,northeast,2000",
            "30,male,25.5,2,no,northeast,3000",
            "40,male,25.5,2,no,northeast,4000",
        ],
    );
    let dataset = read_reference_csv(&path).unwrap();

    let report = compute_metrics(&predictor, &dataset);
    assert_eq!(report.len(), 1);
    let row = &report[0];
    // The model reproduces the labels exactly.
    assert!(row.rmse.abs() < 1e-9);
    assert!(row.mae.abs() < 1e-9);
    assert!((row.r2 - 1.0).abs() < 1e-9);
    assert_eq!(row.evaluated, 3);
    assert_eq!(row.skipped, 0);
}

#[test]
fn metrics_on_empty_dataset_are_empty() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = linear_predictor(dir.path());
    let report = compute_metrics(&predictor, &ReferenceDataset::default());
    assert!(report.is_empty());
}

#[test]
fn dummy_variant_is_excluded_from_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let dummy_path = dir.path().join("dummy.json");
    std::fs::write(
        &dummy_path,
        serde_json::to_string(&json!({ "m": { "mean": 5000.0 } })).unwrap(),
    )
    .unwrap();
    let paths = ModelPaths {
        dummy: Some(ArtifactSpec::new(dummy_path)),
        ..Default::default()
    };
    let startup = load_all(&paths).unwrap();
    let predictor = Predictor::new(
        ValidationRules::default(),
        Arc::new(startup.registry),
        Arc::new(PredictionLogger::disabled()),
    );

    let path = write_reference_csv(dir.path(), &["30,male,25.5,2,no,northeast,3000"]);
    let dataset = read_reference_csv(&path).unwrap();
    assert!(compute_metrics(&predictor, &dataset).is_empty());
}

// ---------------------------------------------------------------------------
// Explainability
// ---------------------------------------------------------------------------

#[test]
fn baseline_uses_median_and_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_reference_csv(
        dir.path(),
        &[
            "20,male,20,0,no,northeast,1000",
            "30,male,25,1,no,southwest,2000",
            "40,female,30,2,yes,southwest,3000",
        ],
    );
    let dataset = read_reference_csv(&path).unwrap();
    let baseline = baseline_input(&dataset);
    assert_eq!(baseline.age.as_deref(), Some("30"));
    assert_eq!(baseline.sex.as_deref(), Some("male"));
    assert_eq!(baseline.smoker.as_deref(), Some("no"));
    assert_eq!(baseline.region.as_deref(), Some("southwest"));
}

#[test]
fn age_dominates_importance_for_an_age_only_model() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = linear_predictor(dir.path());

    let path = write_reference_csv(
        dir.path(),
        &[
            "20,male,20,0,no,northeast,2000",
            "35,female,28,1,no,southwest,3500",
            "50,male,33,2,yes,southeast,5000",
            "64,female,40,3,no,northwest,6400",
        ],
    );
    let dataset = read_reference_csv(&path).unwrap();

    let report = global_importance(&predictor, &dataset, Variant::Linear);
    assert_eq!(report.len(), 6);
    // The model only reads age; permuting any other field moves nothing.
    assert_eq!(report[0].field, "age");
    for row in &report[1..] {
        assert!(row.importance.abs() < 1e-9, "{} should be inert", row.field);
    }
}

#[test]
fn instance_attribution_tracks_the_age_delta() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = linear_predictor(dir.path());

    let path = write_reference_csv(
        dir.path(),
        &[
            "30,male,20,0,no,northeast,3000",
            "30,female,25,1,no,southwest,3000",
            "30,male,30,2,yes,southeast,3000",
        ],
    );
    let dataset = read_reference_csv(&path).unwrap();

    let input = RawInput {
        age: Some("50".to_string()),
        sex: Some("male".to_string()),
        bmi: Some("25".to_string()),
        children: Some("1".to_string()),
        smoker: Some("no".to_string()),
        region: Some("northeast".to_string()),
    };
    let explanation = explain_instance(&predictor, &dataset, &input, Variant::Linear).unwrap();
    assert!((explanation.predicted - 5000.0).abs() < 1e-9);

    let age = explanation
        .attributions
        .iter()
        .find(|a| a.field == "age")
        .unwrap();
    // Baseline age is 30, so the age contribution is 5000 - 3000.
    assert!((age.contribution - 2000.0).abs() < 1e-9);

    for attribution in &explanation.attributions {
        if attribution.field != "age" {
            assert!(attribution.contribution.abs() < 1e-9);
        }
    }
}
