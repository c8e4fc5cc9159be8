//! Application configuration, threaded explicitly through constructors.
//!
//! There is no ambient global settings object: the validator, encoder, and
//! registry each receive the piece of configuration they need.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Variant;

/// Inclusive [min, max] bounds for one numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Validation bounds and allowed categorical levels for raw records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub age: NumericRange,
    pub bmi: NumericRange,
    pub children: NumericRange,
    pub sex: Vec<String>,
    pub smoker: Vec<String>,
    pub region: Vec<String>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            age: NumericRange::new(18.0, 64.0),
            bmi: NumericRange::new(15.0, 55.0),
            children: NumericRange::new(0.0, 5.0),
            sex: vec!["male".to_string(), "female".to_string()],
            smoker: vec!["yes".to_string(), "no".to_string()],
            region: vec![
                "northeast".to_string(),
                "northwest".to_string(),
                "southeast".to_string(),
                "southwest".to_string(),
            ],
        }
    }
}

impl ValidationRules {
    /// Allowed level set for a categorical field, if the field is categorical.
    pub fn allowed_levels(&self, field: &str) -> Option<&[String]> {
        match field {
            "sex" => Some(&self.sex),
            "smoker" => Some(&self.smoker),
            "region" => Some(&self.region),
            _ => None,
        }
    }

    pub fn level_allowed(&self, field: &str, value: &str) -> bool {
        self.allowed_levels(field)
            .map(|levels| levels.iter().any(|l| l.eq_ignore_ascii_case(value)))
            .unwrap_or(false)
    }
}

/// Where one model artifact lives and which in-file object to prefer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSpec {
    pub path: PathBuf,
    /// Preferred object name inside the artifact. When absent or not found,
    /// the first object in the file is used with a warning.
    #[serde(default)]
    pub object_name: Option<String>,
}

impl ArtifactSpec {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            object_name: None,
        }
    }

    pub fn with_object<P: Into<PathBuf>, S: Into<String>>(path: P, object: S) -> Self {
        Self {
            path: path.into(),
            object_name: Some(object.into()),
        }
    }
}

/// Artifact locations per model variant. Unset variants are simply not
/// attempted at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    pub linear: Option<ArtifactSpec>,
    pub random_forest: Option<ArtifactSpec>,
    pub boosted_tree: Option<ArtifactSpec>,
    pub dummy: Option<ArtifactSpec>,
}

impl ModelPaths {
    pub fn get(&self, variant: Variant) -> Option<&ArtifactSpec> {
        match variant {
            Variant::Linear => self.linear.as_ref(),
            Variant::RandomForest => self.random_forest.as_ref(),
            Variant::BoostedTree => self.boosted_tree.as_ref(),
            Variant::Dummy => self.dummy.as_ref(),
        }
    }

    /// All configured (variant, spec) pairs in variant order.
    pub fn configured(&self) -> Vec<(Variant, &ArtifactSpec)> {
        Variant::ALL
            .iter()
            .filter_map(|&v| self.get(v).map(|spec| (v, spec)))
            .collect()
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub models: ModelPaths,
    pub rules: ValidationRules,
    /// Held-out labeled dataset for metrics and explainability.
    pub reference_data: Option<PathBuf>,
    pub log_dir: PathBuf,
    pub logging_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models: ModelPaths::default(),
            rules: ValidationRules::default(),
            reference_data: None,
            log_dir: PathBuf::from("logs"),
            logging_enabled: true,
        }
    }
}

/// Load an application configuration from a JSON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: AppConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
