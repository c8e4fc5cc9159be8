//! Feature encoding: turn a validated record into the exact shape a model
//! variant expects.
//!
//! The boosted-tree and dummy variants take a fully numeric, column-aligned
//! vector (binary flags, baseline-dropped region indicators, derived terms).
//! The linear and random-forest variants keep categorical fields as levels
//! and only add the derived numeric terms.
use serde::{Deserialize, Serialize};

use crate::config::ValidationRules;
use crate::error::EncodingError;
use crate::models::Variant;
use crate::record::{RawRecord, Region, Sex, Smoker};

/// Ordered column set a boosted-tree model was fit on. Inference input must
/// align to it exactly, minus the label column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSchema {
    pub columns: Vec<String>,
    #[serde(default = "TrainingSchema::default_label")]
    pub label: String,
}

impl TrainingSchema {
    fn default_label() -> String {
        "charges".to_string()
    }

    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            label: Self::default_label(),
        }
    }

    /// Feature columns in schema order, label excluded.
    pub fn feature_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(move |c| *c != self.label)
    }
}

/// Fully numeric feature vector with named, ordered columns.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFeatures {
    columns: Vec<(String, f64)>,
}

impl NumericFeatures {
    pub fn from_columns(columns: Vec<(String, f64)>) -> Self {
        Self { columns }
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.columns.iter().map(|(_, value)| *value).collect()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Mixed feature set for the variants that consume categorical levels
/// directly.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedFeatures {
    pub age: f64,
    pub bmi: f64,
    pub children: f64,
    pub smoker_bmi: f64,
    pub age_squared: f64,
    pub sex: Sex,
    pub smoker: Smoker,
    pub region: Region,
}

impl MixedFeatures {
    /// Numeric fields by derived-column name; used by linear coefficients.
    pub fn numeric(&self, name: &str) -> Option<f64> {
        match name {
            "age" => Some(self.age),
            "bmi" => Some(self.bmi),
            "children" => Some(self.children),
            "smoker_bmi" => Some(self.smoker_bmi),
            "age_squared" => Some(self.age_squared),
            _ => None,
        }
    }

    /// Categorical level by field name.
    pub fn level(&self, field: &str) -> Option<&'static str> {
        match field {
            "sex" => Some(self.sex.as_str()),
            "smoker" => Some(self.smoker.as_str()),
            "region" => Some(self.region.as_str()),
            _ => None,
        }
    }
}

/// Variant-specific numeric encoding of one record.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureVector {
    Numeric(NumericFeatures),
    Mixed(MixedFeatures),
}

/// Feature encoder parameterized by the configured level sets.
#[derive(Debug, Clone)]
pub struct Encoder {
    rules: ValidationRules,
}

impl Encoder {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    /// Encode a record for the given variant. `schema` is required by the
    /// boosted-tree variant for column-exact alignment and ignored
    /// otherwise.
    pub fn encode(
        &self,
        record: &RawRecord,
        variant: Variant,
        schema: Option<&TrainingSchema>,
    ) -> Result<FeatureVector, EncodingError> {
        if !record.bmi.is_finite() {
            return Err(EncodingError::NonFinite {
                field: "bmi".to_string(),
                value: record.bmi,
            });
        }
        let age = record.age as f64;
        if !age.is_finite() {
            return Err(EncodingError::NonFinite {
                field: "age".to_string(),
                value: age,
            });
        }

        let smoker_bmi = match record.smoker {
            Smoker::Yes => record.bmi,
            Smoker::No => 0.0,
        };
        let age_squared = age * age;

        match variant {
            Variant::BoostedTree | Variant::Dummy => {
                let mut columns: Vec<(String, f64)> = vec![
                    ("age".to_string(), age),
                    ("bmi".to_string(), record.bmi),
                    ("children".to_string(), record.children as f64),
                    (
                        "smoker_flag".to_string(),
                        if record.smoker == Smoker::Yes { 1.0 } else { 0.0 },
                    ),
                    (
                        "sex_male_flag".to_string(),
                        if record.sex == Sex::Male { 1.0 } else { 0.0 },
                    ),
                ];
                for region in Region::ALL {
                    if region == Region::BASELINE {
                        continue;
                    }
                    columns.push((
                        format!("region_{}", region.as_str()),
                        if record.region == region { 1.0 } else { 0.0 },
                    ));
                }
                columns.push(("smoker_bmi".to_string(), smoker_bmi));
                columns.push(("age_squared".to_string(), age_squared));

                if let Some(schema) = schema {
                    columns = align_to_schema(columns, schema);
                }

                Ok(FeatureVector::Numeric(NumericFeatures { columns }))
            }
            Variant::Linear | Variant::RandomForest => {
                self.check_level("sex", record.sex.as_str())?;
                self.check_level("smoker", record.smoker.as_str())?;
                self.check_level("region", record.region.as_str())?;

                Ok(FeatureVector::Mixed(MixedFeatures {
                    age,
                    bmi: record.bmi,
                    children: record.children as f64,
                    smoker_bmi,
                    age_squared,
                    sex: record.sex,
                    smoker: record.smoker,
                    region: record.region,
                }))
            }
        }
    }

    fn check_level(&self, field: &str, value: &str) -> Result<(), EncodingError> {
        if self.rules.level_allowed(field, value) {
            Ok(())
        } else {
            Err(EncodingError::UnknownLevel {
                field: field.to_string(),
                value: value.to_string(),
            })
        }
    }
}

/// Align columns to the training schema: schema columns missing from the
/// current set are filled with 0, columns absent from the schema are
/// dropped, and the result follows schema order with the label excluded.
fn align_to_schema(columns: Vec<(String, f64)>, schema: &TrainingSchema) -> Vec<(String, f64)> {
    schema
        .feature_columns()
        .map(|name| {
            let value = columns
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v)
                .unwrap_or(0.0);
            (name.to_string(), value)
        })
        .collect()
}
