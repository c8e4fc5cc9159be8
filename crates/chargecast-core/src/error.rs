use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use crate::models::Variant;

/// Errors raised while turning a raw record into a model-ready feature
/// vector. These indicate a configuration or training-artifact
/// inconsistency, not bad user input.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodingError {
    /// A required field was absent from the record.
    MissingField(String),
    /// A numeric field could not be parsed as a number.
    NotNumeric { field: String, value: String },
    /// A numeric field held a non-finite value (NaN or infinity).
    NonFinite { field: String, value: f64 },
    /// A categorical value fell outside the configured allowed set.
    UnknownLevel { field: String, value: String },
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncodingError::MissingField(field) => {
                write!(f, "record is missing required field '{}'", field)
            }
            EncodingError::NotNumeric { field, value } => {
                write!(f, "field '{}' is not numeric: '{}'", field, value)
            }
            EncodingError::NonFinite { field, value } => {
                write!(f, "field '{}' is non-finite ({})", field, value)
            }
            EncodingError::UnknownLevel { field, value } => {
                write!(f, "value '{}' is not an allowed level for '{}'", value, field)
            }
        }
    }
}

impl Error for EncodingError {}

/// Errors raised while loading a model artifact at startup.
#[derive(Debug)]
pub enum LoadError {
    /// The artifact file does not exist.
    Missing(PathBuf),
    /// The artifact file exists but could not be read.
    Unreadable(PathBuf, std::io::Error),
    /// The artifact is not a JSON object map of named models.
    Malformed(PathBuf, String),
    /// The artifact parsed but contained zero named objects.
    EmptyArtifact(PathBuf),
    /// Not one configured variant loaded; startup cannot proceed.
    NothingLoaded,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::Missing(path) => {
                write!(f, "model artifact not found: {}", path.display())
            }
            LoadError::Unreadable(path, err) => {
                write!(f, "failed to read model artifact {}: {}", path.display(), err)
            }
            LoadError::Malformed(path, msg) => {
                write!(f, "malformed model artifact {}: {}", path.display(), msg)
            }
            LoadError::EmptyArtifact(path) => {
                write!(f, "model artifact {} contains no objects", path.display())
            }
            LoadError::NothingLoaded => {
                write!(f, "no model variant loaded successfully")
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Unreadable(_, err) => Some(err),
            _ => None,
        }
    }
}

/// Per-request failures, caught at the Predictor boundary and returned as
/// values to the caller. Nothing here escapes as a panic.
#[derive(Debug)]
pub enum PredictionError {
    /// The record failed validation; messages are user-correctable.
    Validation(Vec<String>),
    /// The requested variant is not present in the registry.
    ModelUnavailable(Variant),
    /// The record could not be encoded for the target variant.
    Encoding(EncodingError),
    /// The model produced a missing, non-numeric, or NaN output.
    InvalidOutput(String),
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PredictionError::Validation(messages) => {
                write!(f, "invalid input: {}", messages.join("; "))
            }
            PredictionError::ModelUnavailable(variant) => {
                write!(f, "model variant '{}' is not loaded", variant)
            }
            PredictionError::Encoding(err) => write!(f, "encoding failed: {}", err),
            PredictionError::InvalidOutput(msg) => {
                write!(f, "model returned an invalid output: {}", msg)
            }
        }
    }
}

impl Error for PredictionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PredictionError::Encoding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EncodingError> for PredictionError {
    fn from(err: EncodingError) -> Self {
        PredictionError::Encoding(err)
    }
}
