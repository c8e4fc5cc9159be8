//! Startup model registry.
//!
//! Artifacts are JSON files mapping object names to serialized models. Each
//! configured variant is loaded independently; one broken artifact never
//! takes the others down. The registry is built once before any request is
//! served and is read-only afterward, so concurrent inference reads need no
//! locking.
use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::{ArtifactSpec, ModelPaths};
use crate::encode::{FeatureVector, TrainingSchema};
use crate::error::LoadError;
use crate::models::{
    BoostedModel, DummyModel, ForestModel, LinearModel, RegressorModel, Variant,
};

/// Outcome of resolving the expected object name inside an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectResolution {
    /// The requested object name was present.
    Exact(String),
    /// The requested name was absent (or never given); the first object in
    /// the file was used instead.
    Fallback {
        requested: Option<String>,
        used: String,
    },
}

impl ObjectResolution {
    pub fn object_name(&self) -> &str {
        match self {
            ObjectResolution::Exact(name) => name,
            ObjectResolution::Fallback { used, .. } => used,
        }
    }
}

/// Two-step object lookup: exact match first, then first-in-file fallback.
/// Returns `None` only when the artifact holds zero objects.
pub fn resolve_object<'a>(
    objects: &'a serde_json::Map<String, Value>,
    expected: Option<&str>,
) -> Option<(ObjectResolution, &'a Value)> {
    if let Some(name) = expected {
        if let Some(value) = objects.get(name) {
            return Some((ObjectResolution::Exact(name.to_string()), value));
        }
    }
    let (first_name, first_value) = objects.iter().next()?;
    Some((
        ObjectResolution::Fallback {
            requested: expected.map(str::to_string),
            used: first_name.clone(),
        },
        first_value,
    ))
}

/// A loaded model plus its load-time metadata. Owned by the registry,
/// never mutated by a request.
pub struct ModelHandle {
    variant: Variant,
    resolution: ObjectResolution,
    model: Box<dyn RegressorModel>,
}

impl ModelHandle {
    pub fn new(variant: Variant, resolution: ObjectResolution, model: Box<dyn RegressorModel>) -> Self {
        Self {
            variant,
            resolution,
            model,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn resolution(&self) -> &ObjectResolution {
        &self.resolution
    }

    pub fn schema(&self) -> Option<&TrainingSchema> {
        self.model.schema()
    }

    pub fn infer(&self, features: &FeatureVector) -> Option<f64> {
        self.model.infer(features)
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("variant", &self.variant)
            .field("resolution", &self.resolution)
            .field("model", &self.model.name())
            .finish()
    }
}

/// Load one variant's artifact from disk.
pub fn load(variant: Variant, spec: &ArtifactSpec) -> Result<ModelHandle, LoadError> {
    let path = &spec.path;
    if !path.exists() {
        return Err(LoadError::Missing(path.clone()));
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| LoadError::Unreadable(path.clone(), e))?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| LoadError::Malformed(path.clone(), e.to_string()))?;
    let objects = value.as_object().ok_or_else(|| {
        LoadError::Malformed(path.clone(), "expected a map of named model objects".to_string())
    })?;

    let (resolution, object) = resolve_object(objects, spec.object_name.as_deref())
        .ok_or_else(|| LoadError::EmptyArtifact(path.clone()))?;

    if let ObjectResolution::Fallback { requested, used } = &resolution {
        match requested {
            Some(requested) => log::warn!(
                "Artifact {} has no object '{}'; falling back to '{}'",
                path.display(),
                requested,
                used
            ),
            None => log::debug!(
                "No object name configured for {}; using '{}'",
                path.display(),
                used
            ),
        }
    }

    let model = deserialize_model(variant, object)
        .map_err(|msg| LoadError::Malformed(path.clone(), msg))?;

    Ok(ModelHandle::new(variant, resolution, model))
}

fn deserialize_model(variant: Variant, object: &Value) -> Result<Box<dyn RegressorModel>, String> {
    let object = object.clone();
    match variant {
        Variant::Linear => serde_json::from_value::<LinearModel>(object)
            .map(|m| Box::new(m) as Box<dyn RegressorModel>)
            .map_err(|e| format!("invalid linear model: {}", e)),
        Variant::RandomForest => serde_json::from_value::<ForestModel>(object)
            .map(|m| Box::new(m) as Box<dyn RegressorModel>)
            .map_err(|e| format!("invalid random-forest model: {}", e)),
        Variant::BoostedTree => serde_json::from_value::<BoostedModel>(object)
            .map(|m| Box::new(m) as Box<dyn RegressorModel>)
            .map_err(|e| format!("invalid boosted-tree model: {}", e)),
        Variant::Dummy => serde_json::from_value::<DummyModel>(object)
            .map(|m| Box::new(m) as Box<dyn RegressorModel>)
            .map_err(|e| format!("invalid dummy model: {}", e)),
    }
}

/// Variant-to-handle map, built once at startup.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    handles: BTreeMap<Variant, ModelHandle>,
}

impl ModelRegistry {
    pub fn from_handles(handles: Vec<ModelHandle>) -> Self {
        Self {
            handles: handles.into_iter().map(|h| (h.variant(), h)).collect(),
        }
    }

    pub fn get(&self, variant: Variant) -> Option<&ModelHandle> {
        self.handles.get(&variant)
    }

    pub fn contains(&self, variant: Variant) -> bool {
        self.handles.contains_key(&variant)
    }

    pub fn loaded_variants(&self) -> Vec<Variant> {
        self.handles.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Result of attempting every configured variant.
#[derive(Debug)]
pub struct RegistryStartup {
    pub registry: ModelRegistry,
    /// Every variant an artifact path was configured for.
    pub attempted: Vec<Variant>,
    /// Variants that failed, with the reason. Individually non-fatal.
    pub failures: Vec<(Variant, LoadError)>,
}

/// Attempt every configured variant independently. Fails only when zero
/// variants load; that is the single fatal startup condition.
pub fn load_all(models: &ModelPaths) -> Result<RegistryStartup, LoadError> {
    let mut handles = Vec::new();
    let mut attempted = Vec::new();
    let mut failures = Vec::new();

    for (variant, spec) in models.configured() {
        attempted.push(variant);
        match load(variant, spec) {
            Ok(handle) => {
                log::info!(
                    "Loaded model variant '{}' from {} (object '{}')",
                    variant,
                    spec.path.display(),
                    handle.resolution().object_name()
                );
                handles.push(handle);
            }
            Err(err) => {
                log::warn!("Model variant '{}' unavailable: {}", variant, err);
                failures.push((variant, err));
            }
        }
    }

    let registry = ModelRegistry::from_handles(handles);
    if registry.is_empty() {
        return Err(LoadError::NothingLoaded);
    }

    Ok(RegistryStartup {
        registry,
        attempted,
        failures,
    })
}
