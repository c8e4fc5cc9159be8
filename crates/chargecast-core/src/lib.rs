//! chargecast-core: the prediction pipeline behind the insurance-charge
//! estimation service.
//!
//! This crate implements the request path (validation, feature encoding,
//! model inference, output sanity checks) plus the startup model registry,
//! batch metrics over a reference dataset, and lightweight explainability
//! helpers. Models arrive pre-trained as JSON artifacts; no training happens
//! here.
//!
//! The design favors small, testable modules with configuration threaded
//! explicitly through constructors rather than ambient global state.
pub mod config;
pub mod encode;
pub mod error;
pub mod explain;
pub mod logger;
pub mod metrics;
pub mod models;
pub mod predictor;
pub mod record;
pub mod registry;
pub mod validate;
