//! Library surface of the chargecast CLI, kept separate from the binary so
//! the startup and command handlers are testable.
pub mod app;
