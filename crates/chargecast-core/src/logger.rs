//! Append-only prediction and error logs.
//!
//! One JSON line per event, timestamped with UTC RFC 3339. File handles sit
//! behind a `Mutex` so concurrent requests never interleave partial lines.
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::Variant;
use crate::record::RawRecord;

/// One successful prediction, as written to the prediction log.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRecord {
    pub timestamp: String,
    pub variant: Variant,
    pub predicted: f64,
    pub input: String,
}

#[derive(Debug, Serialize)]
struct ErrorLine<'a> {
    timestamp: String,
    message: &'a str,
    context: &'a str,
}

#[derive(Debug, Serialize)]
struct StartupLine<'a> {
    timestamp: String,
    event: &'static str,
    loaded: &'a [Variant],
}

/// Writer for the append-only log files. When logging is disabled the
/// methods are no-ops that still return `Ok`.
#[derive(Debug)]
pub struct PredictionLogger {
    predictions: Option<Mutex<File>>,
    errors: Option<Mutex<File>>,
}

impl PredictionLogger {
    /// Open (creating if needed) `predictions.log` and `errors.log` under
    /// `dir`.
    pub fn new<P: AsRef<Path>>(dir: P, enabled: bool) -> Result<Self> {
        if !enabled {
            return Ok(Self::disabled());
        }

        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

        let open = |name: &str| -> Result<Mutex<File>> {
            let path = dir.join(name);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Ok(Mutex::new(file))
        };

        Ok(Self {
            predictions: Some(open("predictions.log")?),
            errors: Some(open("errors.log")?),
        })
    }

    /// A logger that drops everything.
    pub fn disabled() -> Self {
        Self {
            predictions: None,
            errors: None,
        }
    }

    pub fn log_prediction(&self, record: &RawRecord, value: f64, variant: Variant) -> Result<()> {
        let Some(file) = &self.predictions else {
            return Ok(());
        };
        let line = PredictionRecord {
            timestamp: now(),
            variant,
            predicted: value,
            input: record.summary(),
        };
        append_json(file, &line)
    }

    pub fn log_error(&self, message: &str, context: &str) -> Result<()> {
        let Some(file) = &self.errors else {
            return Ok(());
        };
        let line = ErrorLine {
            timestamp: now(),
            message,
            context,
        };
        append_json(file, &line)
    }

    pub fn log_startup(&self, loaded: &[Variant]) -> Result<()> {
        let Some(file) = &self.predictions else {
            return Ok(());
        };
        let line = StartupLine {
            timestamp: now(),
            event: "startup",
            loaded,
        };
        append_json(file, &line)
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn append_json<T: Serialize>(file: &Mutex<File>, line: &T) -> Result<()> {
    let json = serde_json::to_string(line).context("Failed to serialize log line")?;
    let mut guard = file
        .lock()
        .map_err(|_| anyhow::anyhow!("log file lock poisoned"))?;
    writeln!(guard, "{}", json).context("Failed to append log line")?;
    Ok(())
}
