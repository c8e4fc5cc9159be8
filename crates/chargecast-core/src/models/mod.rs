//! Model variants and their inference implementations.
//!
//! `Variant` is a closed enumeration: adding or removing a supported model
//! is a compile-time-checked change, never a string comparison at runtime.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod boosted;
pub mod dummy;
pub mod forest;
pub mod linear;
mod regressor;

pub use boosted::BoostedModel;
pub use dummy::DummyModel;
pub use forest::ForestModel;
pub use linear::LinearModel;
pub use regressor::RegressorModel;

/// The four supported model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    Linear,
    RandomForest,
    BoostedTree,
    Dummy,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Linear,
        Variant::RandomForest,
        Variant::BoostedTree,
        Variant::Dummy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Linear => "linear",
            Variant::RandomForest => "random-forest",
            Variant::BoostedTree => "boosted-tree",
            Variant::Dummy => "dummy",
        }
    }

    /// Whether the variant participates in the metrics report. The dummy
    /// baseline is served but never scored.
    pub fn supports_metrics(&self) -> bool {
        !matches!(self, Variant::Dummy)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(Variant::Linear),
            "random-forest" | "random_forest" => Ok(Variant::RandomForest),
            "boosted-tree" | "boosted_tree" => Ok(Variant::BoostedTree),
            "dummy" => Ok(Variant::Dummy),
            other => Err(format!(
                "Unknown model variant: {}. Expected one of: linear, random-forest, boosted-tree, dummy",
                other
            )),
        }
    }
}
