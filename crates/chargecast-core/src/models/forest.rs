use serde::{Deserialize, Serialize};

use crate::encode::{FeatureVector, MixedFeatures};
use crate::models::RegressorModel;

/// One node of a pre-trained regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    /// Numeric split: `<= threshold` goes left, otherwise right.
    NumericSplit {
        field: String,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Categorical split: `field == level` goes left, otherwise right.
    LevelSplit {
        field: String,
        level: String,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn evaluate(&self, features: &MixedFeatures) -> Option<f64> {
        match self {
            TreeNode::Leaf { value } => Some(*value),
            TreeNode::NumericSplit {
                field,
                threshold,
                left,
                right,
            } => {
                let value = features.numeric(field)?;
                if value <= *threshold {
                    left.evaluate(features)
                } else {
                    right.evaluate(features)
                }
            }
            TreeNode::LevelSplit {
                field,
                level,
                left,
                right,
            } => {
                let value = features.level(field)?;
                if value == level {
                    left.evaluate(features)
                } else {
                    right.evaluate(features)
                }
            }
        }
    }
}

/// Pre-trained random forest: the prediction is the mean over all trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    pub trees: Vec<TreeNode>,
}

impl RegressorModel for ForestModel {
    fn infer(&self, features: &FeatureVector) -> Option<f64> {
        let mixed = match features {
            FeatureVector::Mixed(mixed) => mixed,
            FeatureVector::Numeric(_) => return None,
        };
        if self.trees.is_empty() {
            return None;
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(mixed)?;
        }
        Some(total / self.trees.len() as f64)
    }

    fn name(&self) -> &str {
        "random-forest"
    }
}
