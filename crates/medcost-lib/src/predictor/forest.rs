//! Random-forest regressor serialized as JSON
//!
//! Each tree is a flat node array rooted at index 0. A split sends the
//! sample left when `x[feature] <= threshold`; the forest output is the
//! mean of the tree outputs.

use super::Regressor;
use crate::error::{PredictionError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn evaluate(&self, features: &[f32]) -> f64 {
        let mut idx = 0;
        // Children always point forward (checked on load), so this terminates.
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] as f64 <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// On-disk forest artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    pub version: String,
    pub n_features: usize,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<RegressionTree>,
}

impl ForestModel {
    pub fn from_json(bytes: &[u8]) -> std::result::Result<Self, String> {
        let model: ForestModel =
            serde_json::from_slice(bytes).map_err(|e| format!("invalid forest JSON: {}", e))?;
        model.check_structure()?;
        Ok(model)
    }

    fn check_structure(&self) -> std::result::Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {} has no nodes", t));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Leaf { value } if !value.is_finite() => {
                        return Err(format!("tree {} node {} has non-finite leaf", t, i));
                    }
                    TreeNode::Leaf { .. } => {}
                    TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= self.n_features {
                            return Err(format!(
                                "tree {} node {} splits on feature {} of {}",
                                t, i, feature, self.n_features
                            ));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(format!(
                                    "tree {} node {} has invalid child {}",
                                    t, i, child
                                ));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Forest regressor backend
#[derive(Debug, Clone)]
pub struct ForestRegressor {
    model: ForestModel,
}

impl ForestRegressor {
    pub fn new(model: ForestModel) -> Self {
        Self { model }
    }

    pub fn version(&self) -> &str {
        &self.model.version
    }

    pub fn tree_count(&self) -> usize {
        self.model.trees.len()
    }
}

impl Regressor for ForestRegressor {
    fn backend(&self) -> &'static str {
        "forest-json"
    }

    fn n_features(&self) -> usize {
        self.model.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.model.feature_names.as_deref()
    }

    fn infer(&self, features: &[f32]) -> Result<f64> {
        if features.len() != self.model.n_features {
            return Err(PredictionError::ShapeMismatch {
                expected: self.model.n_features,
                actual: features.len(),
                detail: "forest input".to_string(),
            });
        }
        let sum: f64 = self.model.trees.iter().map(|t| t.evaluate(features)).sum();
        Ok(sum / self.model.trees.len() as f64)
    }
}
