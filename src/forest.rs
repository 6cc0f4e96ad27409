//! Random-forest regressor loaded from a JSON artifact.
//!
//! The artifact is produced offline; this module only deserializes and
//! evaluates it.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "feature_names": ["PPFD_GH", "Temperature_GH", "..."],
//!   "trees": [
//!     { "Node": { "feature_idx": 8, "threshold": 14.5,
//!                 "left":  { "Leaf": { "value": 4.1, "n_samples": 52 } },
//!                 "right": { "Leaf": { "value": 2.7, "n_samples": 61 } } } }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::model::Measure;
use crate::error::{InferenceError, LoadError};

/// Artifact layout version understood by [`RandomForestRegressor::load`].
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Tree structure
// ---------------------------------------------------------------------------

/// Leaf of a regression tree: the mean target of the training samples that
/// reached it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionLeaf {
    pub value: f64,
    #[serde(default)]
    pub n_samples: usize,
}

/// Internal split. Samples with `feature <= threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionNode {
    pub feature_idx: usize,
    pub threshold: f64,
    pub left: Box<RegressionTreeNode>,
    pub right: Box<RegressionTreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegressionTreeNode {
    Node(RegressionNode),
    Leaf(RegressionLeaf),
}

impl RegressionTreeNode {
    pub fn leaf(value: f64) -> Self {
        RegressionTreeNode::Leaf(RegressionLeaf {
            value,
            n_samples: 0,
        })
    }

    pub fn split(feature_idx: usize, threshold: f64, left: Self, right: Self) -> Self {
        RegressionTreeNode::Node(RegressionNode {
            feature_idx,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Walk from this node to a leaf. A split on a feature the row does not
    /// have is a shape mismatch.
    pub fn predict(&self, row: &[f64]) -> Result<f64, InferenceError> {
        let mut node = self;
        loop {
            match node {
                RegressionTreeNode::Leaf(leaf) => return Ok(leaf.value),
                RegressionTreeNode::Node(split) => {
                    let value = row.get(split.feature_idx).ok_or(InferenceError::ShapeMismatch {
                        expected: split.feature_idx + 1,
                        found: row.len(),
                    })?;
                    node = if *value <= split.threshold {
                        split.left.as_ref()
                    } else {
                        split.right.as_ref()
                    };
                }
            }
        }
    }

    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    pub fn depth(&self) -> usize {
        match self {
            RegressionTreeNode::Leaf(_) => 0,
            RegressionTreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    fn max_feature_idx(&self) -> Option<usize> {
        match self {
            RegressionTreeNode::Leaf(_) => None,
            RegressionTreeNode::Node(node) => [
                Some(node.feature_idx),
                node.left.max_feature_idx(),
                node.right.max_feature_idx(),
            ]
            .into_iter()
            .flatten()
            .max(),
        }
    }
}

// ---------------------------------------------------------------------------
// Forest
// ---------------------------------------------------------------------------

/// An ensemble of regression trees; the prediction is the mean of the trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub trees: Vec<RegressionTreeNode>,
}

impl RandomForestRegressor {
    /// A forest over the dashboard's eleven features, in training order.
    pub fn new(trees: Vec<RegressionTreeNode>) -> Self {
        RandomForestRegressor {
            format_version: FORMAT_VERSION,
            feature_names: Measure::FEATURES
                .iter()
                .map(|m| m.column().to_string())
                .collect(),
            trees,
        }
    }

    /// Read and validate an artifact from disk.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Parse and validate an artifact. `path` is only used in error messages.
    pub fn from_json(text: &str, path: &Path) -> Result<Self, LoadError> {
        let forest: RandomForestRegressor =
            serde_json::from_str(text).map_err(|source| LoadError::ModelFormat {
                path: path.to_path_buf(),
                source,
            })?;
        forest.validate(path)?;
        Ok(forest)
    }

    fn validate(&self, path: &Path) -> Result<(), LoadError> {
        if self.format_version != FORMAT_VERSION {
            return Err(LoadError::ModelVersion {
                path: path.to_path_buf(),
                found: self.format_version,
                supported: FORMAT_VERSION,
            });
        }

        let expected: Vec<String> = Measure::FEATURES
            .iter()
            .map(|m| m.column().to_string())
            .collect();
        if self.feature_names != expected {
            return Err(LoadError::ModelSchema {
                path: path.to_path_buf(),
                expected,
                found: self.feature_names.clone(),
            });
        }

        if self.trees.is_empty() {
            return Err(LoadError::EmptyModel {
                path: path.to_path_buf(),
            });
        }

        let n_features = self.n_features();
        for (tree, root) in self.trees.iter().enumerate() {
            if let Some(feature_idx) = root.max_feature_idx() {
                if feature_idx >= n_features {
                    return Err(LoadError::FeatureIndex {
                        path: path.to_path_buf(),
                        tree,
                        feature_idx,
                        n_features,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(RegressionTreeNode::depth).max().unwrap_or(0)
    }

    /// Predict a single row of features laid out in `feature_names` order.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        if row.len() != self.n_features() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.n_features(),
                found: row.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(InferenceError::NonFinite(f64::NAN));
        }
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.predict(row)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}
