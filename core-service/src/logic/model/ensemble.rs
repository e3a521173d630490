//! Tree Ensemble - multiclass gradient-boosted trees
//!
//! One group of trees per class. Raw margin of class k is the class base
//! score plus the leaf values of every tree in group k; probabilities are
//! the softmax of the margins.

use thiserror::Error;

use super::tree::Tree;
use super::xgboost::{parse_base_score, parse_count, XgbModelDocument};

/// Objectives whose output is a per-class softmax
const SUPPORTED_OBJECTIVES: [&str; 2] = ["multi:softprob", "multi:softmax"];

#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    #[error("unsupported booster '{0}' (expected gbtree)")]
    UnsupportedBooster(String),

    #[error("unsupported objective '{0}'")]
    UnsupportedObjective(String),

    #[error("invalid model parameter {name}: '{value}'")]
    InvalidParameter { name: &'static str, value: String },

    #[error("ensemble declares {declared} classes, expected {expected}")]
    ClassCountMismatch { declared: usize, expected: usize },

    #[error("ensemble declares {declared} features, expected {expected}")]
    FeatureCountMismatch { declared: usize, expected: usize },

    #[error("tree {tree}: {reason}")]
    InvalidStructure { tree: usize, reason: String },
}

#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    /// Class (output group) of each tree
    tree_class: Vec<usize>,
    /// Per-class base margin
    base_scores: Vec<f64>,
    num_features: usize,
}

impl TreeEnsemble {
    /// Assemble an ensemble from parts, checking class and feature ranges
    pub fn new(
        trees: Vec<Tree>,
        tree_class: Vec<usize>,
        base_scores: Vec<f64>,
        num_features: usize,
    ) -> Result<Self, EnsembleError> {
        let num_classes = base_scores.len();
        if num_classes < 2 {
            return Err(EnsembleError::ClassCountMismatch {
                declared: num_classes,
                expected: 2,
            });
        }

        if trees.len() != tree_class.len() {
            return Err(EnsembleError::InvalidStructure {
                tree: trees.len().min(tree_class.len()),
                reason: format!(
                    "{} trees but {} class assignments",
                    trees.len(),
                    tree_class.len()
                ),
            });
        }

        for (i, (tree, &class)) in trees.iter().zip(tree_class.iter()).enumerate() {
            if class >= num_classes {
                return Err(EnsembleError::InvalidStructure {
                    tree: i,
                    reason: format!("class {} out of range (K = {})", class, num_classes),
                });
            }
            if let Some(feature) = tree.max_feature() {
                if feature >= num_features {
                    return Err(EnsembleError::InvalidStructure {
                        tree: i,
                        reason: format!(
                            "split feature {} out of range (F = {})",
                            feature, num_features
                        ),
                    });
                }
            }
        }

        Ok(Self {
            trees,
            tree_class,
            base_scores,
            num_features,
        })
    }

    /// Rebuild from an XGBoost JSON document.
    ///
    /// `expected_features` / `expected_classes` come from the artifact and
    /// must agree with what the document declares.
    pub fn from_document(
        doc: &XgbModelDocument,
        expected_features: usize,
        expected_classes: usize,
    ) -> Result<Self, EnsembleError> {
        let learner = &doc.learner;

        if learner.gradient_booster.name != "gbtree" {
            return Err(EnsembleError::UnsupportedBooster(
                learner.gradient_booster.name.clone(),
            ));
        }
        if !SUPPORTED_OBJECTIVES.contains(&learner.objective.name.as_str()) {
            return Err(EnsembleError::UnsupportedObjective(
                learner.objective.name.clone(),
            ));
        }

        let params = &learner.learner_model_param;
        let num_class = parse_count(&params.num_class).ok_or_else(|| {
            EnsembleError::InvalidParameter {
                name: "num_class",
                value: params.num_class.clone(),
            }
        })?;
        if num_class != expected_classes {
            return Err(EnsembleError::ClassCountMismatch {
                declared: num_class,
                expected: expected_classes,
            });
        }

        let num_feature = parse_count(&params.num_feature).ok_or_else(|| {
            EnsembleError::InvalidParameter {
                name: "num_feature",
                value: params.num_feature.clone(),
            }
        })?;
        if num_feature != expected_features {
            return Err(EnsembleError::FeatureCountMismatch {
                declared: num_feature,
                expected: expected_features,
            });
        }

        let base_scores = match parse_base_score(&params.base_score) {
            Some(scores) if scores.len() == 1 => vec![scores[0]; num_class],
            Some(scores) if scores.len() == num_class => scores,
            _ => {
                return Err(EnsembleError::InvalidParameter {
                    name: "base_score",
                    value: params.base_score.clone(),
                })
            }
        };

        let model = &learner.gradient_booster.model;
        let trees = model
            .trees
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                Tree::from_xgb(raw).map_err(|e| EnsembleError::InvalidStructure {
                    tree: i,
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(trees, model.tree_info.clone(), base_scores, num_feature)
    }

    pub fn num_classes(&self) -> usize {
        self.base_scores.len()
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn base_scores(&self) -> &[f64] {
        &self.base_scores
    }

    /// Trees with their class assignment
    pub fn trees(&self) -> impl Iterator<Item = (&Tree, usize)> {
        self.trees.iter().zip(self.tree_class.iter().copied())
    }

    /// Raw per-class margins
    pub fn margins(&self, x: &[f32]) -> Vec<f64> {
        let mut margins = self.base_scores.clone();
        for (tree, class) in self.trees() {
            margins[class] += tree.predict(x) as f64;
        }
        margins
    }

    /// Softmax class probabilities
    pub fn predict_proba(&self, x: &[f32]) -> Vec<f64> {
        softmax(&self.margins(x))
    }
}

/// Numerically stable softmax
pub fn softmax(margins: &[f64]) -> Vec<f64> {
    let max = margins.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = margins.iter().map(|m| (m - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; ties go to the lowest index
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
