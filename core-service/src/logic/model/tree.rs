//! Decision Tree - one regression tree of the boosted ensemble
//!
//! Traversal follows XGBoost: go left when `x[feature] < threshold`, right
//! otherwise; NaN takes the node's default direction.

use super::ensemble::EnsembleError;
use super::xgboost::XgbTree;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Split {
        feature: usize,
        threshold: f32,
        default_left: bool,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// Training cover (hessian sum) reaching this node
    pub cover: f64,
}

impl Node {
    pub fn split(feature: usize, threshold: f32, left: usize, right: usize, cover: f64) -> Self {
        Self {
            kind: NodeKind::Split {
                feature,
                threshold,
                default_left: true,
                left,
                right,
            },
            cover,
        }
    }

    pub fn leaf(value: f32, cover: f64) -> Self {
        Self {
            kind: NodeKind::Leaf { value },
            cover,
        }
    }

    pub fn leaf_value(&self) -> Option<f32> {
        match self.kind {
            NodeKind::Leaf { value } => Some(value),
            NodeKind::Split { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Build a tree, checking that node 0 is the root and every child index
    /// points forward into the node list (no cycles, no dangling children).
    pub fn new(nodes: Vec<Node>) -> Result<Self, EnsembleError> {
        if nodes.is_empty() {
            return Err(EnsembleError::InvalidTree("tree has no nodes".into()));
        }

        for (i, node) in nodes.iter().enumerate() {
            if let NodeKind::Split { left, right, .. } = node.kind {
                for child in [left, right] {
                    if child <= i || child >= nodes.len() {
                        return Err(EnsembleError::InvalidTree(format!(
                            "node {} has invalid child {}",
                            i, child
                        )));
                    }
                }
                if !(node.cover > 0.0) {
                    return Err(EnsembleError::InvalidTree(format!(
                        "split node {} has non-positive cover {}",
                        i, node.cover
                    )));
                }
            }
        }

        Ok(Self { nodes })
    }

    /// Convert an XGBoost JSON tree
    pub fn from_xgb(raw: &XgbTree) -> Result<Self, EnsembleError> {
        let n = raw.left_children.len();
        let lengths = [
            raw.right_children.len(),
            raw.split_indices.len(),
            raw.split_conditions.len(),
            raw.sum_hessian.len(),
        ];
        if lengths.iter().any(|&len| len != n)
            || (!raw.default_left.is_empty() && raw.default_left.len() != n)
        {
            return Err(EnsembleError::InvalidTree(
                "node arrays have different lengths".into(),
            ));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let cover = raw.sum_hessian[i] as f64;
            let (left, right) = (raw.left_children[i], raw.right_children[i]);

            let node = match (left, right) {
                (-1, -1) => Node::leaf(raw.split_conditions[i], cover),
                (l, r) if l >= 0 && r >= 0 => {
                    let feature = usize::try_from(raw.split_indices[i]).map_err(|_| {
                        EnsembleError::InvalidTree(format!("node {} has negative split index", i))
                    })?;
                    Node {
                        kind: NodeKind::Split {
                            feature,
                            threshold: raw.split_conditions[i],
                            default_left: raw.default_left.get(i).copied().unwrap_or(true),
                            left: l as usize,
                            right: r as usize,
                        },
                        cover,
                    }
                }
                _ => {
                    return Err(EnsembleError::InvalidTree(format!(
                        "node {} has exactly one child",
                        i
                    )))
                }
            };
            nodes.push(node);
        }

        Self::new(nodes)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    /// Highest feature index any split uses
    pub fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|n| match n.kind {
                NodeKind::Split { feature, .. } => Some(feature),
                NodeKind::Leaf { .. } => None,
            })
            .max()
    }

    /// Child the sample follows at a split node
    pub fn hot_child(kind: &NodeKind, x: &[f32]) -> Option<(usize, usize)> {
        match *kind {
            NodeKind::Split {
                feature,
                threshold,
                default_left,
                left,
                right,
            } => {
                let value = x.get(feature).copied().unwrap_or(f32::NAN);
                let go_left = if value.is_nan() {
                    default_left
                } else {
                    value < threshold
                };
                Some(if go_left { (left, right) } else { (right, left) })
            }
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Leaf value reached by a sample
    pub fn predict(&self, x: &[f32]) -> f32 {
        let mut index = 0;
        loop {
            let node = &self.nodes[index];
            match Self::hot_child(&node.kind, x) {
                Some((hot, _)) => index = hot,
                None => return node.leaf_value().unwrap_or(0.0),
            }
        }
    }

    /// Cover-weighted mean leaf value (the tree's output with no feature
    /// information).
    ///
    /// Walks from the root, so leaves XGBoost left behind after pruning
    /// never count.
    pub fn expected_value(&self) -> f64 {
        // children always come after their parent
        let mut values = vec![0.0f64; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate().rev() {
            values[i] = match node.kind {
                NodeKind::Leaf { value } => value as f64,
                NodeKind::Split { left, right, .. } => {
                    (self.nodes[left].cover * values[left] + self.nodes[right].cover * values[right])
                        / node.cover
                }
            };
        }
        values[0]
    }
}
