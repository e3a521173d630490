//! Tree SHAP - exact path-dependent attributions for the tree ensemble
//!
//! Polynomial-time Shapley values over decision paths (Lundberg et al.,
//! "Consistent Individualized Feature Attribution for Tree Ensembles").
//! Node covers stand in for the training distribution, so
//! `expected_value[k] + Σ phi[.., k]` equals the raw margin of class k.

use std::sync::Arc;

use ndarray::Array3;

use super::normalizer::AttributionError;
use super::types::{RawAttribution, RawExplanation};
use crate::logic::features::{FeatureLayout, FeatureVector};
use crate::logic::model::tree::{NodeKind, Tree};
use crate::logic::model::TreeEnsemble;

/// Anything that can attribute a prediction to the input features
pub trait AttributionEngine: Send + Sync {
    fn explain(&self, vector: &FeatureVector) -> Result<RawExplanation, AttributionError>;
}

pub struct TreeShapExplainer {
    ensemble: Arc<TreeEnsemble>,
    layout: FeatureLayout,
    expected_value: Vec<f64>,
}

impl TreeShapExplainer {
    pub fn new(ensemble: Arc<TreeEnsemble>, layout: FeatureLayout) -> Self {
        let mut expected_value = ensemble.base_scores().to_vec();
        for (tree, class) in ensemble.trees() {
            expected_value[class] += tree.expected_value();
        }

        Self {
            ensemble,
            layout,
            expected_value,
        }
    }

    pub fn expected_value(&self) -> &[f64] {
        &self.expected_value
    }

    /// Per-feature, per-class contributions for one sample, shape (F, K)
    fn shap_values(&self, x: &[f32]) -> Vec<Vec<f64>> {
        let num_classes = self.ensemble.num_classes();
        let mut phi = vec![vec![0.0; num_classes]; x.len()];
        let mut tree_phi = vec![0.0; x.len()];

        for (tree, class) in self.ensemble.trees() {
            tree_phi.fill(0.0);
            let walk = PathWalk {
                tree,
                x,
                phi: &mut tree_phi,
            };
            walk.run();
            for (feature, value) in tree_phi.iter().enumerate() {
                phi[feature][class] += value;
            }
        }
        phi
    }
}

impl AttributionEngine for TreeShapExplainer {
    fn explain(&self, vector: &FeatureVector) -> Result<RawExplanation, AttributionError> {
        vector.validate(&self.layout)?;

        let phi = self.shap_values(vector.as_slice());
        let num_features = phi.len();
        let num_classes = self.ensemble.num_classes();
        let values = Array3::from_shape_fn((1, num_features, num_classes), |(_, f, k)| phi[f][k]);

        Ok(RawExplanation {
            values: RawAttribution::Dense(values.into_dyn()),
            expected_value: self.expected_value.clone(),
        })
    }
}

// ============================================================================
// PATH BOOKKEEPING
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct PathElement {
    /// None for the root placeholder
    feature: Option<usize>,
    /// Fraction of cover flowing down this path when the feature is unknown
    zero_fraction: f64,
    /// 1.0 if the sample follows this path when the feature is known
    one_fraction: f64,
    /// Permutation weight
    pweight: f64,
}

fn extend_path(path: &mut [PathElement], depth: usize, zero: f64, one: f64, feature: Option<usize>) {
    path[depth] = PathElement {
        feature,
        zero_fraction: zero,
        one_fraction: one,
        pweight: if depth == 0 { 1.0 } else { 0.0 },
    };
    let d = depth as f64;
    for i in (0..depth).rev() {
        let fi = i as f64;
        path[i + 1].pweight += one * path[i].pweight * (fi + 1.0) / (d + 1.0);
        path[i].pweight = zero * path[i].pweight * (d - fi) / (d + 1.0);
    }
}

fn unwind_path(path: &mut [PathElement], depth: usize, index: usize) {
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let d = depth as f64;
    let mut next_one_portion = path[depth].pweight;

    for i in (0..depth).rev() {
        let fi = i as f64;
        if one != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight = next_one_portion * (d + 1.0) / ((fi + 1.0) * one);
            next_one_portion = tmp - path[i].pweight * zero * (d - fi) / (d + 1.0);
        } else if zero != 0.0 {
            path[i].pweight = path[i].pweight * (d + 1.0) / (zero * (d - fi));
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
}

/// Total permutation weight the path would have with element `index` removed
fn unwound_path_sum(path: &[PathElement], depth: usize, index: usize) -> f64 {
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let d = depth as f64;
    let mut next_one_portion = path[depth].pweight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        let fi = i as f64;
        if one != 0.0 {
            let tmp = next_one_portion * (d + 1.0) / ((fi + 1.0) * one);
            total += tmp;
            next_one_portion = path[i].pweight - tmp * zero * (d - fi) / (d + 1.0);
        } else if zero != 0.0 {
            total += (path[i].pweight / zero) / ((d - fi) / (d + 1.0));
        }
    }
    total
}

/// One sample's recursive walk of one tree
struct PathWalk<'a> {
    tree: &'a Tree,
    x: &'a [f32],
    phi: &'a mut [f64],
}

impl PathWalk<'_> {
    fn run(mut self) {
        self.recurse(0, &[], 0, 1.0, 1.0, None);
    }

    fn recurse(
        &mut self,
        node_index: usize,
        parent_path: &[PathElement],
        depth: usize,
        parent_zero: f64,
        parent_one: f64,
        parent_feature: Option<usize>,
    ) {
        let mut path = Vec::with_capacity(depth + 1);
        path.extend_from_slice(&parent_path[..depth]);
        path.push(PathElement::default());
        extend_path(&mut path, depth, parent_zero, parent_one, parent_feature);

        let tree = self.tree;
        let node = tree.node(node_index);
        let feature = match node.kind {
            NodeKind::Leaf { value } => {
                for i in 1..=depth {
                    let w = unwound_path_sum(&path, depth, i);
                    let element = path[i];
                    let Some(f) = element.feature else { continue };
                    if let Some(slot) = self.phi.get_mut(f) {
                        *slot += w * (element.one_fraction - element.zero_fraction) * value as f64;
                    }
                }
                return;
            }
            NodeKind::Split { feature, .. } => feature,
        };

        let Some((hot, cold)) = Tree::hot_child(&node.kind, self.x) else {
            return;
        };
        let hot_zero = tree.node(hot).cover / node.cover;
        let cold_zero = tree.node(cold).cover / node.cover;

        // A feature already on the path is unwound and re-added at this split
        let mut depth = depth;
        let (mut incoming_zero, mut incoming_one) = (1.0, 1.0);
        if let Some(index) = (1..=depth).find(|&i| path[i].feature == Some(feature)) {
            incoming_zero = path[index].zero_fraction;
            incoming_one = path[index].one_fraction;
            unwind_path(&mut path, depth, index);
            depth -= 1;
        }

        self.recurse(hot, &path, depth + 1, hot_zero * incoming_zero, incoming_one, Some(feature));
        self.recurse(cold, &path, depth + 1, cold_zero * incoming_zero, 0.0, Some(feature));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::tree::Node;

    fn layout(n: usize) -> FeatureLayout {
        FeatureLayout::new((0..n).map(|i| format!("f{}", i)).collect()).unwrap()
    }

    fn vector(layout: &FeatureLayout, values: &[f32]) -> FeatureVector {
        let mut v = FeatureVector::zeros(layout);
        v.values.copy_from_slice(values);
        v
    }

    /// Three features, two classes. Class 0 re-splits on f0 below the root.
    fn ensemble() -> Arc<TreeEnsemble> {
        let class0 = Tree::new(vec![
            Node::split(0, 0.5, 1, 2, 10.0),
            Node::split(1, 1.0, 3, 4, 6.0),
            Node::split(0, 2.0, 5, 6, 4.0),
            Node::leaf(-1.0, 4.0),
            Node::leaf(0.5, 2.0),
            Node::leaf(1.5, 3.0),
            Node::leaf(3.0, 1.0),
        ])
        .unwrap();
        let class1 = Tree::new(vec![
            Node::split(2, 0.0, 1, 2, 8.0),
            Node::leaf(0.75, 5.0),
            Node::split(1, 3.0, 3, 4, 3.0),
            Node::leaf(-2.0, 1.0),
            Node::leaf(0.25, 2.0),
        ])
        .unwrap();
        let bias = Tree::new(vec![Node::leaf(0.125, 8.0)]).unwrap();

        Arc::new(
            TreeEnsemble::new(vec![class0, class1, bias], vec![0, 1, 1], vec![0.5, 0.5], 3)
                .unwrap(),
        )
    }

    fn contributions(raw: &RawExplanation, f: usize, k: usize) -> f64 {
        match &raw.values {
            RawAttribution::Dense(a) => a[[0, f, k]],
            RawAttribution::PerClass(_) => panic!("expected dense output"),
        }
    }

    #[test]
    fn test_single_split_attribution() {
        let tree = Tree::new(vec![
            Node::split(0, 0.5, 1, 2, 2.0),
            Node::leaf(-1.0, 1.0),
            Node::leaf(1.0, 1.0),
        ])
        .unwrap();
        let leaf = Tree::new(vec![Node::leaf(0.0, 1.0)]).unwrap();
        let ensemble =
            Arc::new(TreeEnsemble::new(vec![tree, leaf], vec![0, 1], vec![0.0, 0.0], 1).unwrap());
        let l = layout(1);
        let explainer = TreeShapExplainer::new(ensemble, l.clone());

        let raw = explainer.explain(&vector(&l, &[0.0])).unwrap();
        assert!((contributions(&raw, 0, 0) + 1.0).abs() < 1e-12);
        assert_eq!(contributions(&raw, 0, 1), 0.0);
        assert_eq!(raw.expected_value, vec![0.0, 0.0]);
    }

    #[test]
    fn test_output_shape_is_samples_features_classes() {
        let l = layout(3);
        let explainer = TreeShapExplainer::new(ensemble(), l.clone());
        let raw = explainer.explain(&vector(&l, &[1.0, 0.0, 1.0])).unwrap();

        match raw.values {
            RawAttribution::Dense(a) => assert_eq!(a.shape(), &[1, 3, 2]),
            RawAttribution::PerClass(_) => panic!("expected dense output"),
        }
        assert_eq!(raw.expected_value.len(), 2);
    }

    #[test]
    fn test_contributions_add_up_to_margin() {
        let e = ensemble();
        let l = layout(3);
        let explainer = TreeShapExplainer::new(e.clone(), l.clone());

        let samples: [[f32; 3]; 5] = [
            [0.0, 0.0, -1.0],
            [1.0, 2.0, 1.0],
            [3.0, 0.5, 0.5],
            [0.2, 5.0, 4.0],
            [f32::NAN, f32::NAN, f32::NAN],
        ];

        for x in samples {
            let raw = explainer.explain(&vector(&l, &x)).unwrap();
            let margins = e.margins(&x);
            for k in 0..2 {
                let total: f64 = (0..3).map(|f| contributions(&raw, f, k)).sum();
                let reconstructed = raw.expected_value[k] + total;
                assert!(
                    (reconstructed - margins[k]).abs() < 1e-9,
                    "class {}: {} vs {}",
                    k,
                    reconstructed,
                    margins[k]
                );
            }
        }
    }

    #[test]
    fn test_unused_feature_gets_nothing() {
        let l = layout(3);
        let explainer = TreeShapExplainer::new(ensemble(), l.clone());
        let raw = explainer.explain(&vector(&l, &[1.0, 2.0, 1.0])).unwrap();

        // f2 only appears in the class-1 tree
        assert_eq!(contributions(&raw, 2, 0), 0.0);
        // f0 only appears in the class-0 tree
        assert_eq!(contributions(&raw, 0, 1), 0.0);
    }

    #[test]
    fn test_expected_value_includes_base_score() {
        let explainer = TreeShapExplainer::new(ensemble(), layout(3));
        let class0 = 0.5 + (-1.0 * 4.0 + 0.5 * 2.0 + 1.5 * 3.0 + 3.0 * 1.0) / 10.0;
        let class1 = 0.5 + (0.75 * 5.0 - 2.0 + 0.25 * 2.0) / 8.0 + 0.125;
        assert!((explainer.expected_value()[0] - class0).abs() < 1e-12);
        assert!((explainer.expected_value()[1] - class1).abs() < 1e-12);
    }

    #[test]
    fn test_unreachable_leaves_keep_additivity() {
        let pruned = Tree::new(vec![
            Node::split(0, 0.5, 1, 2, 2.0),
            Node::leaf(-1.0, 1.0),
            Node::leaf(1.0, 1.0),
            Node::leaf(5.0, 3.0),
            Node::leaf(-3.0, 4.0),
        ])
        .unwrap();
        let leaf = Tree::new(vec![Node::leaf(0.0, 1.0)]).unwrap();
        let e = Arc::new(TreeEnsemble::new(vec![pruned, leaf], vec![0, 1], vec![0.0, 0.0], 1).unwrap());
        let l = layout(1);
        let explainer = TreeShapExplainer::new(e.clone(), l.clone());

        for x in [[0.0f32], [1.0]] {
            let raw = explainer.explain(&vector(&l, &x)).unwrap();
            let margin = e.margins(&x)[0];
            let reconstructed = raw.expected_value[0] + contributions(&raw, 0, 0);
            assert!((reconstructed - margin).abs() < 1e-12, "{} vs {}", reconstructed, margin);
        }
        assert!(explainer.expected_value()[0].abs() < 1e-12);
    }

    #[test]
    fn test_rejects_foreign_vector() {
        let explainer = TreeShapExplainer::new(ensemble(), layout(3));
        let other = layout(2);
        let result = explainer.explain(&FeatureVector::zeros(&other));
        assert!(matches!(result, Err(AttributionError::LayoutMismatch(_))));
    }
}
