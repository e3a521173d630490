//! Attribution Normalizer - one canonical vector from many raw shapes
//!
//! Attribution engines disagree on how to lay out multiclass output. The
//! layouts below are the ones recognised; anything else is rejected with the
//! observed dimensions rather than guessed at.

use ndarray::{ArrayD, Axis};
use thiserror::Error;

use super::types::{AttributionResult, ContributionMap, RawAttribution, RawExplanation};
use crate::logic::features::{FeatureLayout, LayoutMismatchError};

#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("attribution shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),
}

/// Recognised raw layouts, K = number of classes, F = number of features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeLayout {
    /// K matrices of shape (1, F)
    PerClassList,
    /// (1, F, K)
    SamplesFeaturesClasses,
    /// (1, K, F)
    SamplesClassesFeatures,
    /// (K, 1, F)
    ClassesSamplesFeatures,
}

impl ShapeLayout {
    /// Identify the layout. Dense tensors are matched on the class axis,
    /// last axis first.
    pub fn resolve(raw: &RawAttribution, num_classes: usize) -> Result<Self, AttributionError> {
        match raw {
            RawAttribution::PerClass(matrices) => {
                if matrices.len() != num_classes {
                    return Err(AttributionError::ShapeMismatch(format!(
                        "{} for {} classes",
                        raw.describe_shape(),
                        num_classes
                    )));
                }
                Ok(ShapeLayout::PerClassList)
            }
            RawAttribution::Dense(array) => match *array.shape() {
                [_, _, k] if k == num_classes => Ok(ShapeLayout::SamplesFeaturesClasses),
                [_, k, _] if k == num_classes => Ok(ShapeLayout::SamplesClassesFeatures),
                [k, _, _] if k == num_classes => Ok(ShapeLayout::ClassesSamplesFeatures),
                _ => Err(AttributionError::ShapeMismatch(format!(
                    "{} for {} classes",
                    raw.describe_shape(),
                    num_classes
                ))),
            },
        }
    }

    /// Pull the first sample's contributions for `class`
    pub fn select(self, raw: &RawAttribution, class: usize) -> Result<Vec<f64>, AttributionError> {
        let missing_sample =
            || AttributionError::ShapeMismatch(format!("{} has no sample row", raw.describe_shape()));

        match (self, raw) {
            (ShapeLayout::PerClassList, RawAttribution::PerClass(matrices)) => {
                let matrix = matrices.get(class).ok_or_else(|| {
                    AttributionError::ShapeMismatch(format!(
                        "class {} outside {}",
                        class,
                        raw.describe_shape()
                    ))
                })?;
                if matrix.nrows() == 0 {
                    return Err(missing_sample());
                }
                Ok(matrix.row(0).to_vec())
            }
            (ShapeLayout::SamplesFeaturesClasses, RawAttribution::Dense(array)) => {
                // [0, :, class]
                lane(array, (0, 0), (1, class)).ok_or_else(missing_sample)
            }
            (ShapeLayout::SamplesClassesFeatures, RawAttribution::Dense(array)) => {
                // [0, class, :]
                lane(array, (0, 0), (0, class)).ok_or_else(missing_sample)
            }
            (ShapeLayout::ClassesSamplesFeatures, RawAttribution::Dense(array)) => {
                // [class, 0, :]
                lane(array, (0, class), (0, 0)).ok_or_else(missing_sample)
            }
            (layout, _) => Err(AttributionError::ShapeMismatch(format!(
                "{:?} does not apply to {}",
                layout,
                raw.describe_shape()
            ))),
        }
    }
}

/// Fix two axes of a 3-D tensor and return the remaining 1-D lane.
///
/// Each `(axis, index)` pair is applied in turn, so the second axis number
/// refers to the already-reduced view.
fn lane(array: &ArrayD<f64>, first: (usize, usize), second: (usize, usize)) -> Option<Vec<f64>> {
    if array.ndim() != 3 || first.1 >= array.len_of(Axis(first.0)) {
        return None;
    }
    let view = array.index_axis(Axis(first.0), first.1);
    if second.1 >= view.len_of(Axis(second.0)) {
        return None;
    }
    Some(view.index_axis(Axis(second.0), second.1).iter().copied().collect())
}

/// One baseline for every class, or one per class
pub fn select_baseline(
    expected_value: &[f64],
    class: usize,
    num_classes: usize,
) -> Result<f64, AttributionError> {
    match expected_value.len() {
        1 => Ok(expected_value[0]),
        n if n == num_classes => Ok(expected_value[class]),
        n => Err(AttributionError::ShapeMismatch(format!(
            "expected value has {} entries for {} classes",
            n, num_classes
        ))),
    }
}

/// Normalize raw engine output into the predicted class's contributions
pub fn normalize(
    raw: &RawExplanation,
    class: usize,
    num_classes: usize,
    layout: &FeatureLayout,
) -> Result<AttributionResult, AttributionError> {
    if class >= num_classes {
        return Err(AttributionError::ShapeMismatch(format!(
            "class {} out of range for {} classes",
            class, num_classes
        )));
    }

    let shape = ShapeLayout::resolve(&raw.values, num_classes)?;
    let values = shape.select(&raw.values, class)?;
    if values.len() != layout.len() {
        return Err(AttributionError::ShapeMismatch(format!(
            "{} contributions for {} features ({:?} of {})",
            values.len(),
            layout.len(),
            shape,
            raw.values.describe_shape()
        )));
    }

    let baseline = select_baseline(&raw.expected_value, class, num_classes)?;

    let contributions: ContributionMap = layout
        .names()
        .iter()
        .cloned()
        .zip(values)
        .collect::<Vec<_>>()
        .into();

    Ok(AttributionResult {
        predicted_class_index: class,
        contributions,
        baseline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    const F: usize = 3;

    fn layout() -> FeatureLayout {
        FeatureLayout::new(vec!["a".into(), "b".into(), "c".into()]).unwrap()
    }

    /// Distinct value for every (class, feature)
    fn value(class: usize, feature: usize) -> f64 {
        (class * 10 + feature) as f64 + 0.5
    }

    fn explanation(values: RawAttribution, expected: Vec<f64>) -> RawExplanation {
        RawExplanation {
            values,
            expected_value: expected,
        }
    }

    #[test]
    fn test_samples_features_classes() {
        let k = 4;
        let array = Array3::from_shape_fn((1, F, k), |(_, f, c)| value(c, f)).into_dyn();
        let raw = explanation(RawAttribution::Dense(array), vec![0.1, 0.2, 0.3, 0.4]);

        let result = normalize(&raw, 2, k, &layout()).unwrap();
        assert_eq!(result.contributions.values(), vec![20.5, 21.5, 22.5]);
        assert_eq!(result.baseline, 0.3);
    }

    #[test]
    fn test_equivalent_layouts_normalize_identically() {
        let k = 4;
        let sfc = Array3::from_shape_fn((1, F, k), |(_, f, c)| value(c, f)).into_dyn();
        let csf = Array3::from_shape_fn((k, 1, F), |(c, _, f)| value(c, f)).into_dyn();
        let scf = Array3::from_shape_fn((1, k, F), |(_, c, f)| value(c, f)).into_dyn();
        let list: Vec<Array2<f64>> = (0..k)
            .map(|c| Array2::from_shape_fn((1, F), |(_, f)| value(c, f)))
            .collect();

        let expected = vec![0.5; 1];
        let results: Vec<_> = [
            RawAttribution::Dense(sfc),
            RawAttribution::Dense(csf),
            RawAttribution::Dense(scf),
            RawAttribution::PerClass(list),
        ]
        .into_iter()
        .map(|values| normalize(&explanation(values, expected.clone()), 1, k, &layout()).unwrap())
        .collect();

        for result in &results {
            assert_eq!(result.contributions, results[0].contributions);
            assert_eq!(result.baseline, 0.5);
        }
        assert_eq!(results[0].contributions.get("b"), Some(11.5));
    }

    #[test]
    fn test_per_class_list_returns_row_unmodified() {
        let list: Vec<Array2<f64>> = (0..3)
            .map(|c| Array2::from_shape_fn((1, F), |(_, f)| value(c, f) * -1.0))
            .collect();
        let raw = explanation(RawAttribution::PerClass(list), vec![1.0, 2.0, 3.0]);

        let result = normalize(&raw, 1, 3, &layout()).unwrap();
        assert_eq!(result.contributions.values(), vec![-10.5, -11.5, -12.5]);
        assert_eq!(result.baseline, 2.0);
        assert_eq!(result.predicted_class_index, 1);
    }

    #[test]
    fn test_unrecognised_shape_names_dimensions() {
        let array = ArrayD::<f64>::zeros(vec![2, 2, 5]);
        let raw = explanation(RawAttribution::Dense(array), vec![0.0]);

        match normalize(&raw, 0, 4, &layout()) {
            Err(AttributionError::ShapeMismatch(msg)) => assert!(msg.contains("[2, 2, 5]")),
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_non_3d_tensor_is_rejected() {
        let array = ArrayD::<f64>::zeros(vec![1, F]);
        let raw = explanation(RawAttribution::Dense(array), vec![0.0]);
        assert!(matches!(
            normalize(&raw, 0, 2, &layout()),
            Err(AttributionError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_baseline_size_must_be_one_or_k() {
        assert_eq!(select_baseline(&[0.7], 2, 4).unwrap(), 0.7);
        assert_eq!(select_baseline(&[0.1, 0.2, 0.3, 0.4], 3, 4).unwrap(), 0.4);
        assert!(select_baseline(&[0.1, 0.2], 1, 4).is_err());
        assert!(select_baseline(&[], 0, 4).is_err());
    }

    #[test]
    fn test_feature_count_must_match_layout() {
        let array = Array3::<f64>::zeros((1, F + 1, 2)).into_dyn();
        let raw = explanation(RawAttribution::Dense(array), vec![0.0]);
        assert!(matches!(
            normalize(&raw, 0, 2, &layout()),
            Err(AttributionError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_class_out_of_range() {
        let array = Array3::<f64>::zeros((1, F, 2)).into_dyn();
        let raw = explanation(RawAttribution::Dense(array), vec![0.0]);
        assert!(normalize(&raw, 2, 2, &layout()).is_err());
    }

    #[test]
    fn test_empty_sample_axis() {
        let list = vec![Array2::<f64>::zeros((0, F)), Array2::<f64>::zeros((0, F))];
        let raw = explanation(RawAttribution::PerClass(list), vec![0.0]);
        assert!(matches!(
            normalize(&raw, 0, 2, &layout()),
            Err(AttributionError::ShapeMismatch(_))
        ));

        let array = ArrayD::<f64>::zeros(vec![0, F, 2]);
        let raw = explanation(RawAttribution::Dense(array), vec![0.0]);
        assert!(normalize(&raw, 0, 2, &layout()).is_err());
    }

    #[test]
    fn test_list_length_must_match_classes() {
        let list = vec![Array2::<f64>::zeros((1, F)); 2];
        let raw = explanation(RawAttribution::PerClass(list), vec![0.0]);
        assert!(normalize(&raw, 0, 3, &layout()).is_err());
    }
}
