use std::sync::Arc;

use ndarray::ArrayD;

use super::{LoadedModel, ModelHandle, ModelSource, PredictionService, ServiceError, ViolationInput};
use crate::logic::artifact::fixtures::{sample_artifact, SAMPLE_ARTIFACT_JSON};
use crate::logic::artifact::sha256_hex;
use crate::logic::explain::{
    AttributionEngine, AttributionError, Influence, RawAttribution, RawExplanation,
    TreeShapExplainer,
};
use crate::logic::features::{FeatureLayout, FeatureVector};
use crate::logic::model::InferenceEngine;

fn input(snippet: &str, context: &str, violation: &str) -> ViolationInput {
    ViolationInput {
        affected_html_elements: snippet.to_string(),
        supplementary_information: context.to_string(),
        violation_name: violation.to_string(),
    }
}

fn missing_alt() -> ViolationInput {
    input(
        r#"<img src="logo.png">"#,
        r#"<div><img src="logo.png"></div>"#,
        "image-alt",
    )
}

fn loaded_service() -> PredictionService {
    let handle = Arc::new(ModelHandle::new());
    handle.activate(LoadedModel::from_artifact(sample_artifact(), None).unwrap());
    PredictionService::with_handle(handle)
}

fn model_with_explainer(explainer: Arc<dyn AttributionEngine>) -> LoadedModel {
    let a = sample_artifact();
    let inference = InferenceEngine::new(Arc::new(a.ensemble), a.layout, a.class_scores).unwrap();
    LoadedModel::new(a.vocabulary, inference, explainer, ModelSource::default())
}

fn write_sample(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Returns a layout no normalizer accepts
struct WrongShapeEngine;

impl AttributionEngine for WrongShapeEngine {
    fn explain(&self, _vector: &FeatureVector) -> Result<RawExplanation, AttributionError> {
        Ok(RawExplanation {
            values: RawAttribution::Dense(ArrayD::zeros(vec![2, 2, 24])),
            expected_value: vec![0.0],
        })
    }
}

#[test]
fn test_unavailable_without_model() {
    let service = PredictionService::with_handle(Arc::new(ModelHandle::new()));

    assert!(matches!(service.score(&missing_alt()), Err(ServiceError::Unavailable)));
    assert!(matches!(
        service.score_with_explanation(&missing_alt()),
        Err(ServiceError::Unavailable)
    ));
    assert_eq!(ServiceError::Unavailable.kind(), "unavailable");
}

#[test]
fn test_missing_alt_scores_critical() {
    let service = loaded_service();
    let result = service.score(&missing_alt()).unwrap();

    assert_eq!(result.predicted_class_index, 3);
    assert_eq!(result.severity_score, 5);
    let total: f64 = result.all_class_probabilities.values().sum();
    assert!((total - 1.0).abs() < 1e-6);
    assert_eq!(
        result.all_class_probabilities.keys().copied().collect::<Vec<_>>(),
        vec![2, 3, 4, 5]
    );
}

#[test]
fn test_labelled_button_scores_minor() {
    let service = loaded_service();
    let result = service
        .score(&input(r#"<button aria-label="close">x</button>"#, "", "button-name"))
        .unwrap();
    assert_eq!(result.severity_score, 2);
}

#[test]
fn test_low_contrast_scores_moderate() {
    let service = loaded_service();
    let result = service
        .score(&input("<p>text</p>", "{'contrastratio': 2.5}", "color-contrast"))
        .unwrap();
    assert_eq!(result.severity_score, 3);
}

#[test]
fn test_explanation_adds_up_to_margin() {
    let service = loaded_service();
    let explained = service.score_with_explanation(&missing_alt()).unwrap();

    let class = explained.prediction.predicted_class_index;
    assert_eq!(explained.attribution.predicted_class_index, class);
    assert_eq!(explained.attribution.contributions.len(), 24);

    let margin = explained.prediction.margins[class];
    assert!((explained.attribution.reconstructed_margin() - margin).abs() < 1e-6);
}

#[test]
fn test_top_features_ranked() {
    let service = loaded_service();
    let explained = service.score_with_explanation(&missing_alt()).unwrap();
    let top = &explained.top_features;

    assert_eq!(top.len(), 10);
    for pair in top.windows(2) {
        assert!(pair[0].contribution.abs() >= pair[1].contribution.abs());
    }

    // The image split drives the critical class
    let image = top.iter().find(|c| c.feature == "is_img_or_svg").unwrap();
    assert_eq!(image.influence, Influence::Toward);
    assert!(image.description.is_some());
}

#[test]
fn test_shape_mismatch_from_engine() {
    let handle = Arc::new(ModelHandle::new());
    handle.activate(model_with_explainer(Arc::new(WrongShapeEngine)));
    let service = PredictionService::with_handle(handle);

    // Score-only mode never touches the attribution engine
    assert!(service.score(&missing_alt()).is_ok());

    match service.score_with_explanation(&missing_alt()) {
        Err(e @ ServiceError::ShapeMismatch(_)) => {
            assert!(e.to_string().contains("[2, 2, 24]"));
            assert_eq!(e.kind(), "shape_mismatch");
        }
        other => panic!("Expected ShapeMismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_configuration_mismatch_from_engine() {
    let artifact = sample_artifact();
    let mut names = artifact.layout.names().to_vec();
    names.reverse();
    let foreign = FeatureLayout::new(names).unwrap();
    let explainer = TreeShapExplainer::new(Arc::new(artifact.ensemble), foreign);

    let handle = Arc::new(ModelHandle::new());
    handle.activate(model_with_explainer(Arc::new(explainer)));
    let service = PredictionService::with_handle(handle);

    let result = service.score_with_explanation(&missing_alt());
    assert!(matches!(result, Err(ServiceError::ConfigurationMismatch(_))));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir, "model_artifacts.json", SAMPLE_ARTIFACT_JSON);
    let digest = sha256_hex(SAMPLE_ARTIFACT_JSON.as_bytes());

    let handle = ModelHandle::new();
    handle.load_from(&path, Some(&digest)).unwrap();

    let status = handle.status();
    assert!(status.model_loaded);
    assert!(status.explainer_ready);
    assert_eq!(status.feature_count, 24);
    assert_eq!(status.class_count, 4);
    assert_eq!(status.tree_count, 5);
    assert_eq!(status.artifact_sha256, Some(digest));
    assert!(status.last_error.is_none());
}

#[test]
fn test_failed_reload_keeps_previous_model() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_sample(&dir, "good.json", SAMPLE_ARTIFACT_JSON);
    let bad = write_sample(&dir, "bad.json", "{\"feature_names\": []}");

    let handle = ModelHandle::new();
    let first = handle.load_from(&good, None).unwrap();

    assert!(handle.load_from(&bad, None).is_err());
    assert!(handle.load_from(&dir.path().join("missing.json"), None).is_err());
    assert!(handle.load_from(&good, Some("deadbeef")).is_err());

    let current = handle.snapshot().unwrap();
    assert!(Arc::ptr_eq(&first, &current));

    let status = handle.status();
    assert!(status.model_loaded);
    assert!(status.last_error.unwrap().contains("digest"));
}

#[test]
fn test_failed_initial_load_leaves_no_model() {
    let dir = tempfile::tempdir().unwrap();
    let handle = ModelHandle::new();

    let result = handle.load_from(&dir.path().join("missing.json"), None);
    assert!(matches!(result, Err(ServiceError::ArtifactLoad(_))));
    assert!(!handle.is_loaded());
    assert!(handle.status().last_error.is_some());
}

#[test]
fn test_reload_swaps_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir, "model.json", SAMPLE_ARTIFACT_JSON);

    let handle = ModelHandle::new();
    let first = handle.load_from(&path, None).unwrap();
    let second = handle.load_from(&path, None).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    // Requests holding the old snapshot can still finish with it
    assert_eq!(first.num_classes(), 4);
}

#[test]
fn test_inference_stats() {
    let service = loaded_service();
    service.score(&missing_alt()).unwrap();
    service.score_with_explanation(&missing_alt()).unwrap();

    assert_eq!(service.handle().status().inference_count, 2);
}

#[test]
fn test_concurrent_requests_agree() {
    let service = loaded_service();
    let expected = service.score(&missing_alt()).unwrap().all_class_probabilities;

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..20 {
                    let result = service.score(&missing_alt()).unwrap();
                    assert_eq!(result.all_class_probabilities, expected);
                }
            });
        }
    });

    assert_eq!(service.handle().status().inference_count, 161);
}
