use std::cmp::Ordering;

use super::normalizer::{normalize, AttributionError};
use super::tree_shap::AttributionEngine;
use super::types::{AttributionResult, Influence, RankedContribution};
use crate::logic::features::{FeatureLayout, FeatureVector};

/// Attribute a prediction and normalize the engine's output for `class`
pub fn explain(
    engine: &dyn AttributionEngine,
    vector: &FeatureVector,
    layout: &FeatureLayout,
    class: usize,
    num_classes: usize,
) -> Result<AttributionResult, AttributionError> {
    let raw = engine.explain(vector)?;
    let result = normalize(&raw, class, num_classes, layout)?;

    log::debug!(
        "Attribution for class {}: baseline {:.4}, sum {:.4}",
        class,
        result.baseline,
        result.contributions.sum()
    );

    Ok(result)
}

/// Top `top_n` contributions by magnitude. Ties keep layout order.
pub fn rank(result: &AttributionResult, top_n: usize) -> Vec<RankedContribution> {
    let mut ranked: Vec<RankedContribution> = result
        .contributions
        .iter()
        .map(|(name, contribution)| RankedContribution {
            feature: name.to_string(),
            contribution,
            influence: Influence::of(contribution),
            description: get_description(name).map(str::to_string),
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| {
        b.contribution
            .abs()
            .partial_cmp(&a.contribution.abs())
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(top_n);
    ranked
}

pub fn get_description(name: &str) -> Option<&'static str> {
    match name {
        "tag_enc" => Some("HTML tag type (encoded value representing different element types)"),
        "snippet_len" => Some("Total length of the HTML snippet in characters"),
        "word_count" => Some("Number of words/text content within the element"),
        "tag_count" => Some("Number of nested HTML tags within the element"),
        "is_button_or_link" => Some("Whether element is a button or link (interactive element)"),
        "is_img_or_svg" => Some("Whether element is an image or SVG graphic"),
        "has_alt_attr" => Some("Presence of alt attribute (for images)"),
        "has_aria_label" => Some("Presence of aria-label attribute"),
        "has_role_attr" => Some("Presence of role attribute"),
        "is_aria_related" => Some("Whether element uses ARIA attributes"),
        "contrast_ratio" => Some("Color contrast ratio between text and background"),
        "font_size" => Some("Font size in pixels"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::explain::types::ContributionMap;

    fn result(values: &[(&str, f64)]) -> AttributionResult {
        AttributionResult {
            predicted_class_index: 0,
            contributions: ContributionMap::from(
                values
                    .iter()
                    .map(|(n, v)| (n.to_string(), *v))
                    .collect::<Vec<_>>(),
            ),
            baseline: 0.0,
        }
    }

    #[test]
    fn test_rank_by_absolute_value() {
        let r = result(&[("a", 0.1), ("b", -0.9), ("c", 0.5), ("d", 0.0)]);
        let ranked = rank(&r, 10);
        let names: Vec<_> = ranked.iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let r = result(&[("x", 0.3), ("y", -0.3), ("z", 0.3), ("w", 0.1)]);
        let ranked = rank(&r, 3);
        let names: Vec<_> = ranked.iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_rank_truncates() {
        let values: Vec<(String, f64)> = (0..15).map(|i| (format!("f{}", i), i as f64)).collect();
        let r = AttributionResult {
            predicted_class_index: 0,
            contributions: ContributionMap::from(values),
            baseline: 0.0,
        };
        let ranked = rank(&r, 10);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].feature, "f14");
        assert_eq!(ranked[9].feature, "f5");
    }

    #[test]
    fn test_influence_and_description() {
        let r = result(&[("has_alt_attr", -0.4), ("tag_enc", 0.2), ("num_divs", 0.0)]);
        let ranked = rank(&r, 10);

        assert_eq!(ranked[0].influence, Influence::Away);
        assert_eq!(
            ranked[0].description.as_deref(),
            Some("Presence of alt attribute (for images)")
        );
        assert_eq!(ranked[1].influence, Influence::Toward);
        assert_eq!(ranked[2].influence, Influence::Neutral);
        assert_eq!(ranked[2].description, None);
    }
}
