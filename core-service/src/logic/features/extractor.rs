//! HTML Feature Extractor - snippet + context → model feature vector
//!
//! Total over all inputs: malformed or empty HTML degrades to default values,
//! never to an error.

use super::context::ContextFeatures;
use super::layout::FeatureLayout;
use super::snippet::SnippetFeatures;
use super::tag::TagVocabulary;
use super::vector::{FeatureExtractor, FeatureRow, FeatureVector};

/// Lower-cased request text, shared by all extractors
#[derive(Debug, Clone)]
pub struct NormalizedText {
    pub snippet: String,
    pub context: String,
    pub violation_name: String,
}

impl NormalizedText {
    pub fn new(snippet: &str, context: &str, violation_name: &str) -> Self {
        Self {
            snippet: snippet.to_lowercase(),
            context: context.to_lowercase(),
            violation_name: violation_name.to_lowercase(),
        }
    }
}

/// Extractor bound to one model's layout and tag vocabulary
#[derive(Debug, Clone, Copy)]
pub struct HtmlFeatureExtractor<'a> {
    layout: &'a FeatureLayout,
    vocabulary: &'a TagVocabulary,
}

impl<'a> HtmlFeatureExtractor<'a> {
    pub fn new(layout: &'a FeatureLayout, vocabulary: &'a TagVocabulary) -> Self {
        Self { layout, vocabulary }
    }

    /// Compute every extractor feature by name
    pub fn extract_row(&self, snippet: &str, context: &str, violation_name: &str) -> FeatureRow {
        let text = NormalizedText::new(snippet, context, violation_name);

        let snippet = SnippetFeatures::new(
            &text.snippet,
            &text.context,
            &text.violation_name,
            self.vocabulary,
        );
        let context = ContextFeatures::new(&text.context);
        let extractors: [&dyn FeatureExtractor; 2] = [&snippet, &context];

        let mut row = FeatureRow::new();
        for extractor in extractors {
            extractor.extract(&mut row);
        }
        row
    }

    /// Extract and project onto the model layout
    pub fn extract(&self, snippet: &str, context: &str, violation_name: &str) -> FeatureVector {
        let row = self.extract_row(snippet, context, violation_name);
        FeatureVector::project(&row, self.layout)
    }
}
