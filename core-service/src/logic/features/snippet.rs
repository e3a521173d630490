//! Snippet Features - structural signals from the offending HTML snippet
//!
//! Plain substring checks on the lower-cased snippet. No parsing, so
//! malformed markup can't make extraction fail.

use once_cell::sync::Lazy;
use regex::Regex;

use super::tag::TagVocabulary;
use super::vector::{FeatureExtractor, FeatureRow};
use crate::constants::UNKNOWN_TAG;

static ROOT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([a-zA-Z0-9]+)").expect("root tag pattern"));

/// Find the snippet's first tag name, or "unknown"
pub fn root_tag(snippet: &str) -> &str {
    ROOT_TAG
        .captures(snippet)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(UNKNOWN_TAG)
}

/// Snippet-level features
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetFeatures {
    pub root_tag: String,
    pub tag_index: usize,
    pub snippet_len: usize,
    pub word_count: usize,
    pub tag_count: usize,
    pub is_button_or_link: bool,
    pub is_img_or_svg: bool,
    pub has_alt_attr: bool,
    pub has_aria_label: bool,
    pub has_role_attr: bool,
    pub is_aria_related: bool,
}

impl SnippetFeatures {
    /// All inputs must already be lower-cased
    pub fn new(snippet: &str, context: &str, violation_name: &str, vocabulary: &TagVocabulary) -> Self {
        let tag = root_tag(snippet);

        Self {
            root_tag: tag.to_string(),
            tag_index: vocabulary.encode(tag),
            snippet_len: snippet.chars().count(),
            word_count: snippet.split_whitespace().count(),
            tag_count: snippet.matches('<').count(),
            is_button_or_link: snippet.contains("<a") || snippet.contains("<button"),
            is_img_or_svg: snippet.contains("<img") || snippet.contains("<svg"),
            has_alt_attr: snippet.contains("alt="),
            has_aria_label: snippet.contains("aria-label="),
            has_role_attr: snippet.contains("role="),
            is_aria_related: violation_name.contains("aria") || context.contains("aria"),
        }
    }
}

impl FeatureExtractor for SnippetFeatures {
    fn extract(&self, row: &mut FeatureRow) {
        row.set_count("tag_enc", self.tag_index);
        row.set_count("snippet_len", self.snippet_len);
        row.set_count("word_count", self.word_count);
        row.set_count("tag_count", self.tag_count);
        row.set_flag("is_button_or_link", self.is_button_or_link);
        row.set_flag("is_img_or_svg", self.is_img_or_svg);
        row.set_flag("has_alt_attr", self.has_alt_attr);
        row.set_flag("has_aria_label", self.has_aria_label);
        row.set_flag("has_role_attr", self.has_role_attr);
        row.set_flag("is_aria_related", self.is_aria_related);
    }
}
