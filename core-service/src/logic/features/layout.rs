//! Feature Layout - Centralized Feature Definition
//!
//! Two layouts meet here:
//! - `EXTRACTED_FEATURES`: what the extractor knows how to compute (code-owned)
//! - `FeatureLayout`: what the loaded model expects (artifact-owned)
//!
//! The model's layout is authoritative. Every vector handed to the model is
//! projected onto it and stamped with its CRC32 fingerprint, so a vector built
//! for one artifact can never be silently scored by another.

use std::collections::HashMap;

use crc32fast::Hasher;
use thiserror::Error;

// ============================================================================
// EXTRACTOR LAYOUT
// ============================================================================

/// Features computed by the extractor, in the order the training pipeline
/// emitted them
pub const EXTRACTED_FEATURES: &[&str] = &[
    // === Snippet (0-9) ===
    "tag_enc",               // 0: Root tag index in the tag vocabulary
    "snippet_len",           // 1: Characters in the snippet
    "word_count",            // 2: Whitespace-separated tokens
    "tag_count",             // 3: Count of '<' (coarse tag count)
    "is_button_or_link",     // 4: Contains <a or <button
    "is_img_or_svg",         // 5: Contains <img or <svg
    "has_alt_attr",          // 6: Contains alt=
    "has_aria_label",        // 7: Contains aria-label=
    "has_role_attr",         // 8: Contains role=
    "is_aria_related",       // 9: Violation name or context mentions aria

    // === Context signals (10-11) ===
    "contrast_ratio",        // 10: contrastratio': <value>
    "font_size",             // 11: fontsize': '<value>

    // === Context document (12-23) ===
    "num_links",             // 12: <a> elements
    "num_images",            // 13: <img>/<svg> elements
    "num_buttons",           // 14: <button> elements
    "num_inputs",            // 15: <input> elements
    "num_lists",             // 16: <ul>/<ol>/<li> elements
    "num_headings",          // 17: <h1>..<h6> elements
    "has_form",              // 18: Any <form>
    "num_divs",              // 19: <div> elements
    "num_spans",             // 20: <span> elements
    "avg_text_len_per_tag",  // 21: Mean text length per element
    "has_inline_style",      // 22: Any element with a style attribute
    "has_script_or_style",   // 23: Any <script>/<style>
];

/// Number of features the extractor computes
pub const EXTRACTED_FEATURE_COUNT: usize = 24;

/// Check whether the extractor computes a feature
pub fn is_extracted(name: &str) -> bool {
    EXTRACTED_FEATURES.contains(&name)
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of an ordered feature name list
pub fn compute_layout_hash<S: AsRef<str>>(names: &[S]) -> u32 {
    let mut hasher = Hasher::new();

    for name in names {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// MODEL LAYOUT
// ============================================================================

/// Ordered feature names the loaded model was trained on
#[derive(Debug, Clone)]
pub struct FeatureLayout {
    names: Vec<String>,
    index: HashMap<String, usize>,
    hash: u32,
}

impl FeatureLayout {
    /// Build a layout from the artifact's feature names.
    ///
    /// Returns the first duplicated name on failure.
    pub fn new(names: Vec<String>) -> Result<Self, String> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(name.clone());
            }
        }

        let hash = compute_layout_hash(names.as_slice());
        Ok(Self { names, index, hash })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Get feature index by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Get feature name by index
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Model features the extractor never produces (always zero)
    pub fn unextracted(&self) -> Vec<&str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|n| !is_extracted(n))
            .collect()
    }

    /// Validate that a vector was produced for this layout
    pub fn validate(&self, len: usize, hash: u32) -> Result<(), LayoutMismatchError> {
        if len != self.len() || hash != self.hash {
            return Err(LayoutMismatchError {
                expected_len: self.len(),
                expected_hash: self.hash,
                actual_len: len,
                actual_hash: hash,
            });
        }
        Ok(())
    }

}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a vector's layout doesn't match the model's
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Feature layout mismatch: expected {expected_len} features (hash: {expected_hash:08x}), \
     got {actual_len} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_len: usize,
    pub expected_hash: u32,
    pub actual_len: usize,
    pub actual_hash: u32,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(names: &[&str]) -> FeatureLayout {
        FeatureLayout::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_extracted_feature_count() {
        assert_eq!(EXTRACTED_FEATURES.len(), EXTRACTED_FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        let hash1 = compute_layout_hash(EXTRACTED_FEATURES);
        let hash2 = compute_layout_hash(EXTRACTED_FEATURES);
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, 0);
    }

    #[test]
    fn test_layout_hash_is_order_sensitive() {
        let a = layout(&["tag_enc", "snippet_len"]);
        let b = layout(&["snippet_len", "tag_enc"]);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_separator_prevents_concatenation_collisions() {
        assert_ne!(
            compute_layout_hash(&["ab", "c"][..]),
            compute_layout_hash(&["a", "bc"][..])
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = FeatureLayout::new(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(result.unwrap_err(), "a");
    }

    #[test]
    fn test_index_lookup() {
        let l = layout(&["tag_enc", "snippet_len", "font_size"]);
        assert_eq!(l.index_of("font_size"), Some(2));
        assert_eq!(l.index_of("nonexistent"), None);
        assert_eq!(l.name(0), Some("tag_enc"));
        assert_eq!(l.name(3), None);
    }

    #[test]
    fn test_validate_layout() {
        let l = layout(&["tag_enc", "snippet_len"]);
        assert!(l.validate(2, l.hash()).is_ok());

        let err = l.validate(3, l.hash()).unwrap_err();
        assert_eq!(err.expected_len, 2);
        assert_eq!(err.actual_len, 3);

        assert!(l.validate(2, !l.hash()).is_err());
    }

    #[test]
    fn test_unextracted_features() {
        let l = layout(&["tag_enc", "page_depth"]);
        assert_eq!(l.unextracted(), vec!["page_depth"]);
    }

}
