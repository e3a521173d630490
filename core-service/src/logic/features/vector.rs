//! Feature Vector - Core data structure for ML input
//!
//! Extractors write named values into a `FeatureRow`; the row is then
//! projected onto the model's `FeatureLayout` to produce a `FeatureVector`
//! stamped with that layout's hash.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::layout::{FeatureLayout, LayoutMismatchError};

// ============================================================================
// FEATURE ROW
// ============================================================================

/// Named feature values, before projection onto a model layout
#[derive(Debug, Clone, Default)]
pub struct FeatureRow {
    values: HashMap<&'static str, f32>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &'static str, value: f32) {
        self.values.insert(name, value);
    }

    pub fn set_flag(&mut self, name: &'static str, flag: bool) {
        self.set(name, if flag { 1.0 } else { 0.0 });
    }

    pub fn set_count(&mut self, name: &'static str, count: usize) {
        self.set(name, count as f32);
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Feature vector bound to the layout it was projected onto
///
/// Values are in the exact order of the layout's feature names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in layout order
    pub values: Vec<f32>,
}

impl FeatureVector {
    /// Create a zeroed vector for a layout
    pub fn zeros(layout: &FeatureLayout) -> Self {
        Self {
            layout_hash: layout.hash(),
            values: vec![0.0; layout.len()],
        }
    }

    /// Project a row onto a layout.
    ///
    /// Layout names missing from the row become 0.0; row entries the layout
    /// doesn't name are dropped.
    pub fn project(row: &FeatureRow, layout: &FeatureLayout) -> Self {
        let values = layout
            .names()
            .iter()
            .map(|name| row.get(name).unwrap_or(0.0))
            .collect();

        Self {
            layout_hash: layout.hash(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Get feature by name
    pub fn get_by_name(&self, layout: &FeatureLayout, name: &str) -> Option<f32> {
        layout.index_of(name).and_then(|i| self.get(i))
    }

    /// Validate that this vector matches a layout
    pub fn validate(&self, layout: &FeatureLayout) -> Result<(), LayoutMismatchError> {
        layout.validate(self.values.len(), self.layout_hash)
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self, layout: &FeatureLayout) -> serde_json::Value {
        serde_json::json!({
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": layout.names().iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.clone(), *value))
                .collect::<HashMap<_, _>>(),
        })
    }
}

// ============================================================================
// FEATURE EXTRACTOR TRAIT
// ============================================================================

/// Trait for feature extractors
pub trait FeatureExtractor {
    /// Extract features and write them into the row
    fn extract(&self, row: &mut FeatureRow);
}

// ============================================================================
// TESTS
// ============================================================================
