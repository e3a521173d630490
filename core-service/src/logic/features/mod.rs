//! Features Module - Feature Extraction Engine
//!
//! Snippet and context extractors write named values into a row; the row is
//! projected onto the model artifact's feature layout.

pub mod context;
pub mod extractor;
pub mod layout;
pub mod snippet;
pub mod tag;
pub mod vector;


// Re-export common types
pub use extractor::HtmlFeatureExtractor;
pub use layout::{FeatureLayout, LayoutMismatchError, EXTRACTED_FEATURES};
pub use tag::TagVocabulary;
pub use vector::{FeatureExtractor, FeatureRow, FeatureVector};
