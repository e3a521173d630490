//! Tag Vocabulary - label encoding for the snippet's root tag

use std::collections::HashMap;

use crate::constants::UNKNOWN_TAG;

/// Ordered tag vocabulary from the model artifact
#[derive(Debug, Clone)]
pub struct TagVocabulary {
    tags: Vec<String>,
    index: HashMap<String, usize>,
    unknown_index: usize,
}

impl TagVocabulary {
    /// Build a vocabulary. Returns the first duplicated tag on failure.
    pub fn new(tags: Vec<String>) -> Result<Self, String> {
        let mut index = HashMap::with_capacity(tags.len());
        for (i, tag) in tags.iter().enumerate() {
            if index.insert(tag.clone(), i).is_some() {
                return Err(tag.clone());
            }
        }

        // Fallback when the vocabulary has no reserved entry
        let unknown_index = index.get(UNKNOWN_TAG).copied().unwrap_or(0);

        Ok(Self {
            tags,
            index,
            unknown_index,
        })
    }

    /// Encode a tag; unseen tags map to the "unknown" entry
    pub fn encode(&self, tag: &str) -> usize {
        self.index.get(tag).copied().unwrap_or(self.unknown_index)
    }

    pub fn unknown_index(&self) -> usize {
        self.unknown_index
    }

    pub fn has_unknown(&self) -> bool {
        self.index.contains_key(UNKNOWN_TAG)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
