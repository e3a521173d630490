//! Context Features - signals from the supplementary information
//!
//! The supplementary string mixes serialized audit metadata (contrast ratio,
//! font size) with surrounding markup. Metadata comes out by pattern search,
//! markup is parsed with a tolerant HTML5 parser and counted.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

use super::vector::{FeatureExtractor, FeatureRow};

static CONTRAST_RATIO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"contrastratio':\s*([0-9.]+)").expect("contrast ratio pattern"));

static FONT_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"fontsize':\s*['"]([0-9.]+)"#).expect("font size pattern"));

/// First captured number, 0.0 when absent or unparsable
fn capture_number(pattern: &Regex, text: &str) -> f32 {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f32>().ok())
        .unwrap_or(0.0)
}

pub fn contrast_ratio(context: &str) -> f32 {
    capture_number(&CONTRAST_RATIO, context)
}

pub fn font_size(context: &str) -> f32 {
    capture_number(&FONT_SIZE, context)
}

// ============================================================================
// DOCUMENT COUNTS
// ============================================================================

/// Element counts over the parsed context markup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStats {
    pub num_elements: usize,
    pub num_links: usize,
    pub num_images: usize,
    pub num_buttons: usize,
    pub num_inputs: usize,
    pub num_lists: usize,
    pub num_headings: usize,
    pub num_divs: usize,
    pub num_spans: usize,
    pub has_form: bool,
    pub has_inline_style: bool,
    pub has_script_or_style: bool,
    pub avg_text_len_per_tag: f32,
}

impl DocumentStats {
    pub fn parse(markup: &str) -> Self {
        let fragment = Html::parse_fragment(markup);
        let mut stats = Self::default();
        let mut text_total = 0usize;

        // descendants() yields the synthesized <html> root first
        for element in fragment
            .root_element()
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
        {
            stats.num_elements += 1;
            text_total += text_len(element);

            match element.value().name() {
                "a" => stats.num_links += 1,
                "img" | "svg" => stats.num_images += 1,
                "button" => stats.num_buttons += 1,
                "input" => stats.num_inputs += 1,
                "ul" | "ol" | "li" => stats.num_lists += 1,
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => stats.num_headings += 1,
                "form" => stats.has_form = true,
                "div" => stats.num_divs += 1,
                "span" => stats.num_spans += 1,
                "script" | "style" => stats.has_script_or_style = true,
                _ => {}
            }

            if element.value().attr("style").is_some() {
                stats.has_inline_style = true;
            }
        }

        if stats.num_elements > 0 {
            stats.avg_text_len_per_tag = (text_total as f64 / stats.num_elements as f64) as f32;
        }

        stats
    }
}

/// Character length of an element's text.
///
/// Script/style content only counts toward the script/style element itself.
fn text_len(element: ElementRef<'_>) -> usize {
    element
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some((node, text)),
            _ => None,
        })
        .filter(|(node, _)| {
            node.parent()
                .and_then(ElementRef::wrap)
                .map(|parent| {
                    parent.id() == element.id()
                        || !matches!(parent.value().name(), "script" | "style")
                })
                .unwrap_or(true)
        })
        .map(|(_, text)| text.chars().count())
        .sum()
}

// ============================================================================
// CONTEXT FEATURES
// ============================================================================

/// Context-level features
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextFeatures {
    pub contrast_ratio: f32,
    pub font_size: f32,
    pub document: DocumentStats,
}

impl ContextFeatures {
    /// `context` must already be lower-cased
    pub fn new(context: &str) -> Self {
        Self {
            contrast_ratio: contrast_ratio(context),
            font_size: font_size(context),
            document: DocumentStats::parse(context),
        }
    }
}

impl FeatureExtractor for ContextFeatures {
    fn extract(&self, row: &mut FeatureRow) {
        let doc = &self.document;

        row.set("contrast_ratio", self.contrast_ratio);
        row.set("font_size", self.font_size);
        row.set_count("num_links", doc.num_links);
        row.set_count("num_images", doc.num_images);
        row.set_count("num_buttons", doc.num_buttons);
        row.set_count("num_inputs", doc.num_inputs);
        row.set_count("num_lists", doc.num_lists);
        row.set_count("num_headings", doc.num_headings);
        row.set_flag("has_form", doc.has_form);
        row.set_count("num_divs", doc.num_divs);
        row.set_count("num_spans", doc.num_spans);
        row.set("avg_text_len_per_tag", doc.avg_text_len_per_tag);
        row.set_flag("has_inline_style", doc.has_inline_style);
        row.set_flag("has_script_or_style", doc.has_script_or_style);
    }
}
