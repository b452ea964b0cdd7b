//! Block extractor — turns a free-text model response into recommendation records.
//!
//! The model is asked for a fixed layout (`TREE 1:` followed by `Name:`,
//! `Benefit:` and `Suitable:` lines) but nothing guarantees it complies, so
//! extraction degrades in two steps instead of failing:
//!
//! 1. blocks without a `Name:` line are kept positionally under a placeholder name;
//! 2. if no block survives, the raw lines of the whole response become records.

use std::borrow::Cow;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound on records synthesized by the whole-text fallback.
pub const WHOLE_TEXT_FALLBACK_CAP: usize = 6;

const NAME_LABEL: &str = "name:";
const BENEFIT_LABEL: &str = "benefit:";
const SUITABLE_LABEL: &str = "suitable:";

const DEFAULT_BENEFIT: &str = "Provides environmental benefits";
const DEFAULT_SUITABILITY: &str = "Suitable for current climate conditions";
const WHOLE_TEXT_SUITABILITY: &str = "Suitable for your current climate conditions";

/// A single structured recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationBlock {
    pub name: String,
    pub benefit: String,
    pub suitability: String,
}

/// Fields collected from one candidate block before fallback is applied.
#[derive(Debug, Default)]
struct PartialBlock {
    name: Option<String>,
    benefit: Option<String>,
    suitability: Option<String>,
}

/// Splits text on numbered section markers (`<MARKER> <n>:`) and reads labelled fields.
#[derive(Debug, Clone)]
pub struct BlockExtractor {
    marker: String,
    marker_re: Regex,
    item_label: String,
}

impl BlockExtractor {
    /// Builds an extractor for `<marker> <digits>:` section headers, matched case-insensitively.
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        let marker_re = Regex::new(&format!(r"(?i){} \d+:", regex::escape(marker)))?;
        Ok(Self {
            marker: marker.to_string(),
            marker_re,
            item_label: "Item".to_string(),
        })
    }

    /// Sets the noun used for synthesized names ("Tree 3", "Recommended Tree 1").
    pub fn with_item_label(mut self, label: &str) -> Self {
        self.item_label = label.to_string();
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Extracts recommendation records from `text`. Never fails; the result may be empty.
    pub fn extract(&self, text: &str) -> Vec<RecommendationBlock> {
        let blocks: Vec<RecommendationBlock> = self
            .marker_re
            .split(text)
            .filter(|fragment| !fragment.trim().is_empty())
            .enumerate()
            .filter_map(|(index, fragment)| self.parse_block(index, fragment))
            .filter(|block| !block.name.trim().is_empty())
            .collect();

        if !blocks.is_empty() {
            debug!("Extracted {} sectioned recommendation(s)", blocks.len());
            return blocks;
        }

        let fallback = self.whole_text_fallback(text);
        debug!(
            "No sectioned recommendations found, whole-text fallback produced {}",
            fallback.len()
        );
        fallback
    }

    /// Like [`extract`](Self::extract) but accepts arbitrary bytes, replacing invalid UTF-8.
    pub fn extract_lossy(&self, bytes: &[u8]) -> Vec<RecommendationBlock> {
        let text: Cow<'_, str> = String::from_utf8_lossy(bytes);
        self.extract(&text)
    }

    fn parse_block(&self, index: usize, fragment: &str) -> Option<RecommendationBlock> {
        let lines: Vec<&str> = fragment
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut partial = PartialBlock::default();
        for line in &lines {
            if let Some(value) = strip_label(line, NAME_LABEL) {
                partial.name = Some(value.to_string());
            } else if let Some(value) = strip_label(line, BENEFIT_LABEL) {
                partial.benefit = Some(value.to_string());
            } else if let Some(value) = strip_label(line, SUITABLE_LABEL) {
                partial.suitability = Some(value.to_string());
            }
        }

        match partial.name {
            Some(name) => Some(RecommendationBlock {
                name,
                benefit: partial.benefit.unwrap_or_default(),
                suitability: partial.suitability.unwrap_or_default(),
            }),
            None if !lines.is_empty() => Some(RecommendationBlock {
                name: format!("{} {}", self.item_label, index + 1),
                // Raw lines, label prefixes included.
                benefit: lines.first().copied().unwrap_or(DEFAULT_BENEFIT).to_string(),
                suitability: lines.get(1).copied().unwrap_or(DEFAULT_SUITABILITY).to_string(),
            }),
            None => None,
        }
    }

    fn whole_text_fallback(&self, text: &str) -> Vec<RecommendationBlock> {
        text.lines()
            .filter(|line| !line.trim().is_empty() && !line.contains(self.marker.as_str()))
            .take(WHOLE_TEXT_FALLBACK_CAP)
            .enumerate()
            .map(|(index, line)| RecommendationBlock {
                name: format!("Recommended {} {}", self.item_label, index + 1),
                benefit: line.trim().to_string(),
                suitability: WHOLE_TEXT_SUITABILITY.to_string(),
            })
            .collect()
    }
}

/// Returns the trimmed remainder of `line` if it starts with `label` (ASCII case-insensitive).
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        Some(line[label.len()..].trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_extractor() -> BlockExtractor {
        BlockExtractor::new("TREE").unwrap()
    }

    fn block(name: &str, benefit: &str, suitability: &str) -> RecommendationBlock {
        RecommendationBlock {
            name: name.to_string(),
            benefit: benefit.to_string(),
            suitability: suitability.to_string(),
        }
    }

    const WELL_FORMED: &str = "TREE 1:
Name: Neem
Benefit: Air purification
Suitable: Hot dry climates

TREE 2:
Name: Banyan
Benefit: Large canopy shade
Suitable: Tropical heat

TREE 3:
Name: Peepal
Benefit: Releases oxygen
Suitable: Tolerates drought";

    #[test]
    fn test_worked_example_mixes_labelled_and_positional_blocks() {
        let text = "TREE 1:
Name: Neem
Benefit: Air purification
Suitable: Hot dry climates

TREE 2:
Benefit: Shade
Suitable: Humid regions
";
        let result = tree_extractor().extract(text);
        assert_eq!(
            result,
            vec![
                block("Neem", "Air purification", "Hot dry climates"),
                block("Item 2", "Benefit: Shade", "Suitable: Humid regions"),
            ]
        );
    }

    #[test]
    fn test_preserves_block_order() {
        let names: Vec<String> = tree_extractor()
            .extract(WELL_FORMED)
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Neem", "Banyan", "Peepal"]);
    }

    #[test]
    fn test_fields_matched_by_label_not_position() {
        let text = "TREE 1:\nSuitable: Coastal winds\nName: Casuarina\nBenefit: Erosion control";
        let result = tree_extractor().extract(text);
        assert_eq!(
            result,
            vec![block("Casuarina", "Erosion control", "Coastal winds")]
        );
    }

    #[test]
    fn test_labels_and_markers_are_case_insensitive() {
        let text = "tree 1:\nNAME:   Teak  \nbenefit: Timber\nSUITABLE: Monsoon";
        let result = tree_extractor().extract(text);
        assert_eq!(result, vec![block("Teak", "Timber", "Monsoon")]);
    }

    #[test]
    fn test_markers_matched_mid_line() {
        let text = "Here you go: TREE 1: Name: Oak\nBenefit: Habitat\nTREE 2:\nName: Pine";
        let result = tree_extractor().extract(text);
        // The preamble is its own candidate block and falls back positionally.
        assert_eq!(result.len(), 3);
        assert_eq!(result[0], block("Item 1", "Here you go:", DEFAULT_SUITABILITY));
        assert_eq!(result[1], block("Oak", "Habitat", ""));
        assert_eq!(result[2], block("Pine", "", ""));
    }

    #[test]
    fn test_unrecognized_lines_are_ignored() {
        let text = "TREE 1:\nName: Mango\nHeight: 30m\nBenefit: Fruit\nNotes: sweet";
        let result = tree_extractor().extract(text);
        assert_eq!(result, vec![block("Mango", "Fruit", "")]);
    }

    #[test]
    fn test_positional_fallback_with_single_line_uses_default_suitability() {
        let text = "TREE 1:\nName: Neem\nTREE 2:\nA hardy shade tree";
        let result = tree_extractor().extract(text);
        assert_eq!(result[1], block("Item 2", "A hardy shade tree", DEFAULT_SUITABILITY));
    }

    #[test]
    fn test_positional_fallback_uses_item_label() {
        let extractor = tree_extractor().with_item_label("Tree");
        let result = extractor.extract("TREE 1:\nGood for shade\nGrows fast");
        assert_eq!(result, vec![block("Tree 1", "Good for shade", "Grows fast")]);
    }

    #[test]
    fn test_blank_name_block_is_dropped() {
        let text = "TREE 1:\nName:   \nBenefit: Shade\nTREE 2:\nName: Jamun\nBenefit: Fruit";
        let result = tree_extractor().extract(text);
        assert_eq!(result, vec![block("Jamun", "Fruit", "")]);
    }

    #[test]
    fn test_whole_text_fallback_when_every_block_has_blank_name() {
        let text = "TREE 1:\nName:\nTREE 2:\nName: \t";
        let result = tree_extractor().extract(text);
        // Marker lines are skipped, "Name:" lines are not.
        assert_eq!(
            result,
            vec![
                block("Recommended Item 1", "Name:", WHOLE_TEXT_SUITABILITY),
                block("Recommended Item 2", "Name:", WHOLE_TEXT_SUITABILITY),
            ]
        );
    }

    #[test]
    fn test_text_without_markers_becomes_one_positional_block() {
        // Without markers the whole text is a single candidate block.
        let text = "Neem is great\nBanyan gives shade\nPeepal purifies air";
        let result = tree_extractor().extract(text);
        assert_eq!(
            result,
            vec![block("Item 1", "Neem is great", "Banyan gives shade")]
        );
    }

    #[test]
    fn test_whole_text_fallback_caps_at_six_lines() {
        let extractor = tree_extractor().with_item_label("Tree");
        let text = (1..=9)
            .map(|i| format!("Line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let result = extractor.whole_text_fallback(&text);
        assert_eq!(result.len(), WHOLE_TEXT_FALLBACK_CAP);
        assert_eq!(result[0].name, "Recommended Tree 1");
        assert_eq!(result[5].benefit, "Line 6");
        assert!(result
            .iter()
            .all(|b| b.suitability == WHOLE_TEXT_SUITABILITY));
    }

    #[test]
    fn test_whole_text_fallback_skips_blank_and_marker_lines() {
        let text = "\n  \nTREE list below\n  Neem  \nBanyan\n";
        let result = tree_extractor().whole_text_fallback(text);
        assert_eq!(
            result,
            vec![
                block("Recommended Item 1", "Neem", WHOLE_TEXT_SUITABILITY),
                block("Recommended Item 2", "Banyan", WHOLE_TEXT_SUITABILITY),
            ]
        );
    }

    #[test]
    fn test_empty_and_whitespace_input_yield_empty() {
        let extractor = tree_extractor();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("   \n\t\n ").is_empty());
        assert!(extractor.extract("TREE 1:\nTREE 2:\n").is_empty());
    }

    #[test]
    fn test_lossy_bytes_never_panic() {
        let extractor = tree_extractor();
        let noise: Vec<u8> = (0..=255u8).cycle().take(2048).collect();
        let _ = extractor.extract_lossy(&noise);

        let result = extractor.extract_lossy(b"TREE 1:\nName: Ash\xFF\nBenefit: Windbreak");
        assert_eq!(result.len(), 1);
        assert!(result[0].name.starts_with("Ash"));
        assert_eq!(result[0].benefit, "Windbreak");
    }

    #[test]
    fn test_multibyte_lines_shorter_than_label() {
        // Slicing must respect char boundaries.
        let result = tree_extractor().extract("TREE 1:\nñé\n🌳🌳");
        assert_eq!(result, vec![block("Item 1", "ñé", "🌳🌳")]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "TREE 1:\r\nName: Neem\r\nBenefit: Shade\r\nSuitable: Heat\r\n";
        let result = tree_extractor().extract(text);
        assert_eq!(result, vec![block("Neem", "Shade", "Heat")]);
    }

    #[test]
    fn test_custom_marker_is_escaped() {
        let extractor = BlockExtractor::new("SECTION.").unwrap();
        let result = extractor.extract("SECTION. 1:\nName: Alder\nSECTIONX 2:\nName: Birch");
        // "SECTIONX 2:" is not a marker, so the second Name line overwrites the first.
        assert_eq!(result, vec![block("Birch", "", "")]);
        assert_eq!(extractor.marker(), "SECTION.");
    }

    #[test]
    fn test_later_label_overwrites_earlier() {
        let text = "TREE 1:\nName: First\nName: Second";
        assert_eq!(tree_extractor().extract(text)[0].name, "Second");
    }

    #[test]
    fn test_more_blocks_than_requested_are_kept() {
        let text = (1..=8)
            .map(|i| format!("TREE {i}:\nName: Tree number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(tree_extractor().extract(&text).len(), 8);
    }
}
