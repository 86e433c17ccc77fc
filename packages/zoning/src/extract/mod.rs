//! Quantitative table extraction.
//!
//! Turns raw policy HTML into per-criterion strings. The document's layout is
//! detected up front: heading-anchored tables are walked row by row, and the
//! flat-text scanners then fill whatever the walk left unresolved. Criteria
//! still missing after both passes receive tagged defaults.
//!
//! Extraction is a pure function of the HTML and the markers.

pub mod anchored;
pub mod scan;
pub mod units;

use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use anchored::{AnchorSection, MarkerSelectors, SectionEntry, TableMarkers, ANCHORS};
pub use units::normalize_to_metres;

use crate::types::CriterionStrings;
use anchored::DEFAULT_SELECTORS;

/// Extraction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractError {
    /// Anchor row, or the row after it, is missing
    #[error("anchor {anchor:?} not found: {detail}")]
    AnchorNotFound { anchor: String, detail: String },

    /// A configured table marker is not a valid CSS selector
    #[error("invalid table marker selector {selector:?}: {detail}")]
    InvalidSelector { selector: String, detail: String },
}

/// Layout of a policy document's assessment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStructure {
    /// Heading rows followed by render-cell narrative rows
    HeadingAnchored,
    /// No table markup; only visible text can be scanned
    FlatText,
}

/// Everything learned from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableExtraction {
    pub structure: TableStructure,
    /// Sections of the anchors that were found, in anchor order.
    pub sections: Vec<AnchorSection>,
    /// Anchors that could not be walked. Never fatal.
    pub anchor_failures: Vec<ExtractError>,
    pub criteria: CriterionStrings,
}

/// Which layout a parsed document uses.
pub fn detect_structure(document: &Html, selectors: &MarkerSelectors) -> TableStructure {
    if selectors.detect(document) {
        TableStructure::HeadingAnchored
    } else {
        TableStructure::FlatText
    }
}

/// Extract with the default table markers.
pub fn extract(html: &str) -> TableExtraction {
    extract_with_selectors(html, &DEFAULT_SELECTORS)
}

/// Extract with custom table markers.
pub fn extract_with(html: &str, markers: &TableMarkers) -> Result<TableExtraction, ExtractError> {
    let selectors = markers.compile()?;
    Ok(extract_with_selectors(html, &selectors))
}

/// Criterion strings only.
pub fn extract_criterion_strings(html: &str) -> CriterionStrings {
    extract(html).criteria
}

/// Extract with markers that were compiled once up front.
pub fn extract_with_selectors(html: &str, selectors: &MarkerSelectors) -> TableExtraction {
    let document = Html::parse_document(html);
    let structure = detect_structure(&document, selectors);
    let text = visible_text(&document);

    let mut sections = Vec::new();
    let mut anchor_failures = Vec::new();
    let mut criteria = CriterionStrings::new();

    if structure == TableStructure::HeadingAnchored {
        for anchor in ANCHORS {
            match anchored::walk_anchor(&document, anchor, selectors) {
                Ok(section) => sections.push(section),
                Err(e) => {
                    warn!(anchor = %anchor, error = %e, "Anchor walk failed, continuing");
                    anchor_failures.push(e);
                }
            }
        }
        anchored::criteria_from_sections(&sections, &mut criteria);
    }

    let from_table = criteria.len();
    scan::fill_from_text(&text, &mut criteria);
    let from_text = criteria.len() - from_table;
    scan::fill_defaults(&text, &mut criteria);

    debug!(
        structure = ?structure,
        sections = sections.len(),
        anchor_failures = anchor_failures.len(),
        from_table,
        from_text,
        defaults = criteria.len() - from_table - from_text,
        "Extracted criterion strings"
    );

    TableExtraction {
        structure,
        sections,
        anchor_failures,
        criteria,
    }
}

/// Visible text of a document: every text node outside `script`, `style`
/// and `noscript`, trimmed and joined with single spaces.
pub fn visible_text(document: &Html) -> String {
    let mut parts = Vec::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            matches!(
                ancestor.value(),
                Node::Element(e) if matches!(e.name(), "script" | "style" | "noscript")
            )
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Criterion, ValueSource};

    const ANCHORED: &str = r#"
        <html><body>
        <h2>Quantitative Assessment</h2>
        <table>
          <tr><th>Site coverage</th></tr>
          <tr><td role="RenderCell" data-phase="DTS"><h4>DTS/DPF 3.1</h4>Development does not result in site coverage exceeding 50%.</td></tr>
          <tr><th>Building Height</th></tr>
          <tr><td role="RenderCell" data-phase="DTS"><h4>DTS/DPF 4.1</h4>Maximum building height is 2 levels and 9m high.</td></tr>
          <tr><th>Land Use and Intensity</th></tr>
          <tr><td role="RenderCell" data-phase="DTS"><h4>DTS/DPF 1.1</h4>Detached dwelling</td></tr>
        </table>
        <p>Dwellings provide 2 car parking spaces.</p>
        <script>var coverage = "99% site coverage";</script>
        </body></html>
    "#;

    const FLAT: &str = r#"
        <div>
          <p>Buildings do not exceed 60% site coverage.</p>
          <p>Maximum building height is 2 levels</p>
          <p>Garages set back 5.5 m from the primary street.</p>
          <style>p { color: red; }</style>
        </div>
    "#;

    #[test]
    fn test_detects_anchored_layout() {
        let extraction = extract(ANCHORED);
        assert_eq!(extraction.structure, TableStructure::HeadingAnchored);
        assert_eq!(extraction.sections.len(), 3);
        assert_eq!(extraction.anchor_failures.len(), ANCHORS.len() - 3);
    }

    #[test]
    fn test_anchored_values_win_over_text_scan() {
        let criteria = extract(ANCHORED).criteria;
        assert_eq!(criteria.text(Criterion::SiteCoverage), Some("Max. 50%"));
        assert_eq!(criteria.text(Criterion::BuildingHeightLevels), Some("Max. 2 levels"));
        assert_eq!(criteria.text(Criterion::BuildingHeightMetres), Some("Max. 9m"));
        assert_eq!(criteria.text(Criterion::LandUse), Some("Detached dwelling"));
    }

    #[test]
    fn test_text_scan_fills_what_table_missed() {
        let criteria = extract(ANCHORED).criteria;
        let parking = criteria.get(Criterion::CarParkingSpaces).unwrap();
        assert_eq!(parking.text, "Min. 2 spaces");
        assert_eq!(parking.source, ValueSource::Extracted);
    }

    #[test]
    fn test_flat_text_layout() {
        let extraction = extract(FLAT);
        assert_eq!(extraction.structure, TableStructure::FlatText);
        assert!(extraction.sections.is_empty());
        assert!(extraction.anchor_failures.is_empty());

        let criteria = extraction.criteria;
        assert_eq!(criteria.text(Criterion::SiteCoverage), Some("Max. 60%"));
        assert_eq!(criteria.text(Criterion::PrimaryStreetSetback), Some("5.5m"));
    }

    #[test]
    fn test_defaults_are_tagged() {
        let criteria = extract(FLAT).criteria;
        let overlooking = criteria.get(Criterion::Overlooking).unwrap();
        assert_eq!(overlooking.text, "DTS 10.1");
        assert!(overlooking.is_default());
        // No dwellings mentioned.
        assert!(!criteria.contains(Criterion::LandUse));
    }

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let text = visible_text(&Html::parse_document(ANCHORED));
        assert!(!text.contains("99%"));
        assert!(text.contains("Quantitative Assessment"));

        let text = visible_text(&Html::parse_document(FLAT));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        assert_eq!(extract(ANCHORED), extract(ANCHORED));
        assert_eq!(extract(FLAT), extract(FLAT));
    }

    #[test]
    fn test_custom_markers() {
        let html = r#"
            <table>
              <tr><th>Site coverage</th></tr>
              <tr><td class="narrative"><h5>DTS 3.1</h5>Site coverage does not exceed 45%.</td></tr>
            </table>
        "#;
        let markers = TableMarkers {
            cell: "td.narrative".to_string(),
            subheading: "h5".to_string(),
            ..TableMarkers::default()
        };
        let extraction = extract_with(html, &markers).unwrap();
        assert_eq!(extraction.structure, TableStructure::HeadingAnchored);
        assert_eq!(extraction.criteria.text(Criterion::SiteCoverage), Some("Max. 45%"));

        // Default markers see no render cells here.
        assert_eq!(extract(html).structure, TableStructure::FlatText);
    }

    #[test]
    fn test_empty_document() {
        let extraction = extract("");
        assert_eq!(extraction.structure, TableStructure::FlatText);
        assert!(!extraction.criteria.contains(Criterion::SiteCoverage));
    }
}
