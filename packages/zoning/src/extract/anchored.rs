//! Heading-anchored table walk.
//!
//! Quantitative assessment tables put each criterion's heading in one row and
//! its rendered narrative in the row that follows. Narrative cells carry a
//! render-cell marker and, optionally, a sub-heading element naming the rule.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use super::scan;
use super::units::{explicit_metres, format_number, percent};
use super::ExtractError;
use crate::types::{Criterion, CriterionStrings, CriterionValue};

/// Heading labels that open a section of the assessment table.
pub const ANCHORS: &[&str] = &[
    "Site coverage",
    "Building Height",
    "Primary Street Setback",
    "Secondary Street Setback",
    "Appearance",
    "Ancillary buildings and structures",
    "Land Use and Intensity",
];

/// Sub-heading keywords (lowercase) of qualitative rules, checked in order.
const SUBHEADING_KEYWORDS: &[(&str, Criterion)] = &[
    ("boundary wall", Criterion::BoundaryWalls),
    ("overlooking", Criterion::Overlooking),
    ("earthworks", Criterion::CutAndFill),
    ("cut and fill", Criterion::CutAndFill),
    ("tree planting", Criterion::TreePlanting),
    ("street tree", Criterion::StreetTrees),
    ("streetscape", Criterion::Streetscape),
    ("garage setback", Criterion::GarageSetback),
    ("garage", Criterion::GarageOpening),
    ("crossover", Criterion::DrivewayCrossover),
    ("private open space", Criterion::PrivateOpenSpace),
    ("landscaping", Criterion::SoftLandscaping),
];

/// CSS selectors describing the anchored table layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMarkers {
    /// Table rows.
    pub row: String,
    /// Narrative cells inside the row after an anchor.
    pub cell: String,
    /// Sub-heading element inside a narrative cell.
    pub subheading: String,
}

impl Default for TableMarkers {
    fn default() -> Self {
        Self {
            row: "tr".to_string(),
            cell: r#"td[role="RenderCell"][data-phase]"#.to_string(),
            subheading: "h4".to_string(),
        }
    }
}

impl TableMarkers {
    pub fn compile(&self) -> Result<MarkerSelectors, ExtractError> {
        Ok(MarkerSelectors {
            row: parse_selector(&self.row)?,
            cell: parse_selector(&self.cell)?,
            subheading: parse_selector(&self.subheading)?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        detail: e.to_string(),
    })
}

/// Compiled [`TableMarkers`].
#[derive(Debug, Clone)]
pub struct MarkerSelectors {
    row: Selector,
    cell: Selector,
    subheading: Selector,
}

pub(crate) static DEFAULT_SELECTORS: LazyLock<MarkerSelectors> = LazyLock::new(|| {
    TableMarkers::default()
        .compile()
        .expect("default table markers are valid selectors")
});

impl MarkerSelectors {
    /// True when the document uses the anchored layout at all.
    pub fn detect(&self, document: &Html) -> bool {
        document.select(&self.cell).next().is_some()
    }
}

/// One sub-heading and its narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub heading: String,
    pub text: String,
}

/// Narratives found under one anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSection {
    pub anchor: String,
    pub entries: Vec<SectionEntry>,
}

impl AnchorSection {
    /// Narratives joined into one string for scanning. Sub-headings are
    /// clause labels and never contribute values.
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// First length with an explicit `mm`/`m` unit in any narrative.
    fn explicit_length(&self) -> Option<String> {
        self.entries
            .iter()
            .find_map(|e| explicit_metres(&e.text))
            .map(|m| format!("{}m", format_number(m)))
    }
}

/// Collapse runs of whitespace and trim.
pub(crate) fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: &ElementRef) -> String {
    clean(&element.text().collect::<Vec<_>>().join(" "))
}

/// Find the row holding `anchor`, step to the next row and read its
/// sub-headed narrative cells.
pub fn walk_anchor(
    document: &Html,
    anchor: &str,
    selectors: &MarkerSelectors,
) -> Result<AnchorSection, ExtractError> {
    let needle = anchor.to_lowercase();
    let contains_anchor = |row: &ElementRef| element_text(row).to_lowercase().contains(&needle);

    // Innermost matching row, so a layout table wrapping the assessment
    // table does not shadow the real heading row.
    let anchor_row = document
        .select(&selectors.row)
        .find(|row| {
            contains_anchor(row)
                && !row
                    .select(&selectors.row)
                    .any(|inner| inner.id() != row.id() && contains_anchor(&inner))
        })
        .ok_or_else(|| ExtractError::AnchorNotFound {
            anchor: anchor.to_string(),
            detail: "no row contains the anchor text".to_string(),
        })?;

    let next_row = anchor_row
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| selectors.row.matches(sibling))
        .ok_or_else(|| ExtractError::AnchorNotFound {
            anchor: anchor.to_string(),
            detail: "anchor row has no following row".to_string(),
        })?;

    let entries = next_row
        .select(&selectors.cell)
        .filter_map(|cell| {
            let heading = element_text(&cell.select(&selectors.subheading).next()?);
            let text = element_text(&cell).replacen(&heading, "", 1);
            Some(SectionEntry {
                heading,
                text: text.trim().to_string(),
            })
        })
        .collect();

    Ok(AnchorSection {
        anchor: anchor.to_string(),
        entries,
    })
}

/// Map anchored sections onto criteria.
///
/// Numeric anchors are scanned with section-scoped patterns; everything else
/// is matched by sub-heading keyword and kept as narrative text.
pub fn criteria_from_sections(sections: &[AnchorSection], strings: &mut CriterionStrings) {
    for section in sections {
        let text = section.text();
        match section.anchor.as_str() {
            "Site coverage" => {
                let value = scan::site_coverage(&text)
                    .or_else(|| percent(&text).map(|n| format!("Max. {}%", format_number(n))));
                fill_extracted(strings, Criterion::SiteCoverage, value);
            }
            "Building Height" => {
                let height = scan::building_height(&text);
                fill_extracted(strings, Criterion::BuildingHeightLevels, height.levels_text());
                fill_extracted(strings, Criterion::BuildingHeightMetres, height.metres_text());
                fill_extracted(strings, Criterion::WallHeight, scan::wall_height(&text));
            }
            // A narrative without an explicit length stays unresolved and is
            // left to the flat-text scan.
            "Primary Street Setback" => {
                fill_extracted(strings, Criterion::PrimaryStreetSetback, section.explicit_length());
            }
            "Secondary Street Setback" => {
                fill_extracted(strings, Criterion::SecondaryStreetSetback, section.explicit_length());
            }
            "Land Use and Intensity" => {
                let value = section.entries.first().map(|e| e.text.clone());
                fill_extracted(strings, Criterion::LandUse, value);
            }
            _ => {}
        }

        for entry in &section.entries {
            let heading = entry.heading.to_lowercase();
            if heading.contains("parking") {
                fill_extracted(strings, Criterion::CarParkingSpaces, scan::car_parking(&entry.text));
                continue;
            }
            let keyword = SUBHEADING_KEYWORDS
                .iter()
                .find(|(keyword, _)| heading.contains(keyword));
            if let Some((_, criterion)) = keyword {
                if !entry.text.is_empty() {
                    strings.fill(*criterion, CriterionValue::extracted(entry.text.clone()));
                }
            }
        }
    }
}

fn fill_extracted(strings: &mut CriterionStrings, criterion: Criterion, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        strings.fill(criterion, CriterionValue::extracted(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
        <table>
          <tr><th>Site coverage</th></tr>
          <tr>
            <td role="RenderCell" data-phase="DTS"><h4>DTS/DPF 3.1</h4>Development does not result in site coverage exceeding 60%.</td>
            <td role="RenderCell" data-phase="PO">No sub-heading here</td>
          </tr>
          <tr><th>Appearance</th></tr>
          <tr>
            <td role="RenderCell" data-phase="DTS"><h4>Garage appearance</h4>Garage openings do not exceed 7m in width.</td>
            <td role="RenderCell" data-phase="DTS"><h4>Overlooking</h4>Upper level windows have sill heights of 1.5m.</td>
          </tr>
          <tr><th>Secondary Street Setback</th></tr>
        </table>
    "#;

    #[test]
    fn test_walk_anchor_reads_subheaded_cells() {
        let document = Html::parse_document(TABLE);
        let section = walk_anchor(&document, "Site coverage", &DEFAULT_SELECTORS).unwrap();
        assert_eq!(section.entries.len(), 1);
        assert_eq!(section.entries[0].heading, "DTS/DPF 3.1");
        assert_eq!(
            section.entries[0].text,
            "Development does not result in site coverage exceeding 60%."
        );
    }

    #[test]
    fn test_missing_anchor_row() {
        let document = Html::parse_document(TABLE);
        let err = walk_anchor(&document, "Building Height", &DEFAULT_SELECTORS).unwrap_err();
        assert!(matches!(err, ExtractError::AnchorNotFound { ref anchor, .. } if anchor == "Building Height"));
    }

    #[test]
    fn test_anchor_without_following_row() {
        let document = Html::parse_document(TABLE);
        let err =
            walk_anchor(&document, "Secondary Street Setback", &DEFAULT_SELECTORS).unwrap_err();
        match err {
            ExtractError::AnchorNotFound { detail, .. } => {
                assert_eq!(detail, "anchor row has no following row")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sections_map_to_criteria() {
        let document = Html::parse_document(TABLE);
        let sections: Vec<AnchorSection> = ["Site coverage", "Appearance"]
            .iter()
            .map(|a| walk_anchor(&document, a, &DEFAULT_SELECTORS).unwrap())
            .collect();

        let mut strings = CriterionStrings::new();
        criteria_from_sections(&sections, &mut strings);

        assert_eq!(strings.text(Criterion::SiteCoverage), Some("Max. 60%"));
        assert_eq!(
            strings.text(Criterion::GarageOpening),
            Some("Garage openings do not exceed 7m in width.")
        );
        assert_eq!(
            strings.text(Criterion::Overlooking),
            Some("Upper level windows have sill heights of 1.5m.")
        );
    }

    #[test]
    fn test_setback_clause_number_is_not_a_length() {
        let html = r#"
            <table>
              <tr><th>Primary Street Setback</th></tr>
              <tr><td role="RenderCell" data-phase="DTS"><h4>DTS/DPF 5.1</h4>The building line is consistent with the average setback of the adjoining dwellings.</td></tr>
              <tr><th>Secondary Street Setback</th></tr>
              <tr><td role="RenderCell" data-phase="DTS"><h4>DTS/DPF 6.1</h4>Buildings are set back at least 900mm from the secondary street boundary.</td></tr>
            </table>
        "#;
        let document = Html::parse_document(html);
        let sections: Vec<AnchorSection> = ["Primary Street Setback", "Secondary Street Setback"]
            .iter()
            .map(|a| walk_anchor(&document, a, &DEFAULT_SELECTORS).unwrap())
            .collect();
        assert!(!sections[0].text().contains("5.1"));

        let mut strings = CriterionStrings::new();
        criteria_from_sections(&sections, &mut strings);

        assert!(!strings.contains(Criterion::PrimaryStreetSetback));
        assert_eq!(strings.text(Criterion::SecondaryStreetSetback), Some("0.9m"));
    }

    #[test]
    fn test_custom_row_marker_finds_following_row() {
        let html = r#"
            <div class="grid">
              <div class="row"><span>Site coverage</span></div>
              <div class="row"><div class="cell"><h4>DTS/DPF 3.1</h4>Site coverage does not exceed 55%.</div></div>
            </div>
        "#;
        let selectors = TableMarkers {
            row: "div.row".to_string(),
            cell: "div.cell".to_string(),
            ..TableMarkers::default()
        }
        .compile()
        .unwrap();

        let document = Html::parse_document(html);
        let section = walk_anchor(&document, "Site coverage", &selectors).unwrap();
        assert_eq!(section.entries.len(), 1);
        assert_eq!(section.entries[0].text, "Site coverage does not exceed 55%.");
    }

    #[test]
    fn test_invalid_marker_selector() {
        let markers = TableMarkers {
            cell: "td[".to_string(),
            ..TableMarkers::default()
        };
        assert!(matches!(
            markers.compile(),
            Err(ExtractError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_detect_layout() {
        assert!(DEFAULT_SELECTORS.detect(&Html::parse_document(TABLE)));
        assert!(!DEFAULT_SELECTORS.detect(&Html::parse_document("<p>60% site coverage</p>")));
    }
}
