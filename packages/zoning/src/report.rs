//! Assessment table rows: criterion, value, variation and compliance.

use serde::{Deserialize, Serialize};

use crate::types::{ControlValue, Criterion, QuantitativeAssessment};
use crate::variations::{DwellingType, ZoneVariations};

/// Variation labels that apply to the building height (levels) row, most
/// specific first.
const HEIGHT_VARIATION_LABELS: &[&str] = &[
    "maximum building height (levels)",
    "maximum building height",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub criterion: Criterion,
    pub value: ControlValue,
    /// Local variation applying to this row, if any.
    pub variation: Option<String>,
    /// Whether a design meets the control. Left unset until a design is
    /// compared against the assessment.
    pub met: Option<bool>,
}

/// One row per criterion, in criterion order.
pub fn build_rows(assessment: &QuantitativeAssessment, variations: &ZoneVariations) -> Vec<ReportRow> {
    let height_levels = HEIGHT_VARIATION_LABELS
        .iter()
        .find_map(|label| variations.get(label))
        .and_then(|v| v.value_for(DwellingType::Detached))
        .map(|levels| format!("{} level(s)", levels));

    assessment
        .iter()
        .map(|(criterion, value)| ReportRow {
            criterion,
            value: value.clone(),
            variation: match criterion {
                Criterion::BuildingHeightLevels => height_levels.clone(),
                _ => None,
            },
            met: None,
        })
        .collect()
}
