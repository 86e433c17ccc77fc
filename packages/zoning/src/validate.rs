//! Criterion strings → typed [`QuantitativeAssessment`].
//!
//! Every criterion gets a row. Sentinels (`TBC`, `N/A`) are recognised on any
//! criterion; numeric criteria whose text opens with `[Max.|Min.] <n><unit>`
//! become [`NumericLimit`]s; everything else stays free text. Defaults keep
//! their provenance as [`ControlValue::Default`].
//!
//! An unrecognised unit on a numeric criterion is an error for that field. It
//! is never downgraded to free text. [`validate`] records the error and keeps
//! going; [`validate_strict`] stops at the first one.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::types::{
    ControlValue, Criterion, CriterionStrings, CriterionValue, InvalidUnit, LimitKind,
    NumericLimit, QuantitativeAssessment, Sentinel,
};

static RE_LEADING_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:(?:max|min)(?:imum)?\.?\s*)?(\d+(?:\.\d+)?)\s*(%|[a-z]+)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("invalid value for {}: {raw:?}: {source}", criterion.key())]
    InvalidUnit {
        criterion: Criterion,
        raw: String,
        source: InvalidUnit,
    },
}

impl ValidationError {
    pub fn criterion(&self) -> Criterion {
        match self {
            ValidationError::InvalidUnit { criterion, .. } => *criterion,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            ValidationError::InvalidUnit { raw, .. } => raw,
        }
    }
}

/// A complete record plus the fields that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub assessment: QuantitativeAssessment,
    pub rejected: Vec<ValidationError>,
}

impl ValidationOutcome {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Validate every criterion. Rejected fields become [`ControlValue::Invalid`]
/// and are listed in [`ValidationOutcome::rejected`].
pub fn validate(strings: &CriterionStrings) -> ValidationOutcome {
    let mut rejected = Vec::new();
    let assessment = QuantitativeAssessment::from_fn(|criterion| {
        match validate_field(criterion, strings.get(criterion)) {
            Ok(value) => value,
            Err(e) => {
                warn!(criterion = criterion.key(), error = %e, "Rejected criterion value");
                let invalid = ControlValue::Invalid {
                    raw: e.raw().to_string(),
                    reason: e.to_string(),
                };
                rejected.push(e);
                invalid
            }
        }
    });
    ValidationOutcome {
        assessment,
        rejected,
    }
}

/// Validate every criterion, failing on the first rejected field.
pub fn validate_strict(strings: &CriterionStrings) -> Result<QuantitativeAssessment, ValidationError> {
    let mut first_error = None;
    let assessment = QuantitativeAssessment::from_fn(|criterion| {
        if first_error.is_some() {
            return ControlValue::Absent;
        }
        validate_field(criterion, strings.get(criterion)).unwrap_or_else(|e| {
            first_error = Some(e);
            ControlValue::Absent
        })
    });
    match first_error {
        Some(e) => Err(e),
        None => Ok(assessment),
    }
}

/// Validate one criterion's raw string.
pub fn validate_field(
    criterion: Criterion,
    value: Option<&CriterionValue>,
) -> Result<ControlValue, ValidationError> {
    let Some(value) = value else {
        return Ok(ControlValue::Absent);
    };
    let text = value.text.trim();

    if let Some(sentinel) = Sentinel::parse(text) {
        return Ok(ControlValue::Sentinel(sentinel));
    }

    let limit = criterion
        .limit_kind()
        .and_then(|kind| leading_limit(kind, text))
        .transpose()
        .map_err(|source| ValidationError::InvalidUnit {
            criterion,
            raw: text.to_string(),
            source,
        })?;

    if value.is_default() {
        return Ok(ControlValue::Default {
            text: text.to_string(),
            limit,
        });
    }

    Ok(match limit {
        Some(limit) => ControlValue::Limit(limit),
        None => ControlValue::FreeText(text.to_string()),
    })
}

/// `None` when the text does not open with a number; otherwise the limit or
/// the reason it could not be built.
fn leading_limit(kind: LimitKind, text: &str) -> Option<Result<NumericLimit, InvalidUnit>> {
    let caps = RE_LEADING_LIMIT.captures(text)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str();

    let (value, unit) = match unit.to_lowercase().as_str() {
        "mm" => (value / 1000.0, "m".to_string()),
        "metre" | "metres" | "meter" | "meters" => (value, "m".to_string()),
        "level" => (value, "levels".to_string()),
        "space" => (value, "spaces".to_string()),
        other => (value, other.to_string()),
    };
    Some(NumericLimit::new(kind, value, &unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Unit;

    fn strings(entries: &[(Criterion, &str)]) -> CriterionStrings {
        entries
            .iter()
            .map(|(c, text)| (*c, CriterionValue::extracted(*text)))
            .collect()
    }

    #[test]
    fn test_sentinels() {
        let outcome = validate(&strings(&[
            (Criterion::SiteCoverage, "TBC"),
            (Criterion::Overlooking, "n/a"),
        ]));
        assert_eq!(
            outcome.assessment.site_coverage,
            ControlValue::Sentinel(Sentinel::Tbc)
        );
        assert_eq!(
            outcome.assessment.overlooking,
            ControlValue::Sentinel(Sentinel::NotApplicable)
        );
    }

    #[test]
    fn test_missing_key_is_absent() {
        let outcome = validate(&CriterionStrings::new());
        assert!(outcome.assessment.iter().all(|(_, v)| v.is_absent()));
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_site_coverage_sentence() {
        let outcome = validate(&strings(&[(Criterion::SiteCoverage, "60% site coverage")]));
        assert_eq!(
            outcome.assessment.site_coverage,
            ControlValue::Limit(NumericLimit::max(60.0, "%").unwrap())
        );
    }

    #[test]
    fn test_kind_comes_from_criterion() {
        let outcome = validate(&strings(&[
            (Criterion::CarParkingSpaces, "Min. 2 spaces"),
            (Criterion::PrimaryStreetSetback, "5.5m"),
            (Criterion::BuildingHeightLevels, "Max. 1 level"),
        ]));
        let parking = outcome.assessment.car_parking_spaces.limit().unwrap();
        assert_eq!(parking.kind(), LimitKind::Min);
        assert_eq!(parking.unit(), Unit::Spaces);

        let setback = outcome.assessment.primary_street_setback_m.limit().unwrap();
        assert_eq!(setback.kind(), LimitKind::Min);
        assert_eq!(setback.value(), 5.5);

        let height = outcome.assessment.building_height_levels.limit().unwrap();
        assert_eq!(height.unit(), Unit::Levels);
    }

    #[test]
    fn test_millimetres_fold_to_metres() {
        let outcome = validate(&strings(&[(Criterion::SecondaryStreetSetback, "900mm")]));
        let limit = outcome.assessment.secondary_street_setback.limit().unwrap();
        assert_eq!(limit.value(), 0.9);
        assert_eq!(limit.unit(), Unit::Metres);
    }

    #[test]
    fn test_text_criteria_stay_free_text() {
        let outcome = validate(&strings(&[(Criterion::Streetscape, "2 windows face the street")]));
        assert_eq!(
            outcome.assessment.streetscape,
            ControlValue::FreeText("2 windows face the street".to_string())
        );
    }

    #[test]
    fn test_narrative_on_numeric_criterion_is_free_text() {
        let outcome = validate(&strings(&[(Criterion::SiteCoverage, "As shown in the table")]));
        assert!(matches!(outcome.assessment.site_coverage, ControlValue::FreeText(_)));
    }

    #[test]
    fn test_invalid_unit_is_recorded_not_coerced() {
        let outcome = validate(&strings(&[
            (Criterion::BuildingHeightLevels, "Max. 2 storeys"),
            (Criterion::SiteCoverage, "Max. 60%"),
        ]));
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].criterion(), Criterion::BuildingHeightLevels);
        match &outcome.assessment.building_height_levels {
            ControlValue::Invalid { raw, reason } => {
                assert_eq!(raw, "Max. 2 storeys");
                assert!(reason.contains("storeys"));
                assert!(reason.contains("building_height_levels"));
                assert!(reason.contains("{%, m, levels, spaces}"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
        // The rest of the record still validates.
        assert!(outcome.assessment.site_coverage.limit().is_some());
    }

    #[test]
    fn test_strict_fails_on_first_invalid_unit() {
        let err = validate_strict(&strings(&[
            (Criterion::SiteCoverage, "Max. 60%"),
            (Criterion::CarParkingSpaces, "2 bays"),
        ]))
        .unwrap_err();
        assert_eq!(err.criterion(), Criterion::CarParkingSpaces);

        let ok = validate_strict(&strings(&[(Criterion::SiteCoverage, "Max. 60%")])).unwrap();
        assert!(ok.site_coverage.limit().is_some());
    }

    #[test]
    fn test_defaults_keep_provenance() {
        let strings: CriterionStrings = [
            (Criterion::WallHeight, CriterionValue::default_value("Max. 7m")),
            (Criterion::CutAndFill, CriterionValue::default_value("DTS 8.1")),
        ]
        .into_iter()
        .collect();
        let outcome = validate(&strings);
        assert_eq!(
            outcome.assessment.wall_height_m,
            ControlValue::Default {
                text: "Max. 7m".to_string(),
                limit: Some(NumericLimit::max(7.0, "m").unwrap()),
            }
        );
        assert_eq!(
            outcome.assessment.cut_and_fill,
            ControlValue::Default {
                text: "DTS 8.1".to_string(),
                limit: None,
            }
        );
        assert_eq!(outcome.assessment.extracted_count(), 0);
    }
}
