//! Numeric development limits.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a limit caps a quantity from above or below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitKind {
    /// Upper limit (≤)
    Max,
    /// Lower limit (≥)
    Min,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::Max => f.write_str("Max."),
            LimitKind::Min => f.write_str("Min."),
        }
    }
}

/// Recognised units of measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "m")]
    Metres,
    #[serde(rename = "levels")]
    Levels,
    #[serde(rename = "spaces")]
    Spaces,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Unit::Percent, Unit::Metres, Unit::Levels, Unit::Spaces];

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::Metres => "m",
            Unit::Levels => "levels",
            Unit::Spaces => "spaces",
        }
    }

    /// Exact match against the recognised symbols.
    pub fn from_symbol(symbol: &str) -> Option<Unit> {
        Unit::ALL.into_iter().find(|u| u.symbol() == symbol)
    }

    /// The recognised set, formatted for error messages.
    pub fn allowed() -> String {
        let symbols: Vec<&str> = Unit::ALL.iter().map(|u| u.symbol()).collect();
        format!("{{{}}}", symbols.join(", "))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A limit could not be built: the unit is outside the recognised set or the
/// value is not strictly positive.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("invalid unit {unit:?} for value {value}: expected a positive value in one of {allowed}", allowed = Unit::allowed())]
pub struct InvalidUnit {
    pub unit: String,
    pub value: f64,
}

/// A quantitative control expressed as a maximum or minimum.
///
/// Always holds a positive value in a recognised unit; deserialisation runs
/// the same checks as [`NumericLimit::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNumericLimit")]
pub struct NumericLimit {
    #[serde(rename = "type")]
    kind: LimitKind,
    value: f64,
    unit: Unit,
}

#[derive(Deserialize)]
struct RawNumericLimit {
    #[serde(rename = "type")]
    kind: LimitKind,
    value: f64,
    unit: String,
}

impl TryFrom<RawNumericLimit> for NumericLimit {
    type Error = InvalidUnit;

    fn try_from(raw: RawNumericLimit) -> Result<Self, Self::Error> {
        NumericLimit::new(raw.kind, raw.value, &raw.unit)
    }
}

impl NumericLimit {
    pub fn new(kind: LimitKind, value: f64, unit: &str) -> Result<Self, InvalidUnit> {
        let invalid = || InvalidUnit {
            unit: unit.to_string(),
            value,
        };
        let unit = Unit::from_symbol(unit).ok_or_else(invalid)?;
        // NaN fails this comparison too.
        if !(value > 0.0) || !value.is_finite() {
            return Err(invalid());
        }
        Ok(Self { kind, value, unit })
    }

    pub fn max(value: f64, unit: &str) -> Result<Self, InvalidUnit> {
        Self::new(LimitKind::Max, value, unit)
    }

    pub fn min(value: f64, unit: &str) -> Result<Self, InvalidUnit> {
        Self::new(LimitKind::Min, value, unit)
    }

    pub fn kind(&self) -> LimitKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }
}

impl fmt::Display for NumericLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::Percent | Unit::Metres => write!(f, "{} {}{}", self.kind, self.value, self.unit),
            Unit::Levels | Unit::Spaces => write!(f, "{} {} {}", self.kind, self.value, self.unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_accepts_recognised_units() {
        let limit = NumericLimit::max(60.0, "%").unwrap();
        assert_eq!(limit.kind(), LimitKind::Max);
        assert_eq!(limit.value(), 60.0);
        assert_eq!(limit.unit(), Unit::Percent);
        assert_eq!(limit.to_string(), "Max. 60%");
    }

    #[test]
    fn test_new_rejects_unknown_unit() {
        let err = NumericLimit::min(900.0, "mm").unwrap_err();
        assert_eq!(err.unit, "mm");
        let message = err.to_string();
        assert!(message.contains("\"mm\""));
        assert!(message.contains("{%, m, levels, spaces}"));
    }

    #[test]
    fn test_new_rejects_non_positive() {
        assert!(NumericLimit::max(0.0, "m").is_err());
        assert!(NumericLimit::max(-2.0, "levels").is_err());
        assert!(NumericLimit::max(f64::NAN, "m").is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let limit = NumericLimit::min(2.0, "spaces").unwrap();
        let json = serde_json::to_value(limit).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "min", "value": 2.0, "unit": "spaces" })
        );
    }

    #[test]
    fn test_deserialize_validates_unit() {
        let result: Result<NumericLimit, _> =
            serde_json::from_str(r#"{"type":"max","value":3,"unit":"storeys"}"#);
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_valid_limits_round_trip(
            value in 0.001f64..10_000.0,
            unit_idx in 0usize..4,
            is_max in any::<bool>(),
        ) {
            let kind = if is_max { LimitKind::Max } else { LimitKind::Min };
            let limit = NumericLimit::new(kind, value, Unit::ALL[unit_idx].symbol()).unwrap();
            let json = serde_json::to_string(&limit).unwrap();
            let back: NumericLimit = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, limit);
        }

        #[test]
        fn prop_non_positive_values_fail(value in -10_000.0f64..=0.0, unit_idx in 0usize..4) {
            prop_assert!(NumericLimit::max(value, Unit::ALL[unit_idx].symbol()).is_err());
        }

        #[test]
        fn prop_unrecognised_units_fail(unit in "[a-z]{1,8}", value in 0.001f64..10_000.0) {
            prop_assume!(Unit::from_symbol(&unit).is_none());
            prop_assert!(NumericLimit::min(value, &unit).is_err());
        }
    }
}
