//! Typed values of the quantitative assessment.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::criterion::{Criterion, QuantitativeAssessment};
use super::limit::NumericLimit;

/// Explicit "not quantified" states, distinct from a missing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentinel {
    /// To be confirmed
    #[serde(rename = "TBC")]
    Tbc,
    /// Not applicable to this site
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Sentinel {
    /// Case-insensitive match of `TBC` / `N/A`, ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Sentinel> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("TBC") {
            Some(Sentinel::Tbc)
        } else if raw.eq_ignore_ascii_case("N/A") {
            Some(Sentinel::NotApplicable)
        } else {
            None
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentinel::Tbc => f.write_str("TBC"),
            Sentinel::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// One row of the assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ControlValue {
    /// Numeric limit read from the document.
    Limit(NumericLimit),
    /// Narrative text read from the document.
    FreeText(String),
    Sentinel(Sentinel),
    /// Clause reference or conservative default that was not read from the
    /// document. `limit` is set when the default itself is numeric.
    Default {
        text: String,
        limit: Option<NumericLimit>,
    },
    /// A value was found but failed validation.
    Invalid { raw: String, reason: String },
    /// The document never mentions this criterion.
    Absent,
}

impl ControlValue {
    /// The numeric limit, whether extracted or defaulted.
    pub fn limit(&self) -> Option<&NumericLimit> {
        match self {
            ControlValue::Limit(limit) => Some(limit),
            ControlValue::Default { limit, .. } => limit.as_ref(),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ControlValue::Absent)
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ControlValue::Default { .. })
    }

    /// True for values that were read out of the document.
    pub fn is_extracted(&self) -> bool {
        matches!(
            self,
            ControlValue::Limit(_) | ControlValue::FreeText(_) | ControlValue::Sentinel(_)
        )
    }
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlValue::Limit(limit) => write!(f, "{}", limit),
            ControlValue::FreeText(text) => f.write_str(text),
            ControlValue::Sentinel(sentinel) => write!(f, "{}", sentinel),
            ControlValue::Default { text, .. } => write!(f, "{} (default)", text),
            ControlValue::Invalid { raw, .. } => write!(f, "{} (invalid)", raw),
            ControlValue::Absent => f.write_str("-"),
        }
    }
}

impl QuantitativeAssessment {
    /// A record with every criterion `Absent`.
    pub fn absent() -> Self {
        Self::from_fn(|_| ControlValue::Absent)
    }

    /// All rows in criterion order.
    pub fn iter(&self) -> impl Iterator<Item = (Criterion, &ControlValue)> {
        Criterion::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// Number of rows read out of the document.
    pub fn extracted_count(&self) -> usize {
        self.iter().filter(|(_, v)| v.is_extracted()).count()
    }
}
