//! Flat-text scanners.
//!
//! Each scanner looks at the visible text of a policy document (or of one
//! anchored table section) and returns a normalised criterion string. Where a
//! scanner has more than one pattern, they are tried in the order written.

use std::sync::LazyLock;

use regex::Regex;

use super::units::{format_number, to_metres};
use crate::types::{Criterion, CriterionStrings, CriterionValue};

static RE_SITE_COVERAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*%\s*site\s+coverage").unwrap());
static RE_HEIGHT_LEVELS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Maximum\s+building\s+height\s+is\s+(\d+)\s+level").unwrap()
});
static RE_HEIGHT_METRES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*m\s+(?:high|height)").unwrap());
static RE_WALL_HEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)wall\s+height[^.]*?(\d+(?:\.\d+)?)\s*m\b").unwrap());
static RE_PRIMARY_FIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)5\.5\s*m.*primary\s+street").unwrap());
static RE_PRIMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)primary\s+street[^0-9]*?(\d+(?:\.\d+)?)\s*(mm|m)\b").unwrap()
});
static RE_SECONDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)secondary\s+street[^0-9]*?(\d+(?:\.\d+)?)\s*(mm|m)\b").unwrap()
});
static RE_SECONDARY_900MM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)secondary[^0-9]*?900\s*mm").unwrap());
static RE_BOUNDARY_WALL_HEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)boundary[^.]*?(\d+(?:\.\d+)?)\s*m\s+(?:high|in\s+height)").unwrap()
});
static RE_BOUNDARY_WALL_LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)boundary[^.]*?(\d+(?:\.\d+)?)\s*m\s+(?:long|in\s+length)").unwrap()
});
static RE_REAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rear[^0-9]*?(\d+(?:\.\d+)?)\s*(mm|m)\b").unwrap());
static RE_PARKING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+(?:on-site\s+)?(?:car\s+)?parking\s+spaces?").unwrap()
});

/// Clause references and conservative values used when the document gives
/// nothing better. These are never presented as scraped values.
pub const DEFAULTS: &[(Criterion, &str)] = &[
    (Criterion::WallHeight, "Max. 7m"),
    (Criterion::LowerSideWallHeight, "Max. 3m"),
    (Criterion::LowerSideWallLength, "Max. 11.5m"),
    (Criterion::LowerSideClearSetback, "Min. 0.9m"),
    (Criterion::UpperSideBaseSetback, "Min. 0.9m"),
    (Criterion::UpperSideExtraFormula, "900mm + 1/3 wall height above 3m"),
    (Criterion::LowerRearSetback, "Min. 4m"),
    (Criterion::UpperRearSetback, "Min. 6m"),
    (Criterion::CutAndFill, "DTS 8.1"),
    (Criterion::Overlooking, "DTS 10.1"),
    (Criterion::TreePlanting, "DTS 13.1 (4x4m deep soil)"),
    (Criterion::Streetscape, "DTS 17.1"),
    (Criterion::GarageSetback, "DTS 20.1"),
    (Criterion::GarageOpening, "DTS 20.1"),
    (Criterion::DrivewayCrossover, "DTS 23.3"),
    (Criterion::PrivateOpenSpace, "DTS 21.1"),
    (Criterion::SoftLandscaping, "DTS 22.1"),
    (Criterion::CarParkingSpaces, "Min. 2 spaces"),
];

/// Land use assumed when a document talks about dwellings at all.
pub const DWELLING_LAND_USE: &str = "Dwelling (detached)";

fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Capture group 1 as a number and group 2 as `mm`/`m`, converted to metres.
fn capture_metres(re: &Regex, text: &str) -> Option<f64> {
    let caps = re.captures(text)?;
    to_metres(caps.get(1)?.as_str(), caps.get(2)?.as_str())
}

/// `<n>% site coverage` → `Max. n%`.
pub fn site_coverage(text: &str) -> Option<String> {
    capture(&RE_SITE_COVERAGE, text).map(|n| format!("Max. {}%", n))
}

/// Building height as levels and/or metres.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildingHeight {
    pub levels: Option<String>,
    pub metres: Option<String>,
}

impl BuildingHeight {
    /// Combined row text: `Max. L levels/Nm`, or whichever half was found.
    pub fn summary(&self) -> Option<String> {
        match (&self.levels, &self.metres) {
            (Some(l), Some(m)) => Some(format!("Max. {} levels/{}m", l, m)),
            (Some(l), None) => Some(format!("Max. {} levels", l)),
            (None, Some(m)) => Some(format!("Max. {}m", m)),
            (None, None) => None,
        }
    }

    pub fn levels_text(&self) -> Option<String> {
        self.levels.as_ref().map(|l| format!("Max. {} levels", l))
    }

    pub fn metres_text(&self) -> Option<String> {
        self.metres.as_ref().map(|m| format!("Max. {}m", m))
    }
}

/// `Maximum building height is <n> level` and `<n>m high|height`, independently.
pub fn building_height(text: &str) -> BuildingHeight {
    BuildingHeight {
        levels: capture(&RE_HEIGHT_LEVELS, text).map(str::to_string),
        metres: capture(&RE_HEIGHT_METRES, text).map(str::to_string),
    }
}

/// `wall height ... <n>m` → `Max. nm`.
pub fn wall_height(text: &str) -> Option<String> {
    capture(&RE_WALL_HEIGHT, text).map(|n| format!("Max. {}m", n))
}

/// The common 5.5 m figure ahead of "primary street" first, then the first
/// length after "primary street".
pub fn primary_street_setback(text: &str) -> Option<String> {
    if RE_PRIMARY_FIXED.is_match(text) {
        return Some("5.5m".to_string());
    }
    capture_metres(&RE_PRIMARY, text).map(|m| format!("{}m", format_number(m)))
}

/// The first length after "secondary street", then a 900 mm figure after "secondary".
pub fn secondary_street_setback(text: &str) -> Option<String> {
    if let Some(m) = capture_metres(&RE_SECONDARY, text) {
        return Some(format!("{}m", format_number(m)));
    }
    RE_SECONDARY_900MM
        .is_match(text)
        .then(|| "0.9m".to_string())
}

pub fn boundary_wall_height(text: &str) -> Option<String> {
    capture(&RE_BOUNDARY_WALL_HEIGHT, text).map(|n| format!("Max. {}m", n))
}

pub fn boundary_wall_length(text: &str) -> Option<String> {
    capture(&RE_BOUNDARY_WALL_LENGTH, text).map(|n| format!("Max. {}m", n))
}

/// First length after "rear" → `Min. nm`.
pub fn lower_rear_setback(text: &str) -> Option<String> {
    capture_metres(&RE_REAR, text).map(|m| format!("Min. {}m", format_number(m)))
}

/// `<n> [car] parking spaces` → `Min. n spaces`.
pub fn car_parking(text: &str) -> Option<String> {
    capture(&RE_PARKING, text).map(|n| format!("Min. {} spaces", n))
}

/// Run every scanner over `text`, filling criteria that are still unresolved.
pub fn fill_from_text(text: &str, strings: &mut CriterionStrings) {
    let height = building_height(text);
    let found = [
        (Criterion::SiteCoverage, site_coverage(text)),
        (Criterion::BuildingHeightLevels, height.levels_text()),
        (Criterion::BuildingHeightMetres, height.metres_text()),
        (Criterion::WallHeight, wall_height(text)),
        (Criterion::PrimaryStreetSetback, primary_street_setback(text)),
        (Criterion::SecondaryStreetSetback, secondary_street_setback(text)),
        (Criterion::LowerSideWallHeight, boundary_wall_height(text)),
        (Criterion::LowerSideWallLength, boundary_wall_length(text)),
        (Criterion::LowerRearSetback, lower_rear_setback(text)),
        (Criterion::CarParkingSpaces, car_parking(text)),
    ];

    for (criterion, value) in found {
        if let Some(value) = value {
            strings.fill(criterion, CriterionValue::extracted(value));
        }
    }
}

/// Fill the remaining criteria with tagged defaults.
pub fn fill_defaults(text: &str, strings: &mut CriterionStrings) {
    if text.to_lowercase().contains("dwelling") {
        strings.fill(Criterion::LandUse, CriterionValue::default_value(DWELLING_LAND_USE));
    }
    for (criterion, value) in DEFAULTS {
        strings.fill(*criterion, CriterionValue::default_value(*value));
    }
}
