//! The fixed set of assessment criteria and the raw strings extracted for them.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::assessment::ControlValue;
use super::limit::LimitKind;

/// Declares the criteria once; the enum, its lookup table and the assessment
/// record are all generated from the same list.
macro_rules! criteria {
    ($( $variant:ident => $field:ident, $label:literal, $kind:expr; )+) => {
        /// One row of the quantitative assessment.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Criterion {
            $( $variant, )+
        }

        impl Criterion {
            pub const ALL: &'static [Criterion] = &[ $( Criterion::$variant, )+ ];

            /// Field name in the serialised assessment.
            pub fn key(self) -> &'static str {
                match self {
                    $( Criterion::$variant => stringify!($field), )+
                }
            }

            /// Human-readable row label.
            pub fn label(self) -> &'static str {
                match self {
                    $( Criterion::$variant => $label, )+
                }
            }

            /// Limit kind for numeric criteria; `None` for text-only rows.
            pub fn limit_kind(self) -> Option<LimitKind> {
                match self {
                    $( Criterion::$variant => $kind, )+
                }
            }
        }

        /// Quantitative development controls for one zone policy document.
        ///
        /// Every criterion is always present, `Absent` when nothing was found.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct QuantitativeAssessment {
            $( pub $field: ControlValue, )+
        }

        impl QuantitativeAssessment {
            /// Build a record by evaluating `f` once per criterion, in declaration order.
            pub fn from_fn(mut f: impl FnMut(Criterion) -> ControlValue) -> Self {
                Self {
                    $( $field: f(Criterion::$variant), )+
                }
            }

            pub fn get(&self, criterion: Criterion) -> &ControlValue {
                match criterion {
                    $( Criterion::$variant => &self.$field, )+
                }
            }
        }
    };
}

use LimitKind::{Max, Min};

criteria! {
    LandUse => land_use, "Land Use", None;
    SiteCoverage => site_coverage, "Site Coverage", Some(Max);
    BuildingHeightLevels => building_height_levels, "Building Height (levels)", Some(Max);
    BuildingHeightMetres => building_height_m, "Building Height (m)", Some(Max);
    WallHeight => wall_height_m, "Wall Height", Some(Max);
    PrimaryStreetSetback => primary_street_setback_m, "Primary Street Setback", Some(Min);
    SecondaryStreetSetback => secondary_street_setback, "Secondary Street Setback", Some(Min);
    LowerSideWallHeight => lower_side_boundary_wall_height_m, "Lower Side Boundary Wall Height", Some(Max);
    LowerSideWallLength => lower_side_boundary_wall_length_m, "Lower Side Boundary Wall Length", Some(Max);
    LowerSideClearSetback => lower_side_clear_setback_m, "Lower Side Clear Setback", Some(Min);
    UpperSideBaseSetback => upper_side_base_setback_m, "Upper Side Setback", Some(Min);
    UpperSideExtraFormula => upper_side_extra_formula, "Upper Side Setback Formula", None;
    LowerRearSetback => lower_rear_setback_m, "Lower Rear Setback", Some(Min);
    UpperRearSetback => upper_rear_setback_m, "Upper Rear Setback", Some(Min);
    BoundaryWalls => boundary_walls, "Boundary Walls", None;
    CutAndFill => cut_and_fill, "Earthworks", None;
    Overlooking => overlooking, "Overlooking", None;
    TreePlanting => tree_planting, "Tree Planting", None;
    Streetscape => streetscape, "Streetscape", None;
    GarageSetback => garage_setback, "Garage Setback", None;
    GarageOpening => garage_opening, "Garage Opening", None;
    DrivewayCrossover => driveway_crossover, "Garage Crossover", None;
    PrivateOpenSpace => private_open_space, "Private Open Space", None;
    SoftLandscaping => soft_landscaping, "Soft Landscaping", None;
    StreetTrees => street_trees, "Street Trees", None;
    CarParkingSpaces => car_parking_spaces, "Car Parking", Some(Min);
}

impl Criterion {
    pub fn from_key(key: &str) -> Option<Criterion> {
        Criterion::ALL.iter().copied().find(|c| c.key() == key)
    }
}

impl Serialize for Criterion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Criterion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Criterion::from_key(&key)
            .ok_or_else(|| D::Error::custom(format!("unknown criterion: {}", key)))
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a criterion string came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Read out of the policy document.
    Extracted,
    /// Fixed clause reference or conservative default, not read from the document.
    Default,
}

/// Raw string for one criterion plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionValue {
    pub text: String,
    pub source: ValueSource,
}

impl CriterionValue {
    pub fn extracted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ValueSource::Extracted,
        }
    }

    pub fn default_value(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ValueSource::Default,
        }
    }

    pub fn is_default(&self) -> bool {
        self.source == ValueSource::Default
    }
}

/// Criterion → raw string mapping produced by the table extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriterionStrings(BTreeMap<Criterion, CriterionValue>);

impl CriterionStrings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, criterion: Criterion, value: CriterionValue) {
        self.0.insert(criterion, value);
    }

    /// Insert only when the criterion has no value yet.
    pub fn fill(&mut self, criterion: Criterion, value: CriterionValue) {
        self.0.entry(criterion).or_insert(value);
    }

    pub fn get(&self, criterion: Criterion) -> Option<&CriterionValue> {
        self.0.get(&criterion)
    }

    /// Text of an entry, regardless of its source.
    pub fn text(&self, criterion: Criterion) -> Option<&str> {
        self.0.get(&criterion).map(|v| v.text.as_str())
    }

    pub fn contains(&self, criterion: Criterion) -> bool {
        self.0.contains_key(&criterion)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, &CriterionValue)> {
        self.0.iter().map(|(c, v)| (*c, v))
    }
}

impl FromIterator<(Criterion, CriterionValue)> for CriterionStrings {
    fn from_iter<I: IntoIterator<Item = (Criterion, CriterionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
