//! Technical and numeric variations (TNVs) of a zone.
//!
//! Local variations come from the `_getzones` listing. Each one carries an
//! HTML description such as `Maximum Building Height (Levels) (Maximum
//! building height is 2 levels)` and a code like `V0004|_2_2_2_2_2` whose
//! underscore-separated values apply to detached, semi-detached, row, group
//! and flat dwellings, in that order.

use std::collections::BTreeMap;
use std::fmt;

use plansa_client::{ZoneListItem, ZonesResponse};
use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::extract::anchored::clean;
use crate::traits::PlanningApi;

/// Group type prefix of the variations we keep (compared lowercase).
const LOCAL_VARIATION: &str = "local variation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DwellingType {
    Detached,
    SemiDetached,
    Row,
    Group,
    Flat,
}

impl DwellingType {
    /// Order of the values in a variation code.
    pub const ALL: [DwellingType; 5] = [
        DwellingType::Detached,
        DwellingType::SemiDetached,
        DwellingType::Row,
        DwellingType::Group,
        DwellingType::Flat,
    ];
}

impl fmt::Display for DwellingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DwellingType::Detached => "detached",
            DwellingType::SemiDetached => "semi_detached",
            DwellingType::Row => "row",
            DwellingType::Group => "group",
            DwellingType::Flat => "flat",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneVariation {
    /// Description text before the first parenthesis.
    pub label: String,
    pub description: String,
    pub raw_code: String,
    pub values: BTreeMap<DwellingType, String>,
}

impl ZoneVariation {
    pub fn value_for(&self, dwelling: DwellingType) -> Option<&str> {
        self.values.get(&dwelling).map(String::as_str)
    }
}

/// Variations keyed by lowercase label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneVariations(BTreeMap<String, ZoneVariation>);

impl ZoneVariations {
    /// Case-insensitive lookup by label, e.g. `"minimum frontage"`.
    pub fn get(&self, label: &str) -> Option<&ZoneVariation> {
        self.0.get(&label.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneVariation> {
        self.0.values()
    }
}

/// Keep the local variations of a zone listing. A later item with the same
/// label replaces an earlier one.
pub fn parse_zone_variations(response: &ZonesResponse) -> ZoneVariations {
    let mut variations = BTreeMap::new();
    for item in &response.list {
        let is_local = item
            .group_type
            .as_deref()
            .is_some_and(|g| g.to_lowercase().starts_with(LOCAL_VARIATION));
        if !is_local {
            continue;
        }
        let variation = parse_item(item);
        variations.insert(variation.label.to_lowercase(), variation);
    }
    ZoneVariations(variations)
}

fn parse_item(item: &ZoneListItem) -> ZoneVariation {
    let description = item
        .description
        .as_deref()
        .map(description_text)
        .unwrap_or_default();
    let label = description
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    let raw_code = item.code.clone().unwrap_or_default();

    let encoded = raw_code.split_once('|').map(|(_, v)| v).unwrap_or_default();
    let values = DwellingType::ALL
        .into_iter()
        .zip(encoded.split('_').filter(|v| !v.is_empty()))
        .map(|(dwelling, value)| (dwelling, value.to_string()))
        .collect();

    ZoneVariation {
        label,
        description,
        raw_code,
        values,
    }
}

fn description_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let parts: Vec<&str> = fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    clean(&parts.join(" "))
}

/// Fetch and parse a zone's local variations.
pub async fn fetch_zone_variations<A: PlanningApi + ?Sized>(
    api: &A,
    valuation_id: &str,
) -> Result<ZoneVariations> {
    let response = api.zone_variations(valuation_id).await?;
    let variations = parse_zone_variations(&response);
    debug!(valuation_id, items = response.list.len(), "Fetched zone listing");
    info!(valuation_id, variations = variations.len(), "Parsed zone variations");
    Ok(variations)
}
