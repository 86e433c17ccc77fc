use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identifier that the services send either as a JSON string or a JSON number.
///
/// Valuation numbers and document tree ids both show up in both forms, so the
/// canonical representation is the decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FlexibleId(pub String);

impl FlexibleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for FlexibleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => FlexibleId(s.trim().to_string()),
            Raw::Number(n) => FlexibleId(n.to_string()),
        })
    }
}

// ============================================================================
// Geocode (findAddressCandidates)
// ============================================================================

/// Geocoder payload after the JSONP envelope is removed.
///
/// Candidates stay as raw JSON so a malformed one can be reported verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub candidates: Vec<Value>,
}

/// A single geocoder candidate with the fields the resolver depends on.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeCandidate {
    pub address: String,
    pub location: GeoPoint,
    pub attributes: CandidateAttributes,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeoPoint {
    /// Longitude
    pub x: f64,
    /// Latitude
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateAttributes {
    #[serde(rename = "Valuation")]
    pub valuation: FlexibleId,
}

// ============================================================================
// Identify (PropertyPlanningAtlas MapServer)
// ============================================================================

/// Point in EPSG:3857 metres, as sent in the identify `geometry` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentifyResponse {
    pub results: Vec<Value>,
}

/// One identified feature on the parcel layer.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifyResult {
    #[serde(rename = "layerId", default)]
    pub layer_id: Option<i64>,
    #[serde(rename = "layerName", default)]
    pub layer_name: Option<String>,
    #[serde(rename = "displayFieldName", default)]
    pub display_field_name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    pub attributes: ParcelAttributes,
}

/// Parcel attributes; the external field names carry spaces.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParcelAttributes {
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Valuation No")]
    pub valuation_no: FlexibleId,
    #[serde(rename = "OBJECTID", default)]
    pub object_id: Option<FlexibleId>,
    #[serde(rename = "Title Prefix", default)]
    pub title_prefix: Option<String>,
    #[serde(rename = "Title Volume", default)]
    pub title_volume: Option<String>,
    #[serde(rename = "Title Folio", default)]
    pub title_folio: Option<String>,
}

impl ParcelAttributes {
    /// Certificate of title reference, e.g. `CT 5123/456`, when all parts are present.
    pub fn title_reference(&self) -> Option<String> {
        match (&self.title_prefix, &self.title_volume, &self.title_folio) {
            (Some(prefix), Some(volume), Some(folio)) => {
                Some(format!("{} {}/{}", prefix.trim(), volume.trim(), folio.trim()))
            }
            _ => None,
        }
    }
}

// ============================================================================
// Policy index and content (_getpolicies)
// ============================================================================

/// A node of the policy document tree.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyNode {
    #[serde(rename = "DocTreeText")]
    pub label: String,
    #[serde(rename = "DocTreeID", default)]
    pub document_id: Option<FlexibleId>,
    #[serde(rename = "HasChildren", default)]
    pub has_children: bool,
    #[serde(rename = "Children", default, deserialize_with = "null_as_empty")]
    pub children: Vec<PolicyNode>,
}

/// A block of policy content; `Content` holds an HTML fragment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentBlock {
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Zone variations (_getzones)
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZonesResponse {
    #[serde(rename = "List", default, deserialize_with = "null_as_empty")]
    pub list: Vec<ZoneListItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneListItem {
    #[serde(rename = "GroupType", default)]
    pub group_type: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Code", default)]
    pub code: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
