//! Site and policy document types handed between pipeline stages.

use std::fmt;

use plansa_client::{ContentBlock, ParcelAttributes};
use serde::{Deserialize, Serialize};

/// What the caller knows about the property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum SiteQuery {
    Address { address: String },
    Coordinates { latitude: f64, longitude: f64 },
}

impl SiteQuery {
    pub fn address(address: impl Into<String>) -> Self {
        SiteQuery::Address {
            address: address.into(),
        }
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        SiteQuery::Coordinates {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for SiteQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteQuery::Address { address } => f.write_str(address),
            SiteQuery::Coordinates {
                latitude,
                longitude,
            } => write!(f, "{},{}", latitude, longitude),
        }
    }
}

/// A resolved property. `valuation_id` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub full_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub valuation_id: String,

    /// Parcel attributes when the site came from a map identify query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parcel: Option<ParcelAttributes>,
}

/// A document under a "Zone" node of the policy tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyDocumentRef {
    pub document_id: String,
}

impl PolicyDocumentRef {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
        }
    }
}

/// Canonical HTML of one policy document (its first content block).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyContent {
    pub document_id: String,
    pub html: String,
}

/// Every content block returned for a policy document.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyResponse {
    pub document_id: String,
    pub blocks: Vec<ContentBlock>,
}

impl PolicyResponse {
    /// The first block's HTML; the remaining blocks stay in `blocks`.
    pub fn content(&self) -> Option<PolicyContent> {
        self.blocks.first().map(|block| PolicyContent {
            document_id: self.document_id.clone(),
            html: block.content.clone(),
        })
    }
}
