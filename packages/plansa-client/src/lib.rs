//! Pure PlanSA / GeoHub REST API client.
//!
//! A minimal client for the South Australian planning services. Supports
//! geocoding an address, identifying the parcel under a projected point,
//! walking the policy document index and fetching policy content.
//!
//! # Example
//!
//! ```rust,ignore
//! use plansa_client::{ClientConfig, PlanSaClient};
//!
//! let client = PlanSaClient::new(ClientConfig::default())?;
//!
//! let geocode = client.geocode("9 ELIZABETH ST NORWOOD SA 5067").await?;
//! println!("{} candidates", geocode.candidates.len());
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod jsonp;
pub mod types;

pub use config::ClientConfig;
pub use error::{body_prefix, ApiError, Endpoint, Result};
pub use jsonp::{strip_jsonp, unwrap_jsonp, JSONP_CALLBACK};
pub use types::{
    CandidateAttributes, ContentBlock, FlexibleId, GeoPoint, GeocodeCandidate, GeocodeResponse,
    IdentifyResponse, IdentifyResult, ParcelAttributes, PolicyNode, ProjectedPoint, ZoneListItem,
    ZonesResponse,
};

use tracing::{debug, warn};

/// Lookup type used by every `code.plan.sa.gov.au` query.
const LOOKUP_TYPE: &str = "valuation";

pub struct PlanSaClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl PlanSaClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::transport(Endpoint::Geocode, e))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET a URL and return the body of a 2xx response.
    async fn get_text(
        &self,
        endpoint: Endpoint,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<String> {
        debug!(%endpoint, url, "PlanSA request starting");
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                warn!(%endpoint, error = %e, "PlanSA request failed");
                ApiError::transport(endpoint, e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::ServiceUnavailable {
                endpoint,
                status: Some(status.as_u16()),
                detail: body_prefix(&body),
            });
        }

        resp.text().await.map_err(|e| ApiError::transport(endpoint, e))
    }

    /// Geocode a single-line address. The response body is JSONP.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResponse> {
        let params = [
            ("Single Line Input", address.to_string()),
            ("outFields", "Valuation".to_string()),
            ("f", "json".to_string()),
            ("callback", self.config.jsonp_callback.clone()),
        ];
        let body = self
            .get_text(Endpoint::Geocode, &self.config.geocode_url, &params)
            .await?;
        decode::decode_geocode(&body, &self.config.jsonp_callback)
    }

    /// Identify the parcel under a point given in EPSG:3857.
    pub async fn identify(&self, point: ProjectedPoint) -> Result<IdentifyResponse> {
        let geometry = serde_json::json!({ "x": point.x, "y": point.y }).to_string();
        let params = [
            ("f", "json".to_string()),
            ("tolerance", "0".to_string()),
            ("returnGeometry", "false".to_string()),
            ("returnFieldName", "false".to_string()),
            ("returnUnformattedValues", "false".to_string()),
            ("imageDisplay", "1913,233,96".to_string()),
            ("geometry", geometry),
            ("geometryType", "esriGeometryPoint".to_string()),
            ("sr", "3857".to_string()),
            ("mapExtent", self.config.map_extent.clone()),
            ("layers", self.config.identify_layers.clone()),
        ];
        let body = self
            .get_text(Endpoint::Identify, &self.config.identify_url, &params)
            .await?;
        decode::decode_identify(&body)
    }

    /// Fetch the top level of the policy document tree for a valuation.
    pub async fn policy_index(&self, valuation_id: &str) -> Result<Vec<PolicyNode>> {
        let params = [
            ("term", valuation_id.to_string()),
            ("type", LOOKUP_TYPE.to_string()),
        ];
        let body = self
            .get_text(Endpoint::PolicyIndex, &self.config.policies_url, &params)
            .await?;
        decode::decode_policy_index(&body)
    }

    /// Fetch every content block of one policy document.
    pub async fn policy_content(
        &self,
        valuation_id: &str,
        document_id: &str,
    ) -> Result<Vec<ContentBlock>> {
        let params = [
            ("term", valuation_id.to_string()),
            ("type", LOOKUP_TYPE.to_string()),
            ("filter", "full".to_string()),
            ("docId", document_id.to_string()),
        ];
        let body = self
            .get_text(Endpoint::PolicyContent, &self.config.policies_url, &params)
            .await?;
        decode::decode_policy_content(&body)
    }

    /// Fetch zone data including technical and numeric variations.
    pub async fn zone_variations(&self, valuation_id: &str) -> Result<ZonesResponse> {
        let params = [
            ("term", valuation_id.to_string()),
            ("type", LOOKUP_TYPE.to_string()),
            ("filter", "full".to_string()),
        ];
        let body = self
            .get_text(Endpoint::ZoneVariations, &self.config.zones_url, &params)
            .await?;
        decode::decode_zone_variations(&body)
    }
}
