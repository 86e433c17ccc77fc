//! Mock planning API for testing.
//!
//! Canned responses are stored as raw bodies and decoded with the same
//! functions the HTTP client uses, so envelope and schema handling are
//! exercised offline.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use plansa_client::{
    decode, ApiError, ContentBlock, Endpoint, GeocodeResponse, IdentifyResponse, PolicyNode,
    ProjectedPoint, Result, ZonesResponse, JSONP_CALLBACK,
};

use crate::traits::PlanningApi;

/// A recorded call, in the order it was made.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Geocode(String),
    Identify(ProjectedPoint),
    PolicyIndex(String),
    PolicyContent(String, String),
    ZoneVariations(String),
}

/// Mock [`PlanningApi`] with canned bodies keyed by request.
///
/// # Example
///
/// ```rust
/// use zoning::testing::MockPlanningApi;
///
/// let mock = MockPlanningApi::new()
///     .with_policy_index("3512345678", r#"[{"DocTreeText": "Zone", "HasChildren": false}]"#);
/// assert_eq!(mock.call_count(), 0);
/// ```
#[derive(Default, Clone)]
pub struct MockPlanningApi {
    /// Geocode JSONP bodies by address
    geocode: Arc<RwLock<HashMap<String, String>>>,
    /// Identify body, returned for any point
    identify: Arc<RwLock<Option<String>>>,
    policy_index: Arc<RwLock<HashMap<String, String>>>,
    /// Content bodies by (valuation id, document id)
    policy_content: Arc<RwLock<HashMap<(String, String), String>>>,
    zones: Arc<RwLock<HashMap<String, String>>>,
    /// Endpoints that answer with a 503
    unavailable: Arc<RwLock<Vec<Endpoint>>>,
    calls: Arc<RwLock<Vec<MockCall>>>,
}

impl MockPlanningApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a geocoder JSON payload in the JSONP envelope.
    pub fn jsonp(payload: &str) -> String {
        format!("/**/{}({});", JSONP_CALLBACK, payload)
    }

    /// Raw geocode body for an address (JSONP expected).
    pub fn with_geocode(self, address: &str, body: impl Into<String>) -> Self {
        self.geocode
            .write()
            .unwrap()
            .insert(address.to_string(), body.into());
        self
    }

    pub fn with_identify(self, body: impl Into<String>) -> Self {
        *self.identify.write().unwrap() = Some(body.into());
        self
    }

    pub fn with_policy_index(self, valuation_id: &str, body: impl Into<String>) -> Self {
        self.policy_index
            .write()
            .unwrap()
            .insert(valuation_id.to_string(), body.into());
        self
    }

    pub fn with_policy_content(
        self,
        valuation_id: &str,
        document_id: &str,
        body: impl Into<String>,
    ) -> Self {
        self.policy_content
            .write()
            .unwrap()
            .insert((valuation_id.to_string(), document_id.to_string()), body.into());
        self
    }

    /// Content body holding a single HTML block.
    pub fn with_policy_html(self, valuation_id: &str, document_id: &str, html: &str) -> Self {
        let body = serde_json::json!([{ "Content": html }]).to_string();
        self.with_policy_content(valuation_id, document_id, body)
    }

    pub fn with_zones(self, valuation_id: &str, body: impl Into<String>) -> Self {
        self.zones
            .write()
            .unwrap()
            .insert(valuation_id.to_string(), body.into());
        self
    }

    /// Make an endpoint fail as if the service were down.
    pub fn with_unavailable(self, endpoint: Endpoint) -> Self {
        self.unavailable.write().unwrap().push(endpoint);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Document ids requested via `policy_content`.
    pub fn content_calls(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                MockCall::PolicyContent(_, document_id) => Some(document_id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn reset_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn record(&self, call: MockCall) {
        self.calls.write().unwrap().push(call);
    }

    /// Canned body, or the failure the endpoint is configured with.
    fn respond(&self, endpoint: Endpoint, body: Option<String>) -> Result<String> {
        if self.unavailable.read().unwrap().contains(&endpoint) {
            return Err(ApiError::ServiceUnavailable {
                endpoint,
                status: Some(503),
                detail: "Service Unavailable".to_string(),
            });
        }
        body.ok_or_else(|| ApiError::ServiceUnavailable {
            endpoint,
            status: Some(404),
            detail: "no canned response".to_string(),
        })
    }
}

#[async_trait]
impl PlanningApi for MockPlanningApi {
    async fn geocode(&self, address: &str) -> Result<GeocodeResponse> {
        self.record(MockCall::Geocode(address.to_string()));
        let body = self.geocode.read().unwrap().get(address).cloned();
        let body = self.respond(Endpoint::Geocode, body)?;
        decode::decode_geocode(&body, JSONP_CALLBACK)
    }

    async fn identify(&self, point: ProjectedPoint) -> Result<IdentifyResponse> {
        self.record(MockCall::Identify(point));
        let body = self.identify.read().unwrap().clone();
        let body = self.respond(Endpoint::Identify, body)?;
        decode::decode_identify(&body)
    }

    async fn policy_index(&self, valuation_id: &str) -> Result<Vec<PolicyNode>> {
        self.record(MockCall::PolicyIndex(valuation_id.to_string()));
        let body = self.policy_index.read().unwrap().get(valuation_id).cloned();
        let body = self.respond(Endpoint::PolicyIndex, body)?;
        decode::decode_policy_index(&body)
    }

    async fn policy_content(
        &self,
        valuation_id: &str,
        document_id: &str,
    ) -> Result<Vec<ContentBlock>> {
        self.record(MockCall::PolicyContent(
            valuation_id.to_string(),
            document_id.to_string(),
        ));
        let key = (valuation_id.to_string(), document_id.to_string());
        let body = self.policy_content.read().unwrap().get(&key).cloned();
        let body = self.respond(Endpoint::PolicyContent, body)?;
        decode::decode_policy_content(&body)
    }

    async fn zone_variations(&self, valuation_id: &str) -> Result<ZonesResponse> {
        self.record(MockCall::ZoneVariations(valuation_id.to_string()));
        let body = self.zones.read().unwrap().get(valuation_id).cloned();
        let body = self.respond(Endpoint::ZoneVariations, body)?;
        decode::decode_zone_variations(&body)
    }
}
