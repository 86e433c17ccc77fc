//! The network seam between the pipeline and the PlanSA services.

use async_trait::async_trait;
use plansa_client::{
    ContentBlock, GeocodeResponse, IdentifyResponse, PlanSaClient, PolicyNode, ProjectedPoint,
    Result, ZonesResponse,
};

/// Planning service queries used by the pipeline.
///
/// Implementations return decoded payloads; interpreting them (choosing a
/// candidate, filtering the document tree) is the pipeline's job.
#[async_trait]
pub trait PlanningApi: Send + Sync {
    /// Geocode a single-line address.
    async fn geocode(&self, address: &str) -> Result<GeocodeResponse>;

    /// Identify the parcel under a point in EPSG:3857.
    async fn identify(&self, point: ProjectedPoint) -> Result<IdentifyResponse>;

    /// Top level of the policy document tree for a valuation.
    async fn policy_index(&self, valuation_id: &str) -> Result<Vec<PolicyNode>>;

    /// Every content block of one policy document.
    async fn policy_content(&self, valuation_id: &str, document_id: &str)
        -> Result<Vec<ContentBlock>>;

    /// Zone listing with technical and numeric variations.
    async fn zone_variations(&self, valuation_id: &str) -> Result<ZonesResponse>;
}

#[async_trait]
impl PlanningApi for PlanSaClient {
    async fn geocode(&self, address: &str) -> Result<GeocodeResponse> {
        PlanSaClient::geocode(self, address).await
    }

    async fn identify(&self, point: ProjectedPoint) -> Result<IdentifyResponse> {
        PlanSaClient::identify(self, point).await
    }

    async fn policy_index(&self, valuation_id: &str) -> Result<Vec<PolicyNode>> {
        PlanSaClient::policy_index(self, valuation_id).await
    }

    async fn policy_content(
        &self,
        valuation_id: &str,
        document_id: &str,
    ) -> Result<Vec<ContentBlock>> {
        PlanSaClient::policy_content(self, valuation_id, document_id).await
    }

    async fn zone_variations(&self, valuation_id: &str) -> Result<ZonesResponse> {
        PlanSaClient::zone_variations(self, valuation_id).await
    }
}
