//! Address / coordinate → [`Site`].

use plansa_client::{body_prefix, Endpoint, GeocodeCandidate, IdentifyResult, ProjectedPoint};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::geo::WEB_MERCATOR;
use crate::traits::PlanningApi;
use crate::types::{Site, SiteQuery};

/// Resolve either kind of query.
pub async fn resolve<A: PlanningApi + ?Sized>(api: &A, query: &SiteQuery) -> Result<Site> {
    match query {
        SiteQuery::Address { address } => resolve_by_address(api, address).await,
        SiteQuery::Coordinates {
            latitude,
            longitude,
        } => resolve_by_coordinates(api, *latitude, *longitude).await,
    }
}

/// Geocode an address and take the first candidate.
pub async fn resolve_by_address<A: PlanningApi + ?Sized>(api: &A, address: &str) -> Result<Site> {
    let response = api.geocode(address).await?;
    debug!(address, candidates = response.candidates.len(), "Geocoded address");

    let raw = response
        .candidates
        .first()
        .ok_or_else(|| PipelineError::SiteNotFound {
            query: address.to_string(),
        })?;
    let candidate: GeocodeCandidate = parse_entry(Endpoint::Geocode, raw)?;

    let valuation_id = candidate.attributes.valuation.into_string();
    require_valuation(Endpoint::Geocode, &valuation_id, raw)?;

    let site = Site {
        full_address: candidate.address,
        latitude: candidate.location.y,
        longitude: candidate.location.x,
        valuation_id,
        parcel: None,
    };
    info!(address = %site.full_address, valuation_id = %site.valuation_id, "Resolved site by address");
    Ok(site)
}

/// Identify the parcel under a WGS84 point. The site keeps the caller's
/// coordinates.
pub async fn resolve_by_coordinates<A: PlanningApi + ?Sized>(
    api: &A,
    latitude: f64,
    longitude: f64,
) -> Result<Site> {
    let (x, y) = WEB_MERCATOR.to_projected(longitude, latitude);
    let response = api.identify(ProjectedPoint { x, y }).await?;
    debug!(latitude, longitude, x, y, results = response.results.len(), "Identified point");

    let raw = response
        .results
        .first()
        .ok_or_else(|| PipelineError::SiteNotFound {
            query: SiteQuery::coordinates(latitude, longitude).to_string(),
        })?;
    let result: IdentifyResult = parse_entry(Endpoint::Identify, raw)?;

    let attributes = result.attributes;
    let valuation_id = attributes.valuation_no.as_str().to_string();
    require_valuation(Endpoint::Identify, &valuation_id, raw)?;

    let site = Site {
        full_address: attributes.location.trim().to_string(),
        latitude,
        longitude,
        valuation_id,
        parcel: Some(attributes),
    };
    info!(address = %site.full_address, valuation_id = %site.valuation_id, "Resolved site by coordinates");
    Ok(site)
}

/// Decode one candidate/result; a missing field reports the entry itself.
fn parse_entry<T: DeserializeOwned>(endpoint: Endpoint, raw: &Value) -> Result<T> {
    T::deserialize(raw).map_err(|e| PipelineError::ResponseUnparseable {
        endpoint,
        detail: format!("{}: {}", e, body_prefix(&raw.to_string())),
    })
}

fn require_valuation(endpoint: Endpoint, valuation_id: &str, raw: &Value) -> Result<()> {
    if valuation_id.is_empty() {
        return Err(PipelineError::ResponseUnparseable {
            endpoint,
            detail: format!("empty valuation id: {}", body_prefix(&raw.to_string())),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCall, MockPlanningApi};

    const ADDRESS: &str = "9 ELIZABETH ST NORWOOD SA 5067";

    fn geocode_body(candidates: &str) -> String {
        MockPlanningApi::jsonp(&format!(r#"{{"candidates": {}}}"#, candidates))
    }

    #[tokio::test]
    async fn test_resolve_by_address_takes_first_candidate() {
        let api = MockPlanningApi::new().with_geocode(
            ADDRESS,
            geocode_body(
                r#"[
                    {"address": "9 ELIZABETH ST, NORWOOD SA 5067", "location": {"x": 138.6317, "y": -34.9213}, "attributes": {"Valuation": 2317045002}, "score": 100},
                    {"address": "9 ELIZABETH ST, EVANDALE SA 5069", "location": {"x": 138.63, "y": -34.90}, "attributes": {"Valuation": "1111111111"}}
                ]"#,
            ),
        );

        let site = resolve_by_address(&api, ADDRESS).await.unwrap();
        assert_eq!(site.full_address, "9 ELIZABETH ST, NORWOOD SA 5067");
        assert_eq!(site.valuation_id, "2317045002");
        assert_eq!(site.latitude, -34.9213);
        assert_eq!(site.longitude, 138.6317);
        assert!(site.parcel.is_none());
    }

    #[tokio::test]
    async fn test_no_candidates_is_site_not_found() {
        let api = MockPlanningApi::new().with_geocode(ADDRESS, geocode_body("[]"));
        let err = resolve_by_address(&api, ADDRESS).await.unwrap_err();
        assert!(matches!(err, PipelineError::SiteNotFound { ref query } if query == ADDRESS));
    }

    #[tokio::test]
    async fn test_geocoder_error_envelope_is_not_site_not_found() {
        let api = MockPlanningApi::new().with_geocode(
            ADDRESS,
            MockPlanningApi::jsonp(
                r#"{"error": {"code": 500, "message": "Unable to complete operation.", "details": []}}"#,
            ),
        );
        match resolve_by_address(&api, ADDRESS).await.unwrap_err() {
            PipelineError::ServiceUnavailable { status, detail, .. } => {
                assert_eq!(status, Some(500));
                assert!(detail.contains("Unable to complete operation."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_candidate_missing_valuation_reports_candidate() {
        let api = MockPlanningApi::new().with_geocode(
            ADDRESS,
            geocode_body(r#"[{"address": "9 ELIZABETH ST", "location": {"x": 1.0, "y": 2.0}, "attributes": {}}]"#),
        );
        match resolve_by_address(&api, ADDRESS).await.unwrap_err() {
            PipelineError::ResponseUnparseable { endpoint, detail } => {
                assert_eq!(endpoint, Endpoint::Geocode);
                assert!(detail.contains("Valuation"));
                assert!(detail.contains("9 ELIZABETH ST"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_broken_jsonp_is_unparseable() {
        let api = MockPlanningApi::new().with_geocode(ADDRESS, "<html>gateway error</html>");
        match resolve_by_address(&api, ADDRESS).await.unwrap_err() {
            PipelineError::ResponseUnparseable { detail, .. } => {
                assert_eq!(detail, "<html>gateway error</html>")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_by_coordinates_projects_and_maps_fields() {
        let api = MockPlanningApi::new().with_identify(
            r#"{"results": [{
                "layerId": 43, "layerName": "Parcels", "value": "3512345678",
                "attributes": {"Location": " 9 ELIZABETH ST NORWOOD ", "Valuation No": "3512345678",
                               "Title Prefix": "CT", "Title Volume": "5123", "Title Folio": "456"}
            }]}"#,
        );

        let site = resolve_by_coordinates(&api, -34.88994984664242, 138.58712214002236)
            .await
            .unwrap();
        assert_eq!(site.full_address, "9 ELIZABETH ST NORWOOD");
        assert_eq!(site.valuation_id, "3512345678");
        assert_eq!(site.latitude, -34.88994984664242);
        assert_eq!(
            site.parcel.as_ref().and_then(|p| p.title_reference()).as_deref(),
            Some("CT 5123/456")
        );

        match &api.calls()[0] {
            MockCall::Identify(point) => {
                assert!((point.x - 15_427_447.87).abs() < 0.01);
                assert!((point.y - -4_148_935.81).abs() < 0.01);
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_identify_results() {
        let api = MockPlanningApi::new().with_identify(r#"{"results": []}"#);
        let err = resolve_by_coordinates(&api, -34.9, 138.6).await.unwrap_err();
        assert!(matches!(err, PipelineError::SiteNotFound { ref query } if query == "-34.9,138.6"));
    }

    #[tokio::test]
    async fn test_service_down() {
        let api = MockPlanningApi::new().with_unavailable(Endpoint::Geocode);
        let err = resolve(&api, &SiteQuery::address(ADDRESS)).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ServiceUnavailable { status: Some(503), .. }
        ));
    }
}
