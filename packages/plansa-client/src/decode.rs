//! Body decoding, kept separate from transport so it can be tested offline.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, Endpoint, Result};
use crate::jsonp::unwrap_jsonp;
use crate::types::{ContentBlock, GeocodeResponse, IdentifyResponse, PolicyNode, ZonesResponse};

/// Decode a geocoder JSONP body.
pub fn decode_geocode(body: &str, callback: &str) -> Result<GeocodeResponse> {
    let json = unwrap_jsonp(body, callback)?;
    let value: Value =
        serde_json::from_str(json).map_err(|_| ApiError::unparseable(Endpoint::Geocode, body))?;
    decode_arcgis(Endpoint::Geocode, value, body)
}

pub fn decode_identify(body: &str) -> Result<IdentifyResponse> {
    let value: Value =
        serde_json::from_str(body).map_err(|_| ApiError::unparseable(Endpoint::Identify, body))?;
    decode_arcgis(Endpoint::Identify, value, body)
}

pub fn decode_policy_index(body: &str) -> Result<Vec<PolicyNode>> {
    decode_json(Endpoint::PolicyIndex, body)
}

pub fn decode_policy_content(body: &str) -> Result<Vec<ContentBlock>> {
    decode_json(Endpoint::PolicyContent, body)
}

pub fn decode_zone_variations(body: &str) -> Result<ZonesResponse> {
    decode_json(Endpoint::ZoneVariations, body)
}

/// Parse a plain JSON body into `T`, honouring the planning services' error envelope.
///
/// The `code.plan.sa.gov.au` endpoints answer failures with HTTP 200 and a
/// `{"status": ..., "message": ...}` object, which is reported as
/// `ServiceUnavailable` rather than a shape mismatch.
pub fn decode_json<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> Result<T> {
    let value: Value =
        serde_json::from_str(body).map_err(|_| ApiError::unparseable(endpoint, body))?;

    if let Some(status) = value.as_object().and_then(|o| o.get("status")) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(ApiError::ServiceUnavailable {
            endpoint,
            status: None,
            detail: format!("{} - {}", display_value(status), message),
        });
    }

    serde_json::from_value(value).map_err(|e| ApiError::ResponseUnparseable {
        endpoint,
        detail: format!("{}: {}", e, crate::error::body_prefix(body)),
    })
}

/// ArcGIS REST services answer failures with HTTP 200 and
/// `{"error": {"code": ..., "message": ..., "details": [...]}}`.
fn decode_arcgis<T: DeserializeOwned>(endpoint: Endpoint, value: Value, body: &str) -> Result<T> {
    if let Some(error) = value.get("error").filter(|e| e.is_object()) {
        let code = error.get("code").and_then(Value::as_u64);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let details = error
            .get("details")
            .and_then(Value::as_array)
            .map(|d| d.iter().filter_map(Value::as_str).collect::<Vec<_>>().join("; "))
            .unwrap_or_default();
        let detail = match (code, details.is_empty()) {
            (Some(code), true) => format!("{} - {}", code, message),
            (Some(code), false) => format!("{} - {} ({})", code, message, details),
            (None, true) => message.to_string(),
            (None, false) => format!("{} ({})", message, details),
        };
        return Err(ApiError::ServiceUnavailable {
            endpoint,
            status: code.and_then(|c| u16::try_from(c).ok()),
            detail,
        });
    }

    serde_json::from_value(value).map_err(|e| ApiError::ResponseUnparseable {
        endpoint,
        detail: format!("{}: {}", e, crate::error::body_prefix(body)),
    })
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonp::JSONP_CALLBACK;

    #[test]
    fn test_decode_geocode_unwraps_jsonp() {
        let body = r#"angular.callbacks._5({"spatialReference":{"wkid":4326},"candidates":[{"address":"9 ELIZABETH ST, NORWOOD, 5067","location":{"x":138.63,"y":-34.92},"score":100,"attributes":{"Valuation":"2417355007"}}]})"#;
        let response = decode_geocode(body, JSONP_CALLBACK).unwrap();
        assert_eq!(response.candidates.len(), 1);
    }

    #[test]
    fn test_decode_geocode_invalid_json_inside_envelope() {
        let body = "angular.callbacks._5({not json})";
        let err = decode_geocode(body, JSONP_CALLBACK).unwrap_err();
        assert!(matches!(
            err,
            ApiError::ResponseUnparseable { endpoint: Endpoint::Geocode, ref detail } if detail == body
        ));
    }

    #[test]
    fn test_decode_geocode_error_envelope_is_service_error() {
        let body = r#"angular.callbacks._5({"error":{"code":500,"message":"Unable to complete operation.","details":[]}})"#;
        match decode_geocode(body, JSONP_CALLBACK).unwrap_err() {
            ApiError::ServiceUnavailable { endpoint, status, detail } => {
                assert_eq!(endpoint, Endpoint::Geocode);
                assert_eq!(status, Some(500));
                assert_eq!(detail, "500 - Unable to complete operation.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_geocode_missing_candidates_is_unparseable() {
        let err = decode_geocode("angular.callbacks._5({})", JSONP_CALLBACK).unwrap_err();
        match err {
            ApiError::ResponseUnparseable { endpoint, detail } => {
                assert_eq!(endpoint, Endpoint::Geocode);
                assert!(detail.contains("candidates"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_identify_error_envelope_keeps_details() {
        let body = r#"{"error":{"code":400,"message":"Invalid or missing input parameters.","details":["'geometry' parameter is invalid"]}}"#;
        match decode_identify(body).unwrap_err() {
            ApiError::ServiceUnavailable { endpoint, status, detail } => {
                assert_eq!(endpoint, Endpoint::Identify);
                assert_eq!(status, Some(400));
                assert!(detail.contains("Invalid or missing input parameters."));
                assert!(detail.contains("'geometry' parameter is invalid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_identify_missing_results_is_unparseable() {
        assert!(matches!(
            decode_identify(r#"{"spatialReference":{"wkid":3857}}"#),
            Err(ApiError::ResponseUnparseable { endpoint: Endpoint::Identify, .. })
        ));
    }

    #[test]
    fn test_status_envelope_is_service_error() {
        let err = decode_policy_index(r#"{"status":"error","message":"Invalid term"}"#).unwrap_err();
        match err {
            ApiError::ServiceUnavailable { endpoint, status, detail } => {
                assert_eq!(endpoint, Endpoint::PolicyIndex);
                assert_eq!(status, None);
                assert_eq!(detail, "error - Invalid term");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_wrong_shape_is_unparseable() {
        let err = decode_policy_content(r#"[{"Title":"no content"}]"#).unwrap_err();
        assert!(matches!(
            err,
            ApiError::ResponseUnparseable { endpoint: Endpoint::PolicyContent, .. }
        ));
    }

    #[test]
    fn test_decode_zone_variations() {
        let zones = decode_zone_variations(
            r#"{"List":[{"GroupType":"Local Variation (TNV)","Description":"<p>Maximum Building Height (Levels)</p>","Code":"V0004|_2_2_2_2_2"}]}"#,
        )
        .unwrap();
        assert_eq!(zones.list.len(), 1);
        assert_eq!(zones.list[0].code.as_deref(), Some("V0004|_2_2_2_2_2"));
    }
}
