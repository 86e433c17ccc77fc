//! JSONP envelope handling for the GeoHub geocoder.
//!
//! The geocoder only answers with `callback(<json>)`. The payload starts right
//! after the first `callback(` and ends at the last `)` in the body.

use crate::error::{ApiError, Endpoint, Result};

/// Callback name the geocoder is asked to wrap its payload in.
pub const JSONP_CALLBACK: &str = "angular.callbacks._5";

/// Locate the JSON payload inside a JSONP body.
///
/// Returns `None` when either delimiter is missing or they are out of order.
pub fn strip_jsonp<'a>(body: &'a str, callback: &str) -> Option<&'a str> {
    let prefix = format!("{}(", callback);
    let start = body.find(&prefix)? + prefix.len();
    let end = body.rfind(')')?;
    if end < start {
        return None;
    }
    Some(&body[start..end])
}

/// Like [`strip_jsonp`], failing with `ResponseUnparseable` carrying the body prefix.
pub fn unwrap_jsonp<'a>(body: &'a str, callback: &str) -> Result<&'a str> {
    strip_jsonp(body, callback).ok_or_else(|| ApiError::unparseable(Endpoint::Geocode, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_jsonp_returns_payload() {
        let body = r#"angular.callbacks._5({"candidates":[]})"#;
        assert_eq!(
            strip_jsonp(body, JSONP_CALLBACK),
            Some(r#"{"candidates":[]}"#)
        );
    }

    #[test]
    fn test_strip_jsonp_tolerates_trailing_semicolon() {
        let body = "/**/angular.callbacks._5({\"a\":1});\n";
        assert_eq!(strip_jsonp(body, JSONP_CALLBACK), Some("{\"a\":1}"));
    }

    #[test]
    fn test_strip_jsonp_missing_prefix() {
        assert_eq!(strip_jsonp(r#"{"candidates":[]}"#, JSONP_CALLBACK), None);
    }

    #[test]
    fn test_strip_jsonp_missing_close() {
        assert_eq!(strip_jsonp("angular.callbacks._5({", JSONP_CALLBACK), None);
    }

    #[test]
    fn test_strip_jsonp_close_before_open() {
        assert_eq!(strip_jsonp(") angular.callbacks._5(", JSONP_CALLBACK), None);
    }

    #[test]
    fn test_unwrap_jsonp_error_carries_body_prefix() {
        let body = format!("<html>{}</html>", "x".repeat(1000));
        let err = unwrap_jsonp(&body, JSONP_CALLBACK).unwrap_err();
        match err {
            ApiError::ResponseUnparseable { endpoint, detail } => {
                assert_eq!(endpoint, Endpoint::Geocode);
                assert_eq!(detail.len(), 500);
                assert!(detail.starts_with("<html>"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_wrapped_payload_round_trips(payload in ".*") {
            let body = format!("{}({})", JSONP_CALLBACK, payload);
            prop_assert_eq!(strip_jsonp(&body, JSONP_CALLBACK), Some(payload.as_str()));
        }

        #[test]
        fn prop_body_without_close_paren_fails(payload in "[^)]*") {
            let body = format!("{}({}", JSONP_CALLBACK, payload);
            prop_assert!(unwrap_jsonp(&body, JSONP_CALLBACK).is_err());
        }
    }
}
