//! Error types for the PlanSA client.

use std::fmt;

use thiserror::Error;

/// Result type for PlanSA client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Number of characters of a raw response body kept for diagnostics.
pub const BODY_PREFIX_CHARS: usize = 500;

/// The remote endpoint a request was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Geocode,
    Identify,
    PolicyIndex,
    PolicyContent,
    ZoneVariations,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::Geocode => "geocode",
            Endpoint::Identify => "identify",
            Endpoint::PolicyIndex => "policy index",
            Endpoint::PolicyContent => "policy content",
            Endpoint::ZoneVariations => "zone variations",
        };
        f.write_str(name)
    }
}

/// PlanSA client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure, timeout, non-2xx status or the service's own error envelope
    #[error("{endpoint} service unavailable (status {status:?}): {detail}")]
    ServiceUnavailable {
        endpoint: Endpoint,
        status: Option<u16>,
        detail: String,
    },

    /// Body could not be unwrapped or decoded into the expected shape
    #[error("could not read {endpoint} response: {detail}")]
    ResponseUnparseable { endpoint: Endpoint, detail: String },
}

impl ApiError {
    pub(crate) fn transport(endpoint: Endpoint, err: reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        ApiError::ServiceUnavailable {
            endpoint,
            status: err.status().map(|s| s.as_u16()),
            detail,
        }
    }

    pub(crate) fn unparseable(endpoint: Endpoint, body: &str) -> Self {
        ApiError::ResponseUnparseable {
            endpoint,
            detail: body_prefix(body),
        }
    }

    /// The endpoint the failed request targeted.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ApiError::ServiceUnavailable { endpoint, .. }
            | ApiError::ResponseUnparseable { endpoint, .. } => *endpoint,
        }
    }
}

/// First [`BODY_PREFIX_CHARS`] characters of a body, split on a char boundary.
pub fn body_prefix(body: &str) -> String {
    body.chars().take(BODY_PREFIX_CHARS).collect()
}
