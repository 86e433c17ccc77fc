//! Typed errors for the zoning pipeline.
//!
//! The binary wraps these with `anyhow` context.

use plansa_client::{ApiError, Endpoint};
use thiserror::Error;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Transport failure, timeout or non-success HTTP status
    #[error("{endpoint} service unavailable (status {status:?}): {detail}")]
    ServiceUnavailable {
        endpoint: Endpoint,
        status: Option<u16>,
        detail: String,
    },

    /// Body could not be unwrapped/decoded, or an expected field is missing
    #[error("could not read {endpoint} response: {detail}")]
    ResponseUnparseable { endpoint: Endpoint, detail: String },

    /// The geocoder or identify service answered with no matches
    #[error("no site found for: {query}")]
    SiteNotFound { query: String },

    /// The policy tree has no documents under a "Zone" node
    #[error("no zone policy documents for valuation {valuation_id}")]
    NoPolicyDocuments { valuation_id: String },

    /// Pipeline configuration could not be used
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<ApiError> for PipelineError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::ServiceUnavailable {
                endpoint,
                status,
                detail,
            } => PipelineError::ServiceUnavailable {
                endpoint,
                status,
                detail,
            },
            ApiError::ResponseUnparseable { endpoint, detail } => {
                PipelineError::ResponseUnparseable { endpoint, detail }
            }
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
