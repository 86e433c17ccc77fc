//! Endpoint configuration for the PlanSA client.

use std::env;
use std::time::Duration;

use crate::jsonp::JSONP_CALLBACK;

const GEOCODE_URL: &str = "https://lsa1.geohub.sa.gov.au/arcgis/rest/services/Locators/SAGAF_Valuation/GeocodeServer/findAddressCandidates";
const IDENTIFY_URL: &str = "https://lsa2.geohub.sa.gov.au/arcgis/rest/services/SAPPA/PropertyPlanningAtlasV16/MapServer/identify";
const POLICIES_URL: &str = "https://code.plan.sa.gov.au/int/_getpolicies";
const ZONES_URL: &str = "https://code.plan.sa.gov.au/int/_getzones";

/// Map extent covering South Australia in EPSG:3857.
const SA_MAP_EXTENT: &str =
    "12031445.498769322, -5605751.822245056, 17906701.24087955, -860541.106302574";

/// Parcel layer of the Property Planning Atlas.
const PARCEL_LAYERS: &str = "all:43";

// Browser-like UA; the planning services reject obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for [`crate::PlanSaClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub geocode_url: String,
    pub identify_url: String,
    pub policies_url: String,
    pub zones_url: String,

    /// Callback name requested from the geocoder's JSONP endpoint.
    pub jsonp_callback: String,

    /// Fixed `mapExtent` sent with identify queries.
    pub map_extent: String,

    /// Fixed `layers` filter sent with identify queries.
    pub identify_layers: String,

    /// Per-request timeout. Expiry surfaces as `ServiceUnavailable`.
    pub timeout: Duration,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            geocode_url: GEOCODE_URL.to_string(),
            identify_url: IDENTIFY_URL.to_string(),
            policies_url: POLICIES_URL.to_string(),
            zones_url: ZONES_URL.to_string(),
            jsonp_callback: JSONP_CALLBACK.to_string(),
            map_extent: SA_MAP_EXTENT.to_string(),
            identify_layers: PARCEL_LAYERS.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from the environment (and `.env` if present).
    ///
    /// Unset or unparseable variables keep their defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Ok(url) = env::var("PLANSA_GEOCODE_URL") {
            config.geocode_url = url;
        }
        if let Ok(url) = env::var("PLANSA_IDENTIFY_URL") {
            config.identify_url = url;
        }
        if let Ok(url) = env::var("PLANSA_POLICIES_URL") {
            config.policies_url = url;
        }
        if let Ok(url) = env::var("PLANSA_ZONES_URL") {
            config.zones_url = url;
        }
        match env::var("PLANSA_TIMEOUT_SECS").map(|v| v.parse::<u64>()) {
            Ok(Ok(secs)) => config.timeout = Duration::from_secs(secs),
            Ok(Err(_)) => tracing::warn!("PLANSA_TIMEOUT_SECS is not a number, using default"),
            Err(_) => {}
        }
        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_geocode_url(mut self, url: impl Into<String>) -> Self {
        self.geocode_url = url.into();
        self
    }

    pub fn with_identify_url(mut self, url: impl Into<String>) -> Self {
        self.identify_url = url.into();
        self
    }

    pub fn with_policies_url(mut self, url: impl Into<String>) -> Self {
        self.policies_url = url.into();
        self
    }

    pub fn with_zones_url(mut self, url: impl Into<String>) -> Self {
        self.zones_url = url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
