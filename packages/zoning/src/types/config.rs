//! Configuration for the resolution pipeline.

use std::env;
use std::path::PathBuf;

use crate::extract::TableMarkers;

/// Configuration for [`crate::Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory for pretty-printed policy snapshots. `None` disables the
    /// snapshot side effect.
    pub export_dir: Option<PathBuf>,

    /// Upper bound on policy documents fetched at the same time.
    ///
    /// Results are always returned in document-tree order. Default: 4.
    pub max_concurrent_fetches: usize,

    /// Also fetch the zone's technical and numeric variations.
    ///
    /// Default: true.
    pub fetch_variations: bool,

    /// DOM markers of the heading-anchored table layout.
    pub markers: TableMarkers,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            export_dir: None,
            max_concurrent_fetches: 4,
            fetch_variations: true,
            markers: TableMarkers::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from the environment (and `.env` if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Ok(dir) = env::var("ZONING_EXPORT_DIR") {
            if !dir.trim().is_empty() {
                config.export_dir = Some(PathBuf::from(dir));
            }
        }
        if let Ok(raw) = env::var("ZONING_MAX_CONCURRENT_FETCHES") {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => config.max_concurrent_fetches = n,
                _ => tracing::warn!(value = %raw, "ZONING_MAX_CONCURRENT_FETCHES must be a positive number, using default"),
            }
        }
        config
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    /// Set the fetch concurrency; zero is treated as one.
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    pub fn with_variations(mut self, fetch: bool) -> Self {
        self.fetch_variations = fetch;
        self
    }

    pub fn with_markers(mut self, markers: TableMarkers) -> Self {
        self.markers = markers;
        self
    }
}
