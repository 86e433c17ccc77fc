//! WGS84 (EPSG:4326) ↔ Web Mercator (EPSG:3857) transform.
//!
//! Spherical Mercator as used by the ArcGIS map services. No range checks:
//! NaN and out-of-range latitudes propagate as the formulas produce them.

use std::f64::consts::PI;

/// Earth radius used by EPSG:3857, in metres.
const EARTH_RADIUS: f64 = 6_378_137.0;

/// Stateless transform between geographic degrees and projected metres.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

/// The process-wide transform, shared by reference.
pub static WEB_MERCATOR: WebMercator = WebMercator;

impl WebMercator {
    /// `(lon, lat)` in degrees → `(x, y)` in metres.
    pub fn to_projected(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = EARTH_RADIUS * lon.to_radians();
        let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        (x, y)
    }

    /// `(x, y)` in metres → `(lon, lat)` in degrees.
    pub fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        (lon, lat)
    }
}
