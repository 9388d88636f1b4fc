// # Geolocation Provider Trait
//
// Defines the interface for querying an external IP geolocation source.
//
// ## Implementations
//
// - ip-api.com shaped payloads: `lookout-geo-ipapi` crate (primary)
// - ipinfo.io shaped payloads: `lookout-geo-ipinfo` crate (secondary)
//
// Every provider owns exactly one mapping function from its own payload
// shape into [`GeoRecord`], so downstream history/journal/display code
// never sees provider-specific fields. Adding a provider means adding a
// crate with one such mapping, not branching anywhere downstream.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for string fields a provider did not supply.
///
/// Canonical records never carry null/absent fields: strings default to
/// this value and numeric fields to `0`.
pub const UNKNOWN: &str = "Unknown";

/// Which provider in the chain produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoSource {
    /// First provider queried
    Primary,
    /// The single fallback hop
    Secondary,
}

impl std::fmt::Display for GeoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoSource::Primary => write!(f, "primary"),
            GeoSource::Secondary => write!(f, "secondary"),
        }
    }
}

/// One normalized geolocation result
///
/// This is the canonical record shape every provider payload is mapped
/// into before persistence or display. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    /// The IP address the record describes
    pub ip: String,
    /// Country name
    pub country: String,
    /// ISO country code
    pub country_code: String,
    /// Region/state name
    pub region: String,
    /// City name
    pub city: String,
    /// Postal code
    pub postal: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// IANA timezone name
    pub timezone: String,
    /// Internet service provider
    pub isp: String,
    /// Owning organization
    pub org: String,
    /// Autonomous system identifier
    pub as_number: String,
    /// Which provider produced this record
    pub source: GeoSource,
    /// When the lookup completed
    pub captured_at: DateTime<Utc>,
}

/// Trait for geolocation provider implementations
///
/// Providers are single-shot and stateless: one HTTP request per call,
/// no retries, no caching. Retry/fallback policy is owned by the lookup
/// orchestrator.
///
/// A provider payload that is readable but carries an unsuccessful
/// status indicator must be reported as [`crate::Error::Transport`] so
/// the orchestrator falls back uniformly on dead sockets and
/// unsuccessful payloads alike.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Look up geolocation data for `ip`, or for the caller's own public
    /// address when `ip` is `None`.
    async fn lookup(&self, ip: Option<&str>) -> crate::Result<GeoRecord>;

    /// Fetch the caller's public IP as a raw string from the provider's
    /// minimal endpoint. No geolocation payload is requested.
    async fn public_ip(&self) -> crate::Result<String>;

    /// Provider name used in logs and error attribution
    fn name(&self) -> &'static str;

    /// Position this provider reports in the canonical record
    fn source(&self) -> GeoSource;
}

/// Helper trait for constructing geolocation providers from configuration
pub trait GeoProviderFactory: Send + Sync {
    /// Create a provider instance from configuration
    fn create(
        &self,
        config: &crate::config::GeoProviderConfig,
    ) -> crate::Result<Box<dyn GeoProvider>>;
}

impl GeoRecord {
    /// Split a combined `"lat,lon"` field into two floats.
    ///
    /// Either half that fails to parse defaults to `0.0`; a record never
    /// carries non-numeric coordinates.
    pub fn split_coordinates(loc: &str) -> (f64, f64) {
        let mut parts = loc.splitn(2, ',');
        let lat = parts
            .next()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(0.0);
        let lon = parts
            .next()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(0.0);
        (lat, lon)
    }
}
