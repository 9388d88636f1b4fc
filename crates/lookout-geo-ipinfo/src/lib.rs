// # ipinfo.io Geolocation Provider
//
// Secondary (single fallback hop) geolocation provider for the lookout
// system.
//
// ## Payload shape
//
// ipinfo.io returns a different schema from the primary provider: no
// success indicator, coordinates combined into one `loc` field, and the
// ISP folded into `org`:
//
// ```json
// {
//   "ip": "8.8.8.8",
//   "city": "Mountain View",
//   "region": "California",
//   "country": "US",
//   "loc": "37.4056,-122.0775",
//   "org": "AS15169 Google LLC",
//   "postal": "94043",
//   "timezone": "America/Los_Angeles"
// }
// ```
//
// Failures arrive as non-2xx responses (404 for bogons, 429 for rate
// limits). `loc` is split into two floats; a malformed pair defaults both
// coordinates to zero rather than failing the lookup.
//
// ## Constraints
//
// One HTTP request per call, no retries, no caching: fallback policy is
// owned by the orchestrator, state by the record store.

use async_trait::async_trait;
use chrono::Utc;
use lookout_core::config::GeoProviderConfig;
use lookout_core::traits::geo_provider::UNKNOWN;
use lookout_core::traits::{GeoProvider, GeoProviderFactory, GeoRecord, GeoSource};
use lookout_core::{Error, ProviderRegistry, Result};
use serde::Deserialize;
use std::time::Duration;

/// Provider name used in logs and error attribution
const PROVIDER_NAME: &str = "ipinfo.io";

/// Default endpoint base URL
pub const DEFAULT_URL: &str = "https://ipinfo.io";

/// Raw ipinfo.io payload
#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    #[serde(default)]
    ip: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    loc: String,
    #[serde(default)]
    org: String,
    #[serde(default)]
    postal: String,
    #[serde(default)]
    timezone: String,
}

fn or_unknown(value: String) -> String {
    if value.is_empty() {
        UNKNOWN.to_string()
    } else {
        value
    }
}

/// ipinfo.io backed geolocation provider
pub struct IpInfoProvider {
    base_url: String,
    client: reqwest::Client,
}

impl IpInfoProvider {
    /// Create a provider against `base_url` with the given request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    fn lookup_url(&self, ip: Option<&str>) -> String {
        match ip {
            Some(ip) => format!("{}/{}/json", self.base_url, ip),
            None => format!("{}/json", self.base_url),
        }
    }

    /// Map a payload into the canonical record.
    ///
    /// ipinfo has no separate ISP field; `org` covers both, and the AS id
    /// is its leading token when present.
    fn into_record(response: IpInfoResponse) -> GeoRecord {
        let (latitude, longitude) = GeoRecord::split_coordinates(&response.loc);

        let as_number = response
            .org
            .split_whitespace()
            .next()
            .filter(|token| token.starts_with("AS"))
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let org = or_unknown(response.org);

        GeoRecord {
            ip: or_unknown(response.ip),
            country: or_unknown(response.country.clone()),
            country_code: or_unknown(response.country),
            region: or_unknown(response.region),
            city: or_unknown(response.city),
            postal: or_unknown(response.postal),
            latitude,
            longitude,
            timezone: or_unknown(response.timezone),
            isp: org.clone(),
            org,
            as_number,
            source: GeoSource::Secondary,
            captured_at: Utc::now(),
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(PROVIDER_NAME, format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::transport(
                PROVIDER_NAME,
                format!("HTTP error: {}", response.status()),
            ));
        }

        Ok(response)
    }
}

#[async_trait]
impl GeoProvider for IpInfoProvider {
    async fn lookup(&self, ip: Option<&str>) -> Result<GeoRecord> {
        let url = self.lookup_url(ip);
        tracing::debug!("Querying {} ({})", PROVIDER_NAME, url);

        // An unreadable payload is a parse fault, not a transport one.
        let payload: IpInfoResponse = self.get(&url).await?.json().await.map_err(|e| {
            Error::parse(format!("Unexpected {} payload: {}", PROVIDER_NAME, e))
        })?;

        Ok(Self::into_record(payload))
    }

    async fn public_ip(&self) -> Result<String> {
        // Plain-text endpoint: the body is the address and nothing else.
        let url = format!("{}/ip", self.base_url);
        let body = self
            .get(&url)
            .await?
            .text()
            .await
            .map_err(|e| Error::transport(PROVIDER_NAME, format!("Failed to read response: {}", e)))?;

        let ip = body.trim();
        if ip.is_empty() {
            return Err(Error::transport(PROVIDER_NAME, "Empty response body"));
        }
        Ok(ip.to_string())
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn source(&self) -> GeoSource {
        GeoSource::Secondary
    }
}

/// Factory for creating ipinfo.io providers
pub struct IpInfoFactory;

impl GeoProviderFactory for IpInfoFactory {
    fn create(&self, config: &GeoProviderConfig) -> Result<Box<dyn GeoProvider>> {
        match config {
            GeoProviderConfig::IpInfo { url, timeout_secs } => Ok(Box::new(IpInfoProvider::new(
                url.clone(),
                Duration::from_secs(*timeout_secs),
            ))),
            _ => Err(Error::config("Invalid config for ipinfo provider")),
        }
    }
}

/// Register the ipinfo.io provider with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_geo_provider("ipinfo", Box::new(IpInfoFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "ip": "8.8.8.8",
        "city": "Mountain View",
        "region": "California",
        "country": "US",
        "loc": "37.4056,-122.0775",
        "org": "AS15169 Google LLC",
        "postal": "94043",
        "timezone": "America/Los_Angeles"
    }"#;

    #[test]
    fn payload_maps_with_split_coordinates() {
        let payload: IpInfoResponse = serde_json::from_str(PAYLOAD).unwrap();
        let record = IpInfoProvider::into_record(payload);

        assert_eq!(record.ip, "8.8.8.8");
        assert_eq!(record.latitude, 37.4056);
        assert_eq!(record.longitude, -122.0775);
        assert_eq!(record.as_number, "AS15169");
        assert_eq!(record.org, "AS15169 Google LLC");
        assert_eq!(record.source, GeoSource::Secondary);
    }

    #[test]
    fn malformed_loc_defaults_coordinates_to_zero() {
        let payload: IpInfoResponse =
            serde_json::from_str(r#"{"ip": "8.8.8.8", "loc": "nowhere"}"#).unwrap();
        let record = IpInfoProvider::into_record(payload);

        assert_eq!(record.latitude, 0.0);
        assert_eq!(record.longitude, 0.0);
        // Coordinates are numeric sentinels, strings are textual ones.
        assert_eq!(record.city, UNKNOWN);
    }

    #[test]
    fn org_without_as_prefix_leaves_as_number_unknown() {
        let payload: IpInfoResponse =
            serde_json::from_str(r#"{"ip": "8.8.8.8", "org": "Example Networks"}"#).unwrap();
        let record = IpInfoProvider::into_record(payload);

        assert_eq!(record.as_number, UNKNOWN);
        assert_eq!(record.org, "Example Networks");
    }

    #[test]
    fn lookup_url_branches_on_explicit_ip() {
        let provider = IpInfoProvider::new(DEFAULT_URL, Duration::from_secs(10));
        assert_eq!(
            provider.lookup_url(Some("8.8.8.8")),
            "https://ipinfo.io/8.8.8.8/json"
        );
        assert_eq!(provider.lookup_url(None), "https://ipinfo.io/json");
    }

    #[test]
    fn factory_rejects_foreign_config() {
        let factory = IpInfoFactory;

        let config = GeoProviderConfig::IpInfo {
            url: DEFAULT_URL.to_string(),
            timeout_secs: 10,
        };
        assert!(factory.create(&config).is_ok());

        let other = GeoProviderConfig::default_primary();
        assert!(factory.create(&other).is_err());
    }

    /// Depends on external network service; run manually.
    #[tokio::test]
    #[ignore]
    async fn live_public_ip_is_parseable() {
        let provider = IpInfoProvider::new(DEFAULT_URL, Duration::from_secs(10));
        let ip = provider.public_ip().await.unwrap();
        assert!(ip.parse::<std::net::IpAddr>().is_ok());
    }
}
