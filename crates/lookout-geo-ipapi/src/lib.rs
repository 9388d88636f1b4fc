// # ip-api.com Geolocation Provider
//
// Primary geolocation provider for the lookout system.
//
// ## Payload shape
//
// ip-api.com returns one flat JSON object with an explicit success
// indicator:
//
// ```json
// {
//   "status": "success",
//   "query": "8.8.8.8",
//   "country": "United States",
//   "countryCode": "US",
//   "regionName": "Virginia",
//   "city": "Ashburn",
//   "zip": "20149",
//   "lat": 39.03,
//   "lon": -77.5,
//   "timezone": "America/New_York",
//   "isp": "Google LLC",
//   "org": "Google Public DNS",
//   "as": "AS15169 Google LLC"
// }
// ```
//
// On failure the same endpoint answers 200 with `"status": "fail"` and a
// `message` field. Both that and transport-level faults are reported as
// `Error::Transport` so the orchestrator falls back uniformly.
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
const PROVIDER_NAME: &str = "ip-api.com";

/// Default endpoint base URL
pub const DEFAULT_URL: &str = "http://ip-api.com/json";

/// Raw ip-api.com payload
///
/// Every field defaults so a sparse answer still maps; the sentinel
/// substitution happens in [`IpApiProvider::into_record`].
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    query: String,
    #[serde(default)]
    country: String,
    #[serde(default, rename = "countryCode")]
    country_code: String,
    #[serde(default, rename = "regionName")]
    region_name: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    zip: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
    #[serde(default)]
    timezone: String,
    #[serde(default)]
    isp: String,
    #[serde(default)]
    org: String,
    #[serde(default, rename = "as")]
    as_number: String,
}

/// Substitute the sentinel for fields the provider left empty
fn or_unknown(value: String) -> String {
    if value.is_empty() {
        UNKNOWN.to_string()
    } else {
        value
    }
}

/// ip-api.com backed geolocation provider
pub struct IpApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl IpApiProvider {
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
            Some(ip) => format!("{}/{}", self.base_url, ip),
            None => format!("{}/", self.base_url),
        }
    }

    /// Map a successful payload into the canonical record
    fn into_record(response: IpApiResponse) -> GeoRecord {
        GeoRecord {
            ip: or_unknown(response.query),
            country: or_unknown(response.country),
            country_code: or_unknown(response.country_code),
            region: or_unknown(response.region_name),
            city: or_unknown(response.city),
            postal: or_unknown(response.zip),
            latitude: response.lat,
            longitude: response.lon,
            timezone: or_unknown(response.timezone),
            isp: or_unknown(response.isp),
            org: or_unknown(response.org),
            as_number: or_unknown(response.as_number),
            source: GeoSource::Primary,
            captured_at: Utc::now(),
        }
    }

    async fn fetch(&self, url: &str) -> Result<IpApiResponse> {
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

        // An unreadable payload is a parse fault, not a transport one:
        // it surfaces immediately instead of triggering fallback.
        let payload: IpApiResponse = response.json().await.map_err(|e| {
            Error::parse(format!("Unexpected {} payload: {}", PROVIDER_NAME, e))
        })?;

        if payload.status != "success" {
            // ip-api answers 200 with status=fail for private ranges,
            // rate limits and malformed queries.
            return Err(Error::transport(
                PROVIDER_NAME,
                format!("Provider reported failure: {}", or_unknown(payload.message)),
            ));
        }

        Ok(payload)
    }
}

#[async_trait]
impl GeoProvider for IpApiProvider {
    async fn lookup(&self, ip: Option<&str>) -> Result<GeoRecord> {
        let url = self.lookup_url(ip);
        tracing::debug!("Querying {} ({})", PROVIDER_NAME, url);

        let payload = self.fetch(&url).await?;
        Ok(Self::into_record(payload))
    }

    async fn public_ip(&self) -> Result<String> {
        // Minimal field selection: no geolocation payload requested.
        let url = format!("{}/?fields=status,message,query", self.base_url);
        let payload = self.fetch(&url).await?;

        if payload.query.is_empty() {
            return Err(Error::transport(PROVIDER_NAME, "Empty query field"));
        }
        Ok(payload.query)
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn source(&self) -> GeoSource {
        GeoSource::Primary
    }
}

/// Factory for creating ip-api.com providers
pub struct IpApiFactory;

impl GeoProviderFactory for IpApiFactory {
    fn create(&self, config: &GeoProviderConfig) -> Result<Box<dyn GeoProvider>> {
        match config {
            GeoProviderConfig::IpApi { url, timeout_secs } => Ok(Box::new(IpApiProvider::new(
                url.clone(),
                Duration::from_secs(*timeout_secs),
            ))),
            _ => Err(Error::config("Invalid config for ip-api provider")),
        }
    }
}

/// Register the ip-api.com provider with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_geo_provider("ipapi", Box::new(IpApiFactory));
}
