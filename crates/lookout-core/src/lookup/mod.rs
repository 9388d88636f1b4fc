// # IP Lookup Orchestrator
//
// Walks an ordered chain of geolocation providers, trying each exactly
// once. The chain is primary-then-secondary in the shipped configuration:
// one fallback hop, no intra-provider retries.
//
// Fallback triggers on transport-class failures only: a dead socket, a
// timeout, a non-2xx response, or a payload whose provider-specific
// status indicator says the lookup did not succeed. Parse-class faults
// surface immediately without consulting the next provider.

use crate::error::{Error, Result};
use crate::traits::{GeoProvider, GeoRecord};

/// Ordered provider chain for IP geolocation
pub struct IpLookup {
    providers: Vec<Box<dyn GeoProvider>>,
}

impl IpLookup {
    /// Create an orchestrator over `providers`, queried in order.
    pub fn new(providers: Vec<Box<dyn GeoProvider>>) -> Result<Self> {
        if providers.is_empty() {
            return Err(Error::config("At least one geolocation provider is required"));
        }
        Ok(Self { providers })
    }

    /// Names of the configured providers, in query order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Look up geolocation data for `ip`, or for the caller's own public
    /// address when `ip` is `None`.
    ///
    /// Each provider is tried at most once, in order. When the chain is
    /// exhausted the last provider's error surfaces, naming the provider
    /// so the caller can report which source failed.
    pub async fn lookup(&self, ip: Option<&str>) -> Result<GeoRecord> {
        let mut last_error = None;

        for provider in &self.providers {
            match provider.lookup(ip).await {
                Ok(record) => {
                    tracing::debug!(
                        "Geolocation lookup succeeded via {} (source={})",
                        provider.name(),
                        record.source
                    );
                    return Ok(record);
                }
                Err(e) if e.triggers_fallback() => {
                    tracing::warn!(
                        "Provider {} failed, falling back to next provider: {}",
                        provider.name(),
                        e
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Other("No providers configured".to_string())))
    }

    /// Fetch the caller's public IP as a raw string, walking the same
    /// chain with the same single-hop discipline. Nothing is persisted.
    pub async fn public_ip(&self) -> Result<String> {
        let mut last_error = None;

        for provider in &self.providers {
            match provider.public_ip().await {
                Ok(ip) => return Ok(ip),
                Err(e) if e.triggers_fallback() => {
                    tracing::warn!(
                        "Public IP via {} failed, falling back: {}",
                        provider.name(),
                        e
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Other("No providers configured".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::GeoSource;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        name: &'static str,
        source: GeoSource,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl StubProvider {
        fn ok(name: &'static str, source: GeoSource) -> Self {
            Self {
                name,
                source,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(name: &'static str, source: GeoSource) -> Self {
            Self {
                name,
                source,
                fail: true,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn record(&self) -> GeoRecord {
            GeoRecord {
                ip: "8.8.8.8".to_string(),
                country: "United States".to_string(),
                country_code: "US".to_string(),
                region: "California".to_string(),
                city: "Mountain View".to_string(),
                postal: "94043".to_string(),
                latitude: 37.4,
                longitude: -122.0,
                timezone: "America/Los_Angeles".to_string(),
                isp: "Google LLC".to_string(),
                org: "Google LLC".to_string(),
                as_number: "AS15169".to_string(),
                source: self.source,
                captured_at: chrono::Utc::now(),
            }
        }
    }

    #[async_trait]
    impl GeoProvider for StubProvider {
        async fn lookup(&self, _ip: Option<&str>) -> Result<GeoRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::transport(self.name, "unreachable"))
            } else {
                Ok(self.record())
            }
        }

        async fn public_ip(&self) -> Result<String> {
            if self.fail {
                Err(Error::transport(self.name, "unreachable"))
            } else {
                Ok("8.8.8.8".to_string())
            }
        }

        fn name(&self) -> &'static str {
            self.name
        }

        fn source(&self) -> GeoSource {
            self.source
        }
    }

    #[tokio::test]
    async fn primary_success_skips_secondary() {
        let lookup = IpLookup::new(vec![
            Box::new(StubProvider::ok("primary", GeoSource::Primary)),
            Box::new(StubProvider::failing("secondary", GeoSource::Secondary)),
        ])
        .unwrap();

        let record = lookup.lookup(None).await.unwrap();
        assert_eq!(record.source, GeoSource::Primary);
    }

    #[tokio::test]
    async fn primary_failure_falls_back_once() {
        let lookup = IpLookup::new(vec![
            Box::new(StubProvider::failing("primary", GeoSource::Primary)),
            Box::new(StubProvider::ok("secondary", GeoSource::Secondary)),
        ])
        .unwrap();

        let record = lookup.lookup(Some("8.8.8.8")).await.unwrap();
        assert_eq!(record.source, GeoSource::Secondary);
    }

    #[tokio::test]
    async fn exhausted_chain_surfaces_last_provider_error() {
        let lookup = IpLookup::new(vec![
            Box::new(StubProvider::failing("primary", GeoSource::Primary)),
            Box::new(StubProvider::failing("secondary", GeoSource::Secondary)),
        ])
        .unwrap();

        let err = lookup.lookup(None).await.unwrap_err();
        match err {
            Error::Transport { provider, .. } => assert_eq!(provider, "secondary"),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn each_provider_is_tried_at_most_once() {
        let primary = StubProvider::failing("primary", GeoSource::Primary);
        let secondary = StubProvider::failing("secondary", GeoSource::Secondary);
        let primary_calls = Arc::clone(&primary.calls);
        let secondary_calls = Arc::clone(&secondary.calls);

        let lookup = IpLookup::new(vec![Box::new(primary), Box::new(secondary)]).unwrap();
        let _ = lookup.lookup(None).await;

        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_chain_is_a_config_error() {
        assert!(matches!(
            IpLookup::new(Vec::new()),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn public_ip_falls_back_like_lookup() {
        let lookup = IpLookup::new(vec![
            Box::new(StubProvider::failing("primary", GeoSource::Primary)),
            Box::new(StubProvider::ok("secondary", GeoSource::Secondary)),
        ])
        .unwrap();

        assert_eq!(lookup.public_ip().await.unwrap(), "8.8.8.8");
    }
}
