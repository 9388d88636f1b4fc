//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that verify the orchestration
//! contracts without real network or numbering-plan lookups.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use lookout_core::config::TrackerConfig;
use lookout_core::error::{Error, Result};
use lookout_core::traits::{
    GeoProvider, GeoRecord, GeoSource, LineType, PhoneLookup, PhoneRecord, PhoneValidation,
};

/// A geolocation provider double with scripted behavior and call counters
pub struct ScriptedGeoProvider {
    name: &'static str,
    source: GeoSource,
    fail: bool,
    lookup_calls: Arc<AtomicUsize>,
}

impl ScriptedGeoProvider {
    /// A provider that answers every lookup
    pub fn ok(name: &'static str, source: GeoSource) -> Self {
        Self {
            name,
            source,
            fail: false,
            lookup_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider that fails every lookup with a transport error
    pub fn failing(name: &'static str, source: GeoSource) -> Self {
        Self {
            name,
            source,
            fail: true,
            lookup_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle on the lookup counter, kept alive after the provider is
    /// boxed into the tracker
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.lookup_calls)
    }

    /// The canonical record this double produces for `ip`
    pub fn record(&self, ip: &str) -> GeoRecord {
        sample_record(ip, self.source)
    }
}

/// A fully populated canonical record for tests
pub fn sample_record(ip: &str, source: GeoSource) -> GeoRecord {
    GeoRecord {
        ip: ip.to_string(),
        country: "United States".to_string(),
        country_code: "US".to_string(),
        region: "Virginia".to_string(),
        city: "Ashburn".to_string(),
        postal: "20149".to_string(),
        latitude: 39.03,
        longitude: -77.5,
        timezone: "America/New_York".to_string(),
        isp: "Example Networks".to_string(),
        org: "Example Networks".to_string(),
        as_number: "AS64496".to_string(),
        source,
        captured_at: Utc::now(),
    }
}

#[async_trait]
impl GeoProvider for ScriptedGeoProvider {
    async fn lookup(&self, ip: Option<&str>) -> Result<GeoRecord> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::transport(self.name, "scripted failure"));
        }
        Ok(self.record(ip.unwrap_or("198.51.100.7")))
    }

    async fn public_ip(&self) -> Result<String> {
        if self.fail {
            return Err(Error::transport(self.name, "scripted failure"));
        }
        Ok("198.51.100.7".to_string())
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn source(&self) -> GeoSource {
        self.source
    }
}

/// A phone lookup double that echoes its input through the record
pub struct EchoPhoneLookup;

impl PhoneLookup for EchoPhoneLookup {
    fn lookup(&self, raw: &str) -> Result<PhoneRecord> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(Error::parse(format!("Not a number: {:?}", raw)));
        }

        Ok(PhoneRecord {
            input: raw.to_string(),
            e164: format!("+{}", digits),
            international: format!("+{}", digits),
            national: digits.clone(),
            valid: true,
            possible: true,
            country_code: 1,
            national_number: digits.parse().unwrap_or(0),
            location: "United States / Canada".to_string(),
            carrier: "Unknown".to_string(),
            line_type: LineType::FixedLineOrMobile,
            timezones: "America/New_York".to_string(),
            captured_at: Utc::now(),
        })
    }

    fn validate(&self, raw: &str) -> Result<PhoneValidation> {
        let record = self.lookup(raw)?;
        Ok(PhoneValidation {
            valid: record.valid,
            possible: record.possible,
            e164: record.e164,
            international: record.international,
            national: record.national,
        })
    }
}

/// Helper to create a minimal TrackerConfig rooted in a test directory
pub fn test_config(data_dir: &Path) -> TrackerConfig {
    TrackerConfig::new(data_dir)
}
