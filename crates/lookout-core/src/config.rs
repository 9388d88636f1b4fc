//! Configuration types for the lookout system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main lookout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Root directory of all persisted documents
    pub data_dir: PathBuf,

    /// Geolocation providers in query order (primary first). The shipped
    /// configuration is exactly two entries: one fallback hop.
    pub providers: Vec<GeoProviderConfig>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl TrackerConfig {
    /// Create a configuration with the given data root and the default
    /// primary/secondary provider pair.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            providers: vec![
                GeoProviderConfig::default_primary(),
                GeoProviderConfig::default_secondary(),
            ],
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(crate::Error::config("Data directory cannot be empty"));
        }

        if self.providers.is_empty() {
            return Err(crate::Error::config("No geolocation providers configured"));
        }

        for provider in &self.providers {
            provider.validate()?;
        }

        self.engine.validate()?;

        Ok(())
    }
}

/// Geolocation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeoProviderConfig {
    /// ip-api.com shaped provider (flat payload with a status field)
    IpApi {
        /// Base URL of the JSON endpoint
        url: String,
        /// Request timeout in seconds
        timeout_secs: u64,
    },

    /// ipinfo.io shaped provider (combined "lat,lon" location field)
    IpInfo {
        /// Base URL of the JSON endpoint
        url: String,
        /// Request timeout in seconds
        timeout_secs: u64,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl GeoProviderConfig {
    /// Default primary provider endpoint
    pub fn default_primary() -> Self {
        GeoProviderConfig::IpApi {
            url: "http://ip-api.com/json".to_string(),
            timeout_secs: default_lookup_timeout_secs(),
        }
    }

    /// Default secondary (fallback) provider endpoint
    pub fn default_secondary() -> Self {
        GeoProviderConfig::IpInfo {
            url: "https://ipinfo.io".to_string(),
            timeout_secs: default_lookup_timeout_secs(),
        }
    }

    /// Get the provider type name used for registry resolution
    pub fn type_name(&self) -> &str {
        match self {
            GeoProviderConfig::IpApi { .. } => "ipapi",
            GeoProviderConfig::IpInfo { .. } => "ipinfo",
            GeoProviderConfig::Custom { factory, .. } => factory,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            GeoProviderConfig::IpApi { url, timeout_secs }
            | GeoProviderConfig::IpInfo { url, timeout_secs } => {
                if url.is_empty() {
                    return Err(crate::Error::config("Provider URL cannot be empty"));
                }
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(crate::Error::config(format!(
                        "Provider URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("Provider timeout must be > 0"));
                }
                Ok(())
            }
            GeoProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Engine settings: history caps and display limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum entries per monthly history file
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Maximum entries in the global activity journal
    #[serde(default = "default_journal_cap")]
    pub journal_cap: usize,

    /// How many check-ins a device history view returns
    #[serde(default = "default_display_checkins")]
    pub display_checkins: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.history_cap == 0 {
            return Err(crate::Error::config("history_cap must be > 0"));
        }
        if self.journal_cap == 0 {
            return Err(crate::Error::config("journal_cap must be > 0"));
        }
        if self.display_checkins == 0 {
            return Err(crate::Error::config("display_checkins must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_cap: default_history_cap(),
            journal_cap: default_journal_cap(),
            display_checkins: default_display_checkins(),
        }
    }
}

fn default_history_cap() -> usize {
    50
}

fn default_journal_cap() -> usize {
    100
}

fn default_display_checkins() -> usize {
    10
}

fn default_lookup_timeout_secs() -> u64 {
    10
}
