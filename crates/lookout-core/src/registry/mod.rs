//! Plugin-based provider registry
//!
//! The registry allows geolocation providers to be registered dynamically
//! at runtime, avoiding hardcoded if-else chains. Provider crates expose a
//! `register()` function that installs their factory:
//!
//! ```rust,ignore
//! // In a provider crate
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_geo_provider("ipapi", Box::new(IpApiFactory));
//! }
//! ```
//!
//! The caller then builds the ordered lookup chain from configuration:
//!
//! ```rust,ignore
//! let providers = registry.create_chain(&config.providers)?;
//! let lookup = IpLookup::new(providers)?;
//! ```

use crate::config::GeoProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{GeoProvider, GeoProviderFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Registry of geolocation provider factories
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Box<dyn GeoProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a geolocation provider factory under `name`
    pub fn register_geo_provider(
        &self,
        name: impl Into<String>,
        factory: Box<dyn GeoProviderFactory>,
    ) {
        let name = name.into();
        let mut providers = self.providers.write().unwrap();
        providers.insert(name, factory);
    }

    /// Create a provider instance from configuration
    ///
    /// Fails with a configuration error when no factory is registered for
    /// the config's type name.
    pub fn create_geo_provider(&self, config: &GeoProviderConfig) -> Result<Box<dyn GeoProvider>> {
        let provider_type = config.type_name();
        let providers = self.providers.read().unwrap();

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// Create the ordered provider chain described by `configs`
    pub fn create_chain(&self, configs: &[GeoProviderConfig]) -> Result<Vec<Box<dyn GeoProvider>>> {
        configs.iter().map(|c| self.create_geo_provider(c)).collect()
    }

    /// List all registered provider types
    pub fn list_geo_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap();
        providers.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_geo_provider(&self, name: &str) -> bool {
        let providers = self.providers.read().unwrap();
        providers.contains_key(name)
    }
}
