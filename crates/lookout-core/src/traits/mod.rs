//! Core traits for the lookout system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`GeoProvider`]: Query an external geolocation data source
//! - [`PhoneLookup`]: Resolve phone-number metadata from a local database

pub mod geo_provider;
pub mod phone_lookup;

pub use geo_provider::{GeoProvider, GeoProviderFactory, GeoRecord, GeoSource};
pub use phone_lookup::{LineType, PhoneLookup, PhoneRecord, PhoneValidation};
