// # lookout-core
//
// Core library for the lookout identifier-lookup system.
//
// ## Architecture Overview
//
// This library provides the core functionality for best-effort public
// lookups with durable bounded history:
// - **GeoProvider**: Trait for external geolocation sources; provider
//   crates map their own payload shapes into one canonical `GeoRecord`
// - **PhoneLookup**: Trait for local phone-number metadata resolution
// - **IpLookup**: Ordered provider chain with exactly one fallback hop
// - **RecordStore**: JSON list persistence under one explicit data root
// - **HistoryLog / ActivityJournal**: Bounded, FIFO-trimmed logs
// - **DeviceRegistry**: User-declared devices with append-only check-ins
// - **Tracker**: The caller-facing facade that sequences lookup, history
//   append and journaling
// - **ProviderRegistry**: Plugin registry for provider factories
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider
//    implementations; HTTP lives only in provider crates
// 2. **Canonical records**: Divergent provider schemas are normalized at
//    the plugin boundary, never downstream
// 3. **Bounded persistence**: One shared append-with-cap primitive backs
//    every size-capped list
// 4. **Explicit state**: One store object with an explicit root path is
//    passed everywhere; no ambient data-directory state

pub mod config;
pub mod devices;
pub mod engine;
pub mod error;
pub mod journal;
pub mod lookup;
pub mod registry;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{EngineConfig, GeoProviderConfig, TrackerConfig};
pub use devices::{Checkin, Device, DeviceForm, DeviceRegistry};
pub use engine::Tracker;
pub use error::{Error, Result};
pub use journal::{ActivityJournal, JournalCategory, JournalEntry};
pub use lookup::IpLookup;
pub use registry::ProviderRegistry;
pub use store::{HistoryLog, RecordStore, append_with_cap};
pub use traits::{
    GeoProvider, GeoProviderFactory, GeoRecord, GeoSource, LineType, PhoneLookup, PhoneRecord,
    PhoneValidation,
};
