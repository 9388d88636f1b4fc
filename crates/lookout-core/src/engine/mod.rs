//! Core lookup engine
//!
//! The [`Tracker`] is the single caller-facing facade. It owns the
//! orchestration flow for every operation:
//!
//! 1. Run the lookup (provider chain, phone database, or device registry)
//! 2. On success, append the canonical record to its bounded history
//! 3. Journal an abbreviated entry (best-effort, never fails the caller)
//!
//! ## Event Flow
//!
//! ```text
//! ┌──────────────┐      ┌──────────────┐      ┌───────────────┐
//! │  IpLookup    │      │ PhoneLookup  │      │ DeviceRegistry│
//! │ (providers)  │      │ (local db)   │      │ (persisted)   │
//! └──────┬───────┘      └──────┬───────┘      └──────┬────────┘
//!        └──────────────┬──────┴─────────────────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │   Tracker    │
//!               └──────┬───────┘
//!            ┌─────────┴──────────┐
//!            ▼                    ▼
//!    ┌──────────────┐     ┌───────────────┐
//!    │ HistoryLog   │     │ActivityJournal│
//!    │ (cap 50/mo)  │     │  (cap 100)    │
//!    └──────────────┘     └───────────────┘
//! ```
//!
//! A failed lookup writes nothing: history and journal appends happen
//! only after the source operation fully succeeds.

use serde_json::json;

use crate::config::TrackerConfig;
use crate::devices::{Checkin, Device, DeviceForm, DeviceRegistry};
use crate::error::Result;
use crate::journal::{ActivityJournal, JournalCategory, JournalEntry};
use crate::lookup::IpLookup;
use crate::store::{HistoryLog, RecordStore};
use crate::traits::{GeoProvider, GeoRecord, PhoneLookup, PhoneRecord, PhoneValidation};

/// Caller-facing facade over lookups, histories, journal and devices
///
/// Constructed once from configuration plus injected provider
/// implementations; every component shares the one [`RecordStore`]
/// rooted at the configured data directory. Operations run one at a
/// time; the system assumes a single active session against a single
/// data directory.
pub struct Tracker {
    geo: IpLookup,
    phone: Box<dyn PhoneLookup>,
    devices: DeviceRegistry,
    ip_history: HistoryLog,
    phone_history: HistoryLog,
    journal: ActivityJournal,
    display_checkins: usize,
}

impl Tracker {
    /// Create a tracker from validated configuration and injected
    /// implementations.
    pub fn new(
        config: TrackerConfig,
        providers: Vec<Box<dyn GeoProvider>>,
        phone: Box<dyn PhoneLookup>,
    ) -> Result<Self> {
        config.validate()?;

        let store = RecordStore::new(&config.data_dir);
        let engine = &config.engine;

        Ok(Self {
            geo: IpLookup::new(providers)?,
            phone,
            devices: DeviceRegistry::new(store.clone()),
            ip_history: HistoryLog::new(store.clone(), "ip", engine.history_cap),
            phone_history: HistoryLog::new(store.clone(), "phone", engine.history_cap),
            journal: ActivityJournal::new(store, engine.journal_cap),
            display_checkins: engine.display_checkins,
        })
    }

    /// Geolocate `ip`, or the caller's own public address when `None`.
    ///
    /// On success the record lands in the monthly IP history and an
    /// abbreviated entry in the journal. On failure nothing is written.
    pub async fn track_ip(&self, ip: Option<&str>) -> Result<GeoRecord> {
        let record = self.geo.lookup(ip).await?;

        self.ip_history.append(&record).await?;
        self.journal
            .record(JournalCategory::IpLookup, json!({ "ip": record.ip }))
            .await;

        tracing::info!("Tracked {} via {} provider", record.ip, record.source);
        Ok(record)
    }

    /// The caller's public IP as a raw string. Not persisted.
    pub async fn public_ip(&self) -> Result<String> {
        self.geo.public_ip().await
    }

    /// Resolve phone-number metadata.
    ///
    /// On success the record lands in the monthly phone history and the
    /// journal; `valid == false` is still a success.
    pub async fn lookup_phone(&self, raw: &str) -> Result<PhoneRecord> {
        let record = self.phone.lookup(raw)?;

        self.phone_history.append(&record).await?;
        self.journal
            .record(JournalCategory::PhoneLookup, json!({ "number": record.e164 }))
            .await;

        Ok(record)
    }

    /// Parse and validate a phone number without the descriptive fields.
    /// Not persisted.
    pub fn validate_phone(&self, raw: &str) -> Result<PhoneValidation> {
        self.phone.validate(raw)
    }

    /// Register a device. IMEI anomalies warn but never reject.
    pub async fn register_device(&self, form: DeviceForm) -> Result<Device> {
        self.devices.register(form).await
    }

    /// Check in the device at `index` with a self-lookup.
    ///
    /// The index is validated first, then the lookup runs, then the
    /// check-in is appended, so a failed lookup mutates nothing.
    pub async fn checkin_device(&self, index: usize) -> Result<Checkin> {
        let device = self.devices.get(index).await?;

        let location = self.geo.lookup(None).await?;
        let checkin = self
            .devices
            .append_checkin(index, Checkin::from_geo(&location))
            .await?;

        self.journal
            .record(
                JournalCategory::DeviceCheckin,
                json!({ "device": device.nickname, "location": checkin.city }),
            )
            .await;

        tracing::info!(
            "Device {} checked in at {}, {}",
            device.nickname,
            checkin.city,
            checkin.country
        );
        Ok(checkin)
    }

    /// Most recent check-ins for the device at `index`, most-recent-first,
    /// truncated to the configured display limit.
    pub async fn device_history(&self, index: usize) -> Result<Vec<Checkin>> {
        self.devices.history(index, self.display_checkins).await
    }

    /// All registered devices in registration order.
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        self.devices.list().await
    }

    /// The current month's IP lookup history.
    pub async fn ip_history(&self) -> Result<Vec<GeoRecord>> {
        self.ip_history.current().await
    }

    /// The current month's phone lookup history.
    pub async fn phone_history(&self) -> Result<Vec<PhoneRecord>> {
        self.phone_history.current().await
    }

    /// All journal entries, oldest first.
    pub async fn journal(&self) -> Result<Vec<JournalEntry>> {
        self.journal.entries().await
    }

    /// Delete the activity journal.
    pub async fn clear_journal(&self) -> Result<()> {
        self.journal.clear().await
    }
}
