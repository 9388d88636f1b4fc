// # Device Registry
//
// Owns the set of user-declared devices and their append-only check-in
// sequences.
//
// ## Persistence model
//
// The whole registry is one JSON array document (`devices/registry.json`).
// Every mutation reads the full list, updates it in memory, and rewrites
// the document. Check-in lists grow without bound in the registry file;
// only display truncates. Devices are keyed by registration order and are
// never deleted individually.
//
// Reading the device history additionally writes a denormalized
// per-device export (`device_history/<device_id>.json`). The export is a
// convenience copy, never read back; the registry document stays
// authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::RecordStore;
use crate::traits::GeoRecord;

/// Store category of the registry document
const DEVICES_CATEGORY: &str = "devices";
/// Store key of the registry document
const DEVICES_KEY: &str = "registry";
/// Store category of the denormalized per-device exports
const DEVICE_HISTORY_CATEGORY: &str = "device_history";

/// Method tag carried by every check-in
const CHECKIN_METHOD: &str = "ip_geolocation";

/// A user-declared device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Short stable token generated at registration
    pub device_id: String,
    /// User-chosen nickname (duplicates allowed)
    pub nickname: String,
    /// Device type ("phone", "tablet", "laptop", ...)
    pub kind: String,
    pub brand: String,
    pub model: String,
    /// IMEI, digits-only when the input conformed, verbatim otherwise
    pub imei: String,
    pub serial: String,
    /// Purchase date as given (free-form, `YYYY-MM-DD` suggested)
    pub purchase_date: String,
    /// When the device was registered
    pub registered: DateTime<Utc>,
    /// Append-only location check-ins, oldest first
    #[serde(default)]
    pub checkins: Vec<Checkin>,
}

/// One self-reported location sample for a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkin {
    pub timestamp: DateTime<Utc>,
    pub ip: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// How the location was obtained; always `"ip_geolocation"` today
    pub method: String,
}

impl Checkin {
    /// Build a check-in from a completed self-lookup.
    pub fn from_geo(record: &GeoRecord) -> Self {
        Self {
            timestamp: Utc::now(),
            ip: record.ip.clone(),
            city: record.city.clone(),
            region: record.region.clone(),
            country: record.country.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            method: CHECKIN_METHOD.to_string(),
        }
    }
}

/// Registration input for a new device
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceForm {
    pub nickname: String,
    pub kind: String,
    pub brand: String,
    pub model: String,
    pub imei: String,
    pub serial: String,
    pub purchase_date: String,
}

/// Strip non-digits from an IMEI and decide whether the result conforms.
///
/// Returns the value to store plus a conformance flag: a 14- or 15-digit
/// result is stored digits-only, anything else is stored verbatim and
/// flagged. Non-conforming input is never rejected.
pub fn normalize_imei(raw: &str) -> (String, bool) {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 14 || digits.len() == 15 {
        (digits, true)
    } else {
        (raw.to_string(), false)
    }
}

/// Generate a short device id from a high-resolution clock reading.
///
/// Collision resistance only needs to cover a handful of devices
/// registered by one operator; folding the nanosecond reading is enough.
fn generate_device_id() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let folded = (nanos as u32) ^ ((nanos >> 32) as u32) ^ ((nanos >> 64) as u32);
    format!("{:08x}", folded)
}

/// The set of registered devices and their check-in sequences
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    store: RecordStore,
}

impl DeviceRegistry {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// All registered devices in registration order; absent registry
    /// reads as empty.
    pub async fn list(&self) -> Result<Vec<Device>> {
        self.store.load(DEVICES_CATEGORY, DEVICES_KEY).await
    }

    /// Fetch one device by registration index.
    pub async fn get(&self, index: usize) -> Result<Device> {
        let devices = self.list().await?;
        devices
            .into_iter()
            .nth(index)
            .ok_or_else(|| Error::not_found(format!("No device at index {}", index)))
    }

    /// Register a new device and persist the full list.
    ///
    /// IMEI input that does not strip to 14 or 15 digits is stored
    /// verbatim with a warning; registration always proceeds.
    pub async fn register(&self, form: DeviceForm) -> Result<Device> {
        let (imei, conforms) = normalize_imei(&form.imei);
        if !conforms && !form.imei.is_empty() {
            tracing::warn!(
                "IMEI {:?} does not normalize to 14-15 digits; storing as given",
                form.imei
            );
        }

        let device = Device {
            device_id: generate_device_id(),
            nickname: form.nickname,
            kind: form.kind,
            brand: form.brand,
            model: form.model,
            imei,
            serial: form.serial,
            purchase_date: form.purchase_date,
            registered: Utc::now(),
            checkins: Vec::new(),
        };

        let mut devices = self.list().await?;
        devices.push(device.clone());
        self.store.save(DEVICES_CATEGORY, DEVICES_KEY, &devices).await?;

        tracing::info!(
            "Registered device {} ({})",
            device.device_id,
            device.nickname
        );
        Ok(device)
    }

    /// Append a check-in to the device at `index` and re-persist the
    /// registry. Fails with `NotFound`, writing nothing, when the
    /// index does not reference a device.
    pub async fn append_checkin(&self, index: usize, checkin: Checkin) -> Result<Checkin> {
        let mut devices = self.list().await?;
        let device = devices
            .get_mut(index)
            .ok_or_else(|| Error::not_found(format!("No device at index {}", index)))?;

        device.checkins.push(checkin.clone());
        self.store.save(DEVICES_CATEGORY, DEVICES_KEY, &devices).await?;
        Ok(checkin)
    }

    /// The most recent `limit` check-ins for the device at `index`,
    /// most-recent-first.
    ///
    /// Also side-persists the device's full check-in list to its
    /// denormalized export document.
    pub async fn history(&self, index: usize, limit: usize) -> Result<Vec<Checkin>> {
        let device = self.get(index).await?;

        self.store
            .save(DEVICE_HISTORY_CATEGORY, &device.device_id, &device.checkins)
            .await?;

        let recent = device
            .checkins
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect();
        Ok(recent)
    }
}
