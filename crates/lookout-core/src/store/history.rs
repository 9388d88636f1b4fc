// # Bounded Lookup History
//
// Monthly-partitioned, size-capped log of successful lookups, one per
// category ("ip", "phone"). Each month is its own document; within a
// month the list is FIFO-trimmed to the cap on every write.

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{RecordStore, append_with_cap};
use crate::error::Result;

/// A bounded, monthly-partitioned history of lookup records
#[derive(Debug, Clone)]
pub struct HistoryLog {
    store: RecordStore,
    category: String,
    cap: usize,
}

impl HistoryLog {
    /// Create a history log for `category` (stored under
    /// `history/<category>/`), trimmed to `cap` entries per month.
    pub fn new(store: RecordStore, category: impl Into<String>, cap: usize) -> Self {
        Self {
            store,
            category: format!("history/{}", category.into()),
            cap,
        }
    }

    /// Key of the current month's partition, `YYYYMM`
    pub fn current_key() -> String {
        Utc::now().format("%Y%m").to_string()
    }

    /// Append `record` to the current month's partition, evicting the
    /// oldest entries beyond the cap.
    pub async fn append<T>(&self, record: &T) -> Result<()>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        self.append_to(&Self::current_key(), record).await
    }

    /// Append to a specific month partition. Split out so tests can pin
    /// the key instead of depending on the wall clock.
    pub async fn append_to<T>(&self, key: &str, record: &T) -> Result<()>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        let mut entries: Vec<T> = self.store.load(&self.category, key).await?;
        append_with_cap(&mut entries, record.clone(), self.cap);
        self.store.save(&self.category, key, &entries).await
    }

    /// Load the current month's entries; absent partitions read as empty.
    pub async fn current<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.load(&Self::current_key()).await
    }

    /// Load a specific month's entries.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        self.store.load(&self.category, key).await
    }
}
