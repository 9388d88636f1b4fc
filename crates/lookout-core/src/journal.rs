// # Activity Journal
//
// Single global bounded log of typed events, written after every
// successful lookup or check-in.
//
// ## Best-effort contract
//
// Journal writes are fire-and-forget: every internal error is logged at
// `warn` and discarded. A failed journal append must never fail or block
// the primary operation it records. This is the only persistence path in
// the system allowed to swallow errors; history and device writes always
// surface theirs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{RecordStore, append_with_cap};

/// Store category of the journal document
const JOURNAL_CATEGORY: &str = "journal";
/// Store key of the journal document
const JOURNAL_KEY: &str = "activity";

/// Category tag of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JournalCategory {
    IpLookup,
    PhoneLookup,
    DeviceCheckin,
}

/// One entry in the global activity journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// When the recorded operation completed
    pub timestamp: DateTime<Utc>,
    /// What kind of operation this was
    pub category: JournalCategory,
    /// Small category-specific payload, e.g. `{"ip": "1.2.3.4"}`
    pub payload: serde_json::Value,
}

/// Global bounded activity journal
#[derive(Debug, Clone)]
pub struct ActivityJournal {
    store: RecordStore,
    cap: usize,
}

impl ActivityJournal {
    /// Create a journal backed by `store`, trimmed to `cap` entries.
    pub fn new(store: RecordStore, cap: usize) -> Self {
        Self { store, cap }
    }

    /// Append an entry, evicting the oldest beyond the cap.
    ///
    /// Never fails: persistence errors are logged and swallowed.
    pub async fn record(&self, category: JournalCategory, payload: serde_json::Value) {
        let entry = JournalEntry {
            timestamp: Utc::now(),
            category,
            payload,
        };

        if let Err(e) = self.append(entry).await {
            tracing::warn!("Journal write failed (ignored): {}", e);
        }
    }

    async fn append(&self, entry: JournalEntry) -> Result<()> {
        let mut entries: Vec<JournalEntry> =
            self.store.load(JOURNAL_CATEGORY, JOURNAL_KEY).await?;
        append_with_cap(&mut entries, entry, self.cap);
        self.store.save(JOURNAL_CATEGORY, JOURNAL_KEY, &entries).await
    }

    /// All journal entries, oldest first; absent journal reads as empty.
    pub async fn entries(&self) -> Result<Vec<JournalEntry>> {
        self.store.load(JOURNAL_CATEGORY, JOURNAL_KEY).await
    }

    /// Delete the journal document. Unlike [`record`](Self::record),
    /// clearing is an explicit user action, so failures surface.
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(JOURNAL_CATEGORY, JOURNAL_KEY).await
    }
}
