// # Record Store
//
// File-based persistence for named, JSON-serializable record lists.
//
// ## Purpose
//
// Every durable collection (monthly lookup histories, the activity
// journal, the device registry, per-device exports) is one JSON
// array document under a single data root. The store owns path layout and
// atomic whole-file rewrites; callers own list contents.
//
// ## File layout
//
// ```text
// <root>/<category>/<key>.json
// ```
//
// e.g. `history/ip/202608.json`, `journal/activity.json`,
// `devices/registry.json`, `device_history/a1b2c3d4.json`.
//
// ## Write discipline
//
// Documents are written to a temporary file and renamed into place, so a
// reader never observes a partially written list. Mutations follow
// read-full-list / mutate / write-full-list; there is no incremental
// append format and no cross-process locking.

mod history;

pub use history::HistoryLog;

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Append `item` to `list`, evicting from the front while the list
/// exceeds `cap`.
///
/// This is the single FIFO-trim primitive shared by the bounded history
/// files and the activity journal. Trimming happens on write, never on
/// read.
pub fn append_with_cap<T>(list: &mut Vec<T>, item: T, cap: usize) {
    list.push(item);
    while list.len() > cap {
        list.remove(0);
    }
}

/// File-backed store for named record lists
///
/// Constructed once with an explicit data root and passed by reference to
/// every component; there is no ambient/global data-directory state.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    /// Create a store rooted at `root`. The directory is created lazily
    /// on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The data root this store was constructed with
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document holding `(category, key)`
    pub fn document_path(&self, category: &str, key: &str) -> PathBuf {
        self.root.join(category).join(format!("{}.json", key))
    }

    /// Load the record list stored under `(category, key)`.
    ///
    /// A document that does not exist yet reads as an empty list, not an
    /// error. Unreadable or malformed documents surface as
    /// [`Error::Store`].
    pub async fn load<T: DeserializeOwned>(&self, category: &str, key: &str) -> Result<Vec<T>> {
        let path = self.document_path(category, key);

        if !path.exists() {
            tracing::debug!("No document at {}, reading as empty", path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            Error::store(format!("Failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            Error::store(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Persist `items` as the full document under `(category, key)`,
    /// replacing whatever was there.
    ///
    /// The write goes to a temporary sibling first and is renamed into
    /// place, so the previous document stays readable until the new one
    /// is complete.
    pub async fn save<T: Serialize>(&self, category: &str, key: &str, items: &[T]) -> Result<()> {
        let path = self.document_path(category, key);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::store(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(items)
            .map_err(|e| Error::store(format!("Failed to serialize {}/{}: {}", category, key, e)))?;

        let temp_path = Self::temp_path(&path);
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &path).await.map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::trace!("Document written: {}", path.display());
        Ok(())
    }

    /// Remove the document under `(category, key)`. Missing documents are
    /// not an error.
    pub async fn remove(&self, category: &str, key: &str) -> Result<()> {
        let path = self.document_path(category, key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::store(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut temp = path.to_path_buf();
        temp.set_extension("tmp");
        temp
    }
}
