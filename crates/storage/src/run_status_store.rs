// SPDX-License-Identifier: MIT

//! Durable collection of [`RunStatusEntry`] records.

use crate::error::StorageError;
use crate::persist::{load_or_default, write_atomic};
use chron_core::{JobName, RunId, RunStatusEntry};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::warn;

/// The run-status store backing `<chronDir>/jobStatus.json`. Writes are
/// serialized through an internal mutex held across the whole document
/// rewrite, matching the single-writer discipline `spec.md` §5 requires.
pub struct RunStatusStore {
    path: PathBuf,
    entries: Mutex<Vec<RunStatusEntry>>,
}

impl RunStatusStore {
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = load_or_default::<Vec<RunStatusEntry>>(&path).await?;
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Persist a freshly-created entry immediately.
    pub async fn insert(&self, entry: RunStatusEntry) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        entries.push(entry);
        self.flush(&entries).await
    }

    /// Patch the entry with `id`'s status code.
    ///
    /// A missing id is a logic error elsewhere in the system (an entry
    /// must be inserted before it can be updated); it is logged and
    /// otherwise ignored here, matching the "store-write failures are
    /// logged, invocation continues" disposition in `spec.md` §7.
    pub async fn update(&self, id: &RunId, status_code: i32) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        match entries.iter_mut().find(|e| &e.id == id) {
            Some(entry) => entry.status_code = Some(status_code),
            None => {
                warn!(run_id = %id, "update called for unknown run-status entry");
                return Ok(());
            }
        }
        self.flush(&entries).await
    }

    /// All entries for `name`, in storage order. Callers that need
    /// timestamp order sort the result themselves.
    pub async fn find_by_name(&self, name: &JobName) -> Vec<RunStatusEntry> {
        let entries = self.entries.lock().await;
        entries.iter().filter(|e| &e.name == name).cloned().collect()
    }

    /// The most recent `timestamp` recorded for `name`, or `None` if the
    /// job has never run.
    pub async fn latest_timestamp(&self, name: &JobName) -> Option<u64> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .filter(|e| &e.name == name)
            .map(|e| e.timestamp)
            .max()
    }

    async fn flush(&self, entries: &[RunStatusEntry]) -> Result<(), StorageError> {
        if let Err(err) = write_atomic(&self.path, &entries).await {
            warn!(error = %err, path = %self.path.display(), "failed to persist run-status store");
            return Err(err);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "run_status_store_tests.rs"]
mod tests;
