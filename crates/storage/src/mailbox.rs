// SPDX-License-Identifier: MIT

//! Durable mailbox backing `<chronDir>/mailbox.json`.

use crate::error::StorageError;
use crate::persist::{load_or_default, write_atomic};
use chron_core::Message;
use chrono::Local;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::warn;

/// Messages are unordered with respect to each other; callers that need
/// order sort by timestamp themselves.
pub struct Mailbox {
    path: PathBuf,
    messages: Mutex<Vec<Message>>,
}

impl Mailbox {
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let messages = load_or_default::<Vec<Message>>(&path).await?;
        Ok(Self {
            path,
            messages: Mutex::new(messages),
        })
    }

    /// Stamp `message` with the current time, insert it, and return the
    /// stored record.
    pub async fn add(&self, source: &str, message: &str) -> Result<Message, StorageError> {
        let record = Message::new(source, Local::now().to_rfc2822(), message);
        let mut messages = self.messages.lock().await;
        messages.push(record.clone());
        self.flush(&messages).await?;
        Ok(record)
    }

    pub async fn list_by(&self, source: &str) -> Vec<Message> {
        let messages = self.messages.lock().await;
        messages.iter().filter(|m| m.source == source).cloned().collect()
    }

    pub async fn list_all(&self) -> Vec<Message> {
        self.messages.lock().await.clone()
    }

    /// Remove every message with `source`, returning what was removed.
    pub async fn clear_by(&self, source: &str) -> Result<Vec<Message>, StorageError> {
        let mut messages = self.messages.lock().await;
        let (removed, kept): (Vec<_>, Vec<_>) =
            messages.drain(..).partition(|m| m.source == source);
        *messages = kept;
        self.flush(&messages).await?;
        Ok(removed)
    }

    /// Remove every message, returning what was removed.
    pub async fn clear_all(&self) -> Result<Vec<Message>, StorageError> {
        let mut messages = self.messages.lock().await;
        let removed = std::mem::take(&mut *messages);
        self.flush(&messages).await?;
        Ok(removed)
    }

    async fn flush(&self, messages: &[Message]) -> Result<(), StorageError> {
        if let Err(err) = write_atomic(&self.path, &messages).await {
            warn!(error = %err, path = %self.path.display(), "failed to persist mailbox");
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
