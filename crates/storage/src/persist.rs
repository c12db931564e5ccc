// SPDX-License-Identifier: MIT

//! Shared read/write-whole-document helpers for the two JSON stores.

use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Load a JSON document, returning `Default::default()` if the file does
/// not exist yet (first run).
pub async fn load_or_default<T>(path: &Path) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(err) => Err(err.into()),
    }
}

/// Rewrite the whole document atomically: write to a sibling temp file,
/// then rename over the real path. This is best-effort durability only —
/// there is no fsync, so a crash between write and rename can still lose
/// the update (`spec.md` §9 Open Question (c)).
pub async fn write_atomic<T>(path: &Path, value: &T) -> Result<(), StorageError>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp_path = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(&tmp_path, bytes).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}
