// SPDX-License-Identifier: MIT

//! Debounced chronfile watcher: reinvokes [`chron_config::load`] on a
//! trailing edge of filesystem activity, per `spec.md` §4.7.
//!
//! Grounded in the teacher's own `notify`-backed agent watcher
//! (`crates/adapters/src/agent/watcher.rs`): a raw `notify` callback
//! hands events to an async task over a channel, where debounce timing
//! is driven by `tokio::time` rather than inside the (sync) notify
//! callback itself.

use chron_supervisor::Supervisor;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, warn};

const DEBOUNCE: Duration = Duration::from_secs(1);

/// Start watching `path` for modify/remove events. Returns the
/// `notify::Watcher` guard — drop it to stop watching.
pub fn watch(
    path: &Path,
    supervisor: Arc<Supervisor>,
) -> notify::Result<RecommendedWatcher> {
    let (tx, rx) = mpsc::unbounded_channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) if is_relevant(&event.kind) => {
                let _ = tx.send(());
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "chronfile watcher error"),
        }
    })?;
    watcher.watch(path, RecursiveMode::NonRecursive)?;

    let path = path.to_path_buf();
    tokio::spawn(debounce_loop(path, supervisor, rx));
    Ok(watcher)
}

fn is_relevant(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(_) | EventKind::Remove(_))
}

/// Trailing-edge debounce: every event resets a 1-second timer; when the
/// timer elapses with no further events, reload once.
async fn debounce_loop(path: PathBuf, supervisor: Arc<Supervisor>, mut rx: mpsc::UnboundedReceiver<()>) {
    loop {
        if rx.recv().await.is_none() {
            return;
        }
        loop {
            match tokio::time::timeout(DEBOUNCE, rx.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return,
                Err(_timeout) => break,
            }
        }
        if let Err(err) = chron_config::load(&supervisor, &path).await {
            error!(error = %err, path = %path.display(), "chronfile reload failed, keeping previous registry");
        }
    }
}
