// SPDX-License-Identifier: MIT

use crate::document::ChronFile;
use crate::error::ConfigError;
use chron_core::{ScheduledOptions, StartupOptions};
use chron_supervisor::Supervisor;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Read and parse `path`, reset the supervisor, and register every
/// startup and scheduled entry found. Parse failures, unknown fields,
/// and job-validation failures all propagate to the caller; none of
/// them are swallowed here — the file watcher decides what to do with
/// them.
pub async fn load(supervisor: &Arc<Supervisor>, path: &Path) -> Result<(), ConfigError> {
    let contents = tokio::fs::read_to_string(path).await?;
    let doc: ChronFile = toml::from_str(&contents)?;

    supervisor.reset();
    info!(path = %path.display(), "loaded chronfile, registry reset");

    for (name, entry) in doc.startup {
        supervisor
            .startup(
                &name,
                &entry.command,
                StartupOptions {
                    keep_alive: entry.keep_alive,
                },
            )
            .await?;
    }

    for (name, entry) in doc.schedule {
        supervisor
            .schedule(
                &name,
                &entry.schedule,
                &entry.command,
                ScheduledOptions {
                    allow_concurrent_runs: entry.allow_concurrent_runs,
                    make_up_missed_runs: entry.make_up_missed_runs,
                },
            )
            .await?;
    }

    Ok(())
}
