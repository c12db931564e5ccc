// SPDX-License-Identifier: MIT

//! The read/control interface the HTTP control plane depends on.
//!
//! Kept separate from the concrete [`crate::Supervisor`] type so the
//! control plane never references the supervisor's internals — resolving
//! the cyclic-ownership design note in `spec.md` §9.

use async_trait::async_trait;
use chron_core::RunStatusEntry;

/// One row of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct JobSummary {
    pub name: String,
    pub running: bool,
}

/// The body of `GET /job/:name/status`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct JobStatusView {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub runs: Vec<RunSummary>,
    #[serde(rename = "nextRun", skip_serializing_if = "Option::is_none")]
    pub next_run: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RunSummary {
    pub timestamp: u64,
    #[serde(rename = "statusCode")]
    pub status_code: Option<i32>,
}

impl From<&RunStatusEntry> for RunSummary {
    fn from(entry: &RunStatusEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            status_code: entry.status_code,
        }
    }
}

/// Result of a termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateOutcome {
    Terminated,
    NotRunning,
}

/// The supervisor operations the control plane needs: listing, status,
/// log path resolution, and signaling termination by name. No mutation
/// of the job registry itself — that only happens via `startup`/
/// `schedule`/`reset`, which the control plane never calls.
#[async_trait]
pub trait SupervisorView: Send + Sync {
    fn list_jobs(&self) -> Vec<JobSummary>;
    async fn job_status(&self, name: &str) -> Option<JobStatusView>;
    fn log_path(&self, name: &str) -> Option<std::path::PathBuf>;
    async fn terminate(&self, name: &str) -> Option<TerminateOutcome>;
}
