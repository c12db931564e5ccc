// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! chron-supervisor: the job registry, execution path, startup loop,
//! missed-run catch-up, and cancellation — the core of the system.

mod error;
mod generation;
mod log_sink;
mod signal;
mod supervisor;
mod view;

pub use chron_core::{JobKind, MakeUpMissedRuns, ScheduledOptions, StartupOptions};
pub use error::SupervisorError;
pub use supervisor::Supervisor;
pub use view::{JobStatusView, JobSummary, SupervisorView, TerminateOutcome};
