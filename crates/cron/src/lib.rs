// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! chron-cron: five-field cron expression parsing and a passive 1 Hz poller.

mod error;
mod schedule;
mod scheduler;

pub use error::CronError;
pub use schedule::CronSchedule;
pub use scheduler::{Scheduler, TaskHandle};
