// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    InvalidJob(#[from] chron_core::Error),
    #[error(transparent)]
    InvalidCron(#[from] chron_cron::CronError),
}
