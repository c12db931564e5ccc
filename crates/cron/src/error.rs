// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CronError {
    #[error("invalid cron expression {0:?}")]
    InvalidExpression(String),
}
