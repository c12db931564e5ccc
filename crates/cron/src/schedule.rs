// SPDX-License-Identifier: MIT

//! Parsed standard five-field cron expressions.

use crate::error::CronError;
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// A parsed cron expression with the two capabilities the supervisor
/// needs: the next firing instant after a point in time, and an ordered
/// iterator of all firings after a point in time (used for missed-run
/// catch-up counting).
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    inner: cron::Schedule,
}

impl CronSchedule {
    /// Parse a standard five-field cron expression.
    pub fn parse(expression: &str) -> Result<Self, CronError> {
        // The `cron` crate's own grammar is 6/7-field with a mandatory
        // leading seconds column; standard cron is five fields. Pin every
        // firing to second zero of its minute by prepending one.
        let with_seconds = format!("0 {expression}");
        let inner = cron::Schedule::from_str(&with_seconds)
            .map_err(|_| CronError::InvalidExpression(expression.to_string()))?;
        Ok(Self {
            expression: expression.to_string(),
            inner,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The next firing instant strictly after `t`.
    pub fn next_after(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.inner.after(&t).next()
    }

    /// All firings strictly after `t`, in order.
    pub fn occurrences_from(&self, t: DateTime<Utc>) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.inner.after(&t)
    }

    /// Count occurrences strictly after `since` and not after `now`.
    pub fn count_missed(&self, since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        self.occurrences_from(since).take_while(|t| *t <= now).count() as u64
    }
}
