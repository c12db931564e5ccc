// SPDX-License-Identifier: MIT

//! Run-status entries: one immutable-after-update record per invocation.

use crate::id::RunId;
use crate::name::JobName;
use serde::{Deserialize, Serialize};

/// A single recorded invocation of a job.
///
/// Created at launch with `status_code: None`, then amended exactly once
/// with the exit code once the child terminates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatusEntry {
    pub id: RunId,
    pub name: JobName,
    /// Epoch milliseconds when execution began.
    pub timestamp: u64,
    /// Absent while the invocation is still running.
    pub status_code: Option<i32>,
}

impl RunStatusEntry {
    pub fn new(name: JobName, timestamp: u64) -> Self {
        Self {
            id: RunId::generate(),
            name,
            timestamp,
            status_code: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status_code.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::validate_name;

    #[test]
    fn new_entry_starts_without_status() {
        let entry = RunStatusEntry::new(validate_name("job-1").unwrap(), 1_000);
        assert!(entry.is_running());
        assert_eq!(entry.status_code, None);
    }
}
