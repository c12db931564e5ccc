// SPDX-License-Identifier: MIT

//! The TOML shape of a chronfile. Unknown fields under a job entry are
//! rejected (strict parsing), matching the control plane's wire contract.

use chron_core::MakeUpMissedRuns;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChronFile {
    #[serde(default)]
    pub startup: HashMap<String, StartupEntry>,
    #[serde(default)]
    pub schedule: HashMap<String, ScheduleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartupEntry {
    pub command: String,
    #[serde(rename = "keepAlive", default = "default_true")]
    pub keep_alive: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleEntry {
    pub schedule: String,
    pub command: String,
    #[serde(rename = "allowConcurrentRuns", default)]
    pub allow_concurrent_runs: bool,
    #[serde(rename = "makeUpMissedRuns", default)]
    pub make_up_missed_runs: MakeUpMissedRuns,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_startup_and_schedule_tables() {
        let toml = r#"
            [startup.web]
            command = "node server.js"

            [startup.worker]
            command = "node worker.js"
            keepAlive = false

            [schedule.nightly]
            schedule = "0 2 * * *"
            command = "backup.sh"
            makeUpMissedRuns = "all"
        "#;
        let doc: ChronFile = toml::from_str(toml).unwrap();
        assert!(doc.startup["web"].keep_alive);
        assert!(!doc.startup["worker"].keep_alive);
        assert_eq!(
            doc.schedule["nightly"].make_up_missed_runs,
            MakeUpMissedRuns::All
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let toml = r#"
            [startup.web]
            command = "node server.js"
            bogus = true
        "#;
        assert!(toml::from_str::<ChronFile>(toml).is_err());
    }

    #[test]
    fn make_up_missed_runs_accepts_integer_count() {
        let toml = r#"
            [schedule.nightly]
            schedule = "0 2 * * *"
            command = "backup.sh"
            makeUpMissedRuns = 3
        "#;
        let doc: ChronFile = toml::from_str(toml).unwrap();
        assert_eq!(
            doc.schedule["nightly"].make_up_missed_runs,
            MakeUpMissedRuns::Count(3)
        );
    }
}
