// SPDX-License-Identifier: MIT

//! Static job definitions: what the config loader hands the supervisor.
//!
//! These types carry no runtime state (no child handle, no cancel token —
//! those belong to `chron-supervisor`, which owns the live registry).

use crate::name::JobName;
use serde::{Deserialize, Serialize};

/// How many missed cron occurrences to make up on registration.
///
/// The wire form is either a non-negative integer or the literal string
/// `"all"`, so this hand-rolls `Serialize`/`Deserialize` rather than
/// deriving `#[serde(untagged)]` (which would expect `All` to serialize
/// as TOML/JSON `null`, not the string `"all"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MakeUpMissedRuns {
    Count(u64),
    All,
}

impl Serialize for MakeUpMissedRuns {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            MakeUpMissedRuns::Count(n) => serializer.serialize_u64(*n),
            MakeUpMissedRuns::All => serializer.serialize_str("all"),
        }
    }
}

impl<'de> Deserialize<'de> for MakeUpMissedRuns {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct MakeUpVisitor;

        impl<'de> Visitor<'de> for MakeUpVisitor {
            type Value = MakeUpMissedRuns;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a non-negative integer or the string \"all\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(MakeUpMissedRuns::Count(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(MakeUpMissedRuns::Count)
                    .map_err(|_| E::custom("makeUpMissedRuns must not be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v.eq_ignore_ascii_case("all") {
                    Ok(MakeUpMissedRuns::All)
                } else {
                    Err(E::custom(format!("expected \"all\", found {v:?}")))
                }
            }
        }

        deserializer.deserialize_any(MakeUpVisitor)
    }
}

impl Default for MakeUpMissedRuns {
    fn default() -> Self {
        MakeUpMissedRuns::Count(0)
    }
}

impl MakeUpMissedRuns {
    /// Resolve against the actual number of missed occurrences `missed`.
    pub fn resolve(&self, missed: u64) -> u64 {
        match self {
            MakeUpMissedRuns::Count(n) => (*n).min(missed),
            MakeUpMissedRuns::All => missed,
        }
    }
}

/// Options specific to a startup job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupOptions {
    pub keep_alive: bool,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self { keep_alive: true }
    }
}

/// Options specific to a scheduled job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScheduledOptions {
    pub allow_concurrent_runs: bool,
    pub make_up_missed_runs: MakeUpMissedRuns,
}

/// The kind-specific half of a job definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    Startup(StartupOptions),
    Scheduled {
        cron_expression: String,
        options: ScheduledOptions,
    },
}

impl JobKind {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, JobKind::Scheduled { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobKind::Startup(_) => "startup",
            JobKind::Scheduled { .. } => "scheduled",
        }
    }
}

/// A job's static definition, as registered with the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub name: JobName,
    pub command: String,
    pub kind: JobKind,
}

impl Job {
    /// Derive this job's log file path under `<chronDir>/logs/<name>.log`.
    pub fn log_path(&self, chron_dir: &std::path::Path) -> std::path::PathBuf {
        chron_dir.join("logs").join(format!("{}.log", self.name))
    }
}
