// SPDX-License-Identifier: MIT

//! SIGTERM delivery and exit-status decoding.
//!
//! SIGTERM is the sole termination signal (`spec.md` §5) — there is no
//! escalation to SIGKILL. Sent by shelling out to `kill -TERM <pid>`
//! rather than an `unsafe` `libc::kill` call, keeping the workspace's
//! `unsafe_code = "forbid"` lint intact (see `DESIGN.md`).

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use tracing::warn;

/// Send SIGTERM to `pid`. A process that has already exited is not an
/// error — `kill` reports a non-zero status and we just log it.
pub async fn send_sigterm(pid: u32) {
    match tokio::process::Command::new("kill")
        .arg("-TERM")
        .arg(pid.to_string())
        .status()
        .await
    {
        Ok(status) if status.success() => {}
        Ok(status) => {
            warn!(pid, ?status, "kill -TERM reported non-zero status (process likely already exited)");
        }
        Err(err) => {
            warn!(pid, error = %err, "failed to invoke kill -TERM");
        }
    }
}

/// Decode an [`ExitStatus`] into the integer code recorded in a
/// [`chron_core::RunStatusEntry`]. Processes that exit normally report
/// their real exit code; processes terminated by a signal report
/// `128 + signal`, the conventional shell encoding — this is how a
/// SIGTERM-terminated job's status code ends up non-zero and visible
/// over the control plane (`spec.md` §8 scenario 5).
pub fn exit_code_of(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    if let Some(signal) = status.signal() {
        return 128 + signal;
    }
    -1
}
