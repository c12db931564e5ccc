// SPDX-License-Identifier: MIT

//! Resolves the handful of environment inputs into every path and port
//! the rest of the process needs, mirroring the daemon's own
//! `Config::load()` pattern of deriving all paths up front.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("missing required argument <chronfile.toml>")]
    MissingChronfile,
    #[error("missing required environment variable PORT")]
    MissingPort,
    #[error("PORT must be a non-negative integer, got {0:?}")]
    InvalidPort(String),
}

/// Everything a running `chron` process needs: its data directory, the
/// paths derived from it, and the control-plane port.
pub struct RuntimeConfig {
    pub chron_dir: PathBuf,
    pub port: u16,
    pub job_status_path: PathBuf,
    pub mailbox_path: PathBuf,
    pub daemon_log_path: PathBuf,
}

impl RuntimeConfig {
    /// Read `PORT`, `HOME`, and the `CHRON_DIR` override from the
    /// process environment and derive every path this process will use.
    pub fn load() -> Result<Self, StartupError> {
        let port = read_port()?;
        let chron_dir = chron_dir();
        Ok(Self {
            job_status_path: chron_dir.join("jobStatus.json"),
            mailbox_path: chron_dir.join("mailbox.json"),
            daemon_log_path: chron_dir.join("daemon.log"),
            chron_dir,
            port,
        })
    }
}

fn read_port() -> Result<u16, StartupError> {
    let raw = std::env::var("PORT").map_err(|_| StartupError::MissingPort)?;
    raw.parse::<u16>()
        .map_err(|_| StartupError::InvalidPort(raw))
}

/// `CHRON_DIR` overrides the derived default, grounded in the teacher's
/// own `OJ_STATE_DIR` test-isolation convention. Falls back to
/// `$HOME/.local/share/chron`, and to `./.chron` if `HOME` is unset
/// rather than failing outright — `HOME` being unset is not one of the
/// two documented exit-1 conditions.
fn chron_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHRON_DIR") {
        return PathBuf::from(dir);
    }
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".local/share/chron"),
        Err(_) => PathBuf::from(".chron"),
    }
}
