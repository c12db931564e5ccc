// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read chronfile: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse chronfile: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid job in chronfile: {0}")]
    Invalid(#[from] chron_supervisor::SupervisorError),
}
