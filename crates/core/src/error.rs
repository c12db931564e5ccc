// SPDX-License-Identifier: MIT

//! Error types shared by the data model.

use thiserror::Error;

/// Errors raised validating or registering a job name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid job name: {0:?}")]
    InvalidName(String),
    #[error("duplicate job name: {0:?}")]
    DuplicateName(String),
}
