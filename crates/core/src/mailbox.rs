// SPDX-License-Identifier: MIT

//! Mailbox message records.

use serde::{Deserialize, Serialize};

/// Source tag reserved for supervisor-emitted failure notices.
pub const ERRORS_SOURCE: &str = "@errors";

/// A single, immutable mailbox message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub source: String,
    /// Human-readable timestamp, not necessarily sortable as a string.
    pub timestamp: String,
    pub message: String,
}

impl Message {
    pub fn new(source: impl Into<String>, timestamp: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            timestamp: timestamp.into(),
            message: message.into(),
        }
    }
}
