// SPDX-License-Identifier: MIT

//! Job name type and validation.
//!
//! Names must match `^[a-zA-Z0-9]+(-[a-zA-Z0-9]+)*$`: one or more
//! alphanumeric segments joined by single hyphens, with no leading,
//! trailing, or doubled hyphens.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated, kebab-case job name, unique within a registry generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobName(String);

impl JobName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for JobName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Validate a raw name against the kebab-case grammar, returning a
/// [`JobName`] on success.
pub fn validate_name(name: &str) -> Result<JobName, Error> {
    if is_valid(name) {
        Ok(JobName(name.to_string()))
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}

fn is_valid(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    name.split('-').all(|segment| {
        !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric())
    })
}
