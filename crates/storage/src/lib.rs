// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! chron-storage: JSON-backed persistence for run status and mailbox
//! messages. Best-effort durability: writes go to a temp file and are
//! renamed into place, but are never fsynced (see `spec.md` §9).

mod error;
mod mailbox;
mod persist;
mod run_status_store;

pub use error::StorageError;
pub use mailbox::Mailbox;
pub use run_status_store::RunStatusStore;
