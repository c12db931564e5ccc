// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! chron-http: the control plane, an `axum` router over a
//! [`chron_supervisor::SupervisorView`].

mod routes;

pub use routes::app;
