// SPDX-License-Identifier: MIT

//! Per-generation cancellation: a broadcast signal, not a per-job flag.
//!
//! `reset()` trips the current generation and installs a fresh one.
//! Every job registered before the trip captures a [`GenerationHandle`]
//! that observes the single true transition.

use tokio::sync::watch;

/// Owns the sending half; held by the supervisor's registry.
pub struct Generation {
    tx: watch::Sender<bool>,
}

impl Generation {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Trip this generation. Idempotent.
    pub fn trip(&self) {
        let _ = self.tx.send(true);
    }

    /// Subscribe a new job to this generation.
    pub fn handle(&self) -> GenerationHandle {
        GenerationHandle {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for Generation {
    fn default() -> Self {
        Self::new()
    }
}

/// Held by a single job; captured at registration time.
#[derive(Clone)]
pub struct GenerationHandle {
    rx: watch::Receiver<bool>,
}

impl GenerationHandle {
    pub fn is_tripped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once this generation has tripped. Resolves immediately if
    /// already tripped.
    pub async fn wait_for_trip(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
}
