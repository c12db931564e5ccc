// SPDX-License-Identifier: MIT

//! A passive periodic scheduler polling at a 1-second tick.

use crate::schedule::CronSchedule;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

/// Opaque handle returned by [`Scheduler::register`], accepted by
/// [`Scheduler::unregister`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

struct Task {
    schedule: CronSchedule,
    next_fire: chrono::DateTime<Utc>,
    callback: Arc<dyn Fn() + Send + Sync>,
}

type Tasks = Arc<parking_lot::Mutex<HashMap<u64, Task>>>;

/// Polls every second and fires the callback of every registered task
/// whose next occurrence is at or before "now" — catching the first
/// missed tick on clock drift, never firing twice for the same
/// occurrence.
pub struct Scheduler {
    tasks: Tasks,
    next_id: AtomicU64,
    poll_handle: JoinHandle<()>,
}

impl Scheduler {
    pub fn new() -> Self {
        let tasks: Tasks = Arc::new(parking_lot::Mutex::new(HashMap::new()));
        let poll_tasks = Arc::clone(&tasks);
        let poll_handle = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            loop {
                ticker.tick().await;
                let now = Utc::now();
                let due: Vec<Arc<dyn Fn() + Send + Sync>> = {
                    let mut tasks = poll_tasks.lock();
                    let mut fired = Vec::new();
                    for task in tasks.values_mut() {
                        if task.next_fire <= now {
                            fired.push(Arc::clone(&task.callback));
                            task.next_fire = task
                                .schedule
                                .next_after(now)
                                .unwrap_or(now + chrono::Duration::days(365 * 100));
                        }
                    }
                    fired
                };
                for callback in due {
                    callback();
                }
            }
        });

        Self {
            tasks,
            next_id: AtomicU64::new(1),
            poll_handle,
        }
    }

    /// Register a task. The callback fires (fire-and-forget with respect
    /// to this poll loop) on every tick where the schedule's next
    /// occurrence is due.
    pub fn register(
        &self,
        schedule: CronSchedule,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> TaskHandle {
        let now = Utc::now();
        let next_fire = schedule.next_after(now).unwrap_or(now);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.tasks.lock().insert(
            id,
            Task {
                schedule,
                next_fire,
                callback: Arc::new(callback),
            },
        );
        TaskHandle(id)
    }

    pub fn unregister(&self, handle: TaskHandle) {
        self.tasks.lock().remove(&handle.0);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.poll_handle.abort();
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
