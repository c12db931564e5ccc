// SPDX-License-Identifier: MIT

//! The job registry, execution path, and lifecycle operations.
//!
//! `Supervisor` is always held behind an `Arc` by its owner (`chron-cli`),
//! which is why `startup`/`schedule` take `self: &Arc<Self>` — both spawn
//! detached tasks (the startup keep-alive loop, the cron-fire callback)
//! that need to call back into `execute` long after the registering call
//! has returned.

use crate::error::SupervisorError;
use crate::generation::{Generation, GenerationHandle};
use crate::log_sink::{open_and_write_header, write_footer};
use crate::signal::{exit_code_of, send_sigterm};
use crate::view::{JobStatusView, JobSummary, RunSummary, SupervisorView, TerminateOutcome};

use async_trait::async_trait;
use chron_core::{
    validate_name, Job, JobKind, RunId, RunStatusEntry, ScheduledOptions, StartupOptions,
};
use chron_cron::{CronSchedule, Scheduler, TaskHandle};
use chron_storage::{Mailbox, RunStatusStore};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay between successive restarts of a `keep_alive` startup job.
const STARTUP_RESTART_DELAY: Duration = Duration::from_secs(5);

struct ScheduledState {
    schedule: CronSchedule,
    options: ScheduledOptions,
    task_handle: parking_lot::Mutex<Option<TaskHandle>>,
}

/// One registered job plus its live runtime state.
struct JobEntry {
    job: Job,
    generation: GenerationHandle,
    current_pid: parking_lot::Mutex<Option<u32>>,
    scheduled: Option<ScheduledState>,
}

impl JobEntry {
    fn is_running(&self) -> bool {
        self.current_pid.lock().is_some()
    }
}

struct Registry {
    jobs: HashMap<String, Arc<JobEntry>>,
    generation: Generation,
}

/// The job supervisor: owns the registry, spawns and tracks children,
/// drives the startup loop and scheduled execution, and performs
/// missed-run catch-up.
pub struct Supervisor {
    chron_dir: PathBuf,
    port: Option<u16>,
    run_status: Arc<RunStatusStore>,
    mailbox: Arc<Mailbox>,
    scheduler: Scheduler,
    registry: parking_lot::Mutex<Registry>,
}

impl Supervisor {
    pub fn new(
        chron_dir: PathBuf,
        port: Option<u16>,
        run_status: Arc<RunStatusStore>,
        mailbox: Arc<Mailbox>,
    ) -> Self {
        Self {
            chron_dir,
            port,
            run_status,
            mailbox,
            scheduler: Scheduler::new(),
            registry: parking_lot::Mutex::new(Registry {
                jobs: HashMap::new(),
                generation: Generation::new(),
            }),
        }
    }

    pub fn mailbox(&self) -> Arc<Mailbox> {
        Arc::clone(&self.mailbox)
    }

    pub fn run_status(&self) -> Arc<RunStatusStore> {
        Arc::clone(&self.run_status)
    }

    /// Register a startup job and spawn its keep-alive loop as an
    /// independent background task, per the scheduler/executor
    /// decoupling principle: this returns as soon as registration
    /// completes, so the config loader can register the rest of the
    /// chronfile without waiting on a loop that may run forever.
    pub async fn startup(
        self: &Arc<Self>,
        name: &str,
        command: &str,
        options: StartupOptions,
    ) -> Result<(), SupervisorError> {
        let entry = self.register(name, command, options.clone(), None)?;
        info!(job = name, keep_alive = options.keep_alive, "registered startup job");
        let supervisor = Arc::clone(self);
        tokio::spawn(async move { supervisor.run_startup_loop(entry, options).await });
        Ok(())
    }

    async fn run_startup_loop(self: Arc<Self>, entry: Arc<JobEntry>, options: StartupOptions) {
        loop {
            if entry.generation.is_tripped() {
                return;
            }
            self.execute(Arc::clone(&entry)).await;
            if !options.keep_alive {
                return;
            }
            tokio::time::sleep(STARTUP_RESTART_DELAY).await;
        }
    }

    /// Register a scheduled job, then perform synchronous missed-run
    /// catch-up before returning.
    pub async fn schedule(
        self: &Arc<Self>,
        name: &str,
        cron_expr: &str,
        command: &str,
        options: ScheduledOptions,
    ) -> Result<(), SupervisorError> {
        let schedule = CronSchedule::parse(cron_expr)?;
        let entry = self.register(name, command, StartupOptions::default(), Some((schedule.clone(), options)))?;

        let supervisor = Arc::clone(self);
        let callback_entry = Arc::clone(&entry);
        let handle = self.scheduler.register(schedule, move || {
            let supervisor = Arc::clone(&supervisor);
            let entry = Arc::clone(&callback_entry);
            tokio::spawn(async move { supervisor.on_cron_fire(entry).await });
        });
        if let Some(scheduled) = &entry.scheduled {
            *scheduled.task_handle.lock() = Some(handle);
        }

        self.catch_up_missed_runs(&entry).await;
        Ok(())
    }

    async fn on_cron_fire(self: Arc<Self>, entry: Arc<JobEntry>) {
        let allow_concurrent = entry
            .scheduled
            .as_ref()
            .map(|s| s.options.allow_concurrent_runs)
            .unwrap_or(false);
        if entry.is_running() && !allow_concurrent {
            warn!("Skipping {} because it is still running", entry.job.name);
            return;
        }
        self.execute(entry).await;
    }

    async fn catch_up_missed_runs(self: &Arc<Self>, entry: &Arc<JobEntry>) {
        let Some(scheduled) = &entry.scheduled else {
            return;
        };
        let Some(since_ms) = self.run_status.latest_timestamp(&entry.job.name).await else {
            return;
        };
        let Some(since) = epoch_ms_to_datetime(since_ms) else {
            return;
        };
        let now = Utc::now();
        let missed = scheduled.schedule.count_missed(since, now);
        let catch_up = scheduled.options.make_up_missed_runs.resolve(missed);
        if catch_up == 0 {
            return;
        }
        info!(
            job = %entry.job.name,
            "Making up {} of {} missed runs for {}",
            catch_up,
            missed,
            entry.job.name
        );
        for _ in 0..catch_up {
            self.execute(Arc::clone(entry)).await;
        }
    }

    /// Trip the current generation (SIGTERM to every live child via their
    /// own `execute` loops, no future spawns under it), unregister every
    /// scheduled task, and install a fresh generation for subsequent
    /// registrations. Does not wait for children to actually exit.
    pub fn reset(&self) {
        let mut registry = self.registry.lock();
        registry.generation.trip();
        for entry in registry.jobs.values() {
            if let Some(scheduled) = &entry.scheduled {
                if let Some(handle) = scheduled.task_handle.lock().take() {
                    self.scheduler.unregister(handle);
                }
            }
        }
        registry.jobs.clear();
        registry.generation = Generation::new();
        info!("supervisor reset: registry cleared, generation advanced");
    }

    /// All recorded runs for `name`, sorted by timestamp descending.
    pub async fn recent_runs(&self, name: &str) -> Vec<RunStatusEntry> {
        let Ok(job_name) = validate_name(name) else {
            return Vec::new();
        };
        let mut runs = self.run_status.find_by_name(&job_name).await;
        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        runs
    }

    fn register(
        &self,
        name: &str,
        command: &str,
        startup_options: StartupOptions,
        scheduled: Option<(CronSchedule, ScheduledOptions)>,
    ) -> Result<Arc<JobEntry>, SupervisorError> {
        let job_name = validate_name(name)?;
        let mut registry = self.registry.lock();
        if registry.jobs.contains_key(job_name.as_str()) {
            return Err(chron_core::Error::DuplicateName(name.to_string()).into());
        }

        let kind = match &scheduled {
            Some((schedule, options)) => JobKind::Scheduled {
                cron_expression: schedule.expression().to_string(),
                options: options.clone(),
            },
            None => JobKind::Startup(startup_options),
        };
        let job = Job {
            name: job_name.clone(),
            command: command.to_string(),
            kind,
        };
        let entry = Arc::new(JobEntry {
            job,
            generation: registry.generation.handle(),
            current_pid: parking_lot::Mutex::new(None),
            scheduled: scheduled.map(|(schedule, options)| ScheduledState {
                schedule,
                options,
                task_handle: parking_lot::Mutex::new(None),
            }),
        });
        registry
            .jobs
            .insert(job_name.as_str().to_string(), Arc::clone(&entry));
        Ok(entry)
    }

    fn find(&self, name: &str) -> Option<Arc<JobEntry>> {
        self.registry.lock().jobs.get(name).cloned()
    }

    /// The nine-step execution path shared by startup and scheduled jobs.
    async fn execute(&self, entry: Arc<JobEntry>) {
        // Step 1: already-cancelled jobs spawn nothing.
        if entry.generation.is_tripped() {
            return;
        }

        let name = entry.job.name.to_string();
        let started_at = Utc::now();
        let timestamp = started_at.timestamp_millis().max(0) as u64;

        // Step 2: insert the run-status entry before the child exists.
        let run_entry = RunStatusEntry::new(entry.job.name.clone(), timestamp);
        let run_id = run_entry.id.clone();
        if let Err(err) = self.run_status.insert(run_entry).await {
            warn!(job = %name, error = %err, "failed to persist run-status entry");
        }

        // Step 3: open the log file and write the header.
        let log_path = entry.job.log_path(&self.chron_dir);
        let file = match open_and_write_header(&log_path) {
            Ok(file) => Some(file),
            Err(err) => {
                warn!(job = %name, error = %err, "failed to open log file");
                None
            }
        };

        // Step 4: spawn `sh -c <command>`, stdout/stderr to the log file.
        let mut command = tokio::process::Command::new("sh");
        command.arg("-c").arg(&entry.job.command);
        match &file {
            Some(file) => match (file.try_clone(), file.try_clone()) {
                (Ok(out), Ok(err)) => {
                    command.stdout(Stdio::from(out));
                    command.stderr(Stdio::from(err));
                }
                _ => {
                    command.stdout(Stdio::null()).stderr(Stdio::null());
                }
            },
            None => {
                command.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }
        if let Some(port) = self.port {
            command.env(
                "CHRON_MAILBOX_URL",
                format!("http://0.0.0.0:{port}/mailbox/{name}"),
            );
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                warn!(job = %name, error = %err, "failed to spawn child process");
                self.finish_without_child(&run_id, &name, file).await;
                return;
            }
        };
        let pid = child.id();

        // Step 5: record the live pid.
        *entry.current_pid.lock() = pid;
        debug!(job = %name, ?pid, "spawned child process");

        // Step 6: wait for exit, honoring cancellation via SIGTERM.
        let status = tokio::select! {
            status = child.wait() => status,
            _ = entry.generation.wait_for_trip() => {
                if let Some(pid) = pid {
                    send_sigterm(pid).await;
                }
                child.wait().await
            }
        };
        *entry.current_pid.lock() = None;

        let code = match status {
            Ok(status) => exit_code_of(&status),
            Err(err) => {
                warn!(job = %name, error = %err, "failed to wait for child process");
                -1
            }
        };

        // Step 7: update the run-status entry with the exit code.
        if let Err(err) = self.run_status.update(&run_id, code).await {
            warn!(job = %name, error = %err, "failed to persist exit status");
        }

        // Step 8: non-zero exits post to the error mailbox.
        if code != 0 {
            let message = format!("{name} failed with status code {code}");
            if let Err(err) = self
                .mailbox
                .add(chron_core::mailbox::ERRORS_SOURCE, &message)
                .await
            {
                warn!(job = %name, error = %err, "failed to post failure message to mailbox");
            }
        }

        // Step 9: footer and close.
        if let Some(mut file) = file {
            if let Err(err) = write_footer(&mut file, code) {
                warn!(job = %name, error = %err, "failed to write log footer");
            }
        }
    }

    /// Spawn failed entirely: there is no child to wait on, but the
    /// run-status entry must still be amended so it does not read as
    /// running forever, and the framing contract is preserved.
    async fn finish_without_child(&self, run_id: &RunId, name: &str, file: Option<std::fs::File>) {
        const SPAWN_FAILURE_CODE: i32 = -1;
        if let Err(err) = self.run_status.update(run_id, SPAWN_FAILURE_CODE).await {
            warn!(job = %name, error = %err, "failed to persist spawn-failure status");
        }
        let message = format!("{name} failed with status code {SPAWN_FAILURE_CODE}");
        if let Err(err) = self
            .mailbox
            .add(chron_core::mailbox::ERRORS_SOURCE, &message)
            .await
        {
            warn!(job = %name, error = %err, "failed to post spawn-failure message to mailbox");
        }
        if let Some(mut file) = file {
            let _ = write_footer(&mut file, SPAWN_FAILURE_CODE);
        }
    }
}

fn epoch_ms_to_datetime(ms: u64) -> Option<chrono::DateTime<Utc>> {
    chrono::DateTime::from_timestamp_millis(i64::try_from(ms).ok()?)
}

#[async_trait]
impl SupervisorView for Supervisor {
    fn list_jobs(&self) -> Vec<JobSummary> {
        let registry = self.registry.lock();
        registry
            .jobs
            .values()
            .map(|entry| JobSummary {
                name: entry.job.name.to_string(),
                running: entry.is_running(),
            })
            .collect()
    }

    async fn job_status(&self, name: &str) -> Option<JobStatusView> {
        let entry = self.find(name)?;
        let runs = self.recent_runs(name).await;
        let runs: Vec<RunSummary> = runs.iter().take(3).map(RunSummary::from).collect();
        let next_run = entry.scheduled.as_ref().and_then(|scheduled| {
            scheduled
                .schedule
                .next_after(Utc::now())
                .map(|t| t.to_rfc3339())
        });
        Some(JobStatusView {
            name: entry.job.name.to_string(),
            kind: entry.job.kind.label(),
            runs,
            next_run,
            pid: *entry.current_pid.lock(),
        })
    }

    fn log_path(&self, name: &str) -> Option<PathBuf> {
        let entry = self.find(name)?;
        Some(entry.job.log_path(&self.chron_dir))
    }

    async fn terminate(&self, name: &str) -> Option<TerminateOutcome> {
        let entry = self.find(name)?;
        let pid = *entry.current_pid.lock();
        match pid {
            Some(pid) => {
                send_sigterm(pid).await;
                Some(TerminateOutcome::Terminated)
            }
            None => Some(TerminateOutcome::NotRunning),
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
