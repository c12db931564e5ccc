// SPDX-License-Identifier: MIT

//! chron — personal job supervisor.
//!
//! Entry point: reads environment and argv, constructs the supervisor
//! and its stores, loads the chronfile, installs a debounced watcher on
//! it, and serves the HTTP control plane until the process is signaled.

mod runtime_config;
mod watcher;

use std::path::PathBuf;
use std::sync::Arc;

use chron_storage::{Mailbox, RunStatusStore};
use chron_supervisor::{Supervisor, SupervisorView};
use clap::Parser;
use runtime_config::RuntimeConfig;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

/// `chron <chronfile.toml>`: launch and supervise the jobs it declares.
#[derive(Parser)]
#[command(name = "chron", version, about = "A personal job supervisor")]
struct Cli {
    /// Path to the chronfile to load and watch.
    chronfile: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let Some(chronfile) = cli.chronfile else {
        eprintln!("error: missing required argument <chronfile.toml>");
        std::process::exit(1);
    };

    let config = match RuntimeConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let _log_guard = setup_logging(&config);

    if let Err(err) = run(chronfile, config).await {
        error!(error = %err, "chron exited with an error");
        std::process::exit(1);
    }
}

async fn run(chronfile: PathBuf, config: RuntimeConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.chron_dir)?;

    let run_status = Arc::new(RunStatusStore::load(config.job_status_path.clone()).await?);
    let mailbox = Arc::new(Mailbox::load(config.mailbox_path.clone()).await?);
    let supervisor = Arc::new(Supervisor::new(
        config.chron_dir.clone(),
        Some(config.port),
        Arc::clone(&run_status),
        Arc::clone(&mailbox),
    ));

    chron_config::load(&supervisor, &chronfile).await?;
    info!(path = %chronfile.display(), "initial chronfile load complete");

    // Held for the lifetime of the process; dropping it stops the watch.
    let _watcher_guard = watcher::watch(&chronfile, Arc::clone(&supervisor))?;

    let view: Arc<dyn SupervisorView> = supervisor;
    let app = chron_http::app(view, mailbox);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "control plane listening");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("received SIGINT, shutting down");
        }
    }

    Ok(())
}

fn setup_logging(config: &RuntimeConfig) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.daemon_log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let file_appender = tracing_appender::rolling::never(
        config.daemon_log_path.parent().unwrap_or_else(|| std::path::Path::new(".")),
        config
            .daemon_log_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("daemon.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false).with_filter(filter()))
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter()))
        .init();

    guard
}
