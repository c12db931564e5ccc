//! Black-box end-to-end specifications for the `chron` binary.
//!
//! These drive the compiled binary exactly as a user would: write a
//! chronfile, launch `chron` with `PORT`/`CHRON_DIR` set, and observe the
//! persisted stores, log files, and HTTP control plane. Covers the six
//! scenarios in `spec.md` §8.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use assert_cmd::cargo::cargo_bin;
use serde_json::Value;
use serial_test::serial;
use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command};
use std::time::{Duration, Instant};

/// Pick a free TCP port by binding to port 0 and releasing it. Subject to
/// a (small, accepted) race with anything else grabbing the port before
/// `chron` binds it.
fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

struct ChronProcess {
    child: Child,
    port: u16,
    chron_dir: std::path::PathBuf,
}

impl ChronProcess {
    fn spawn(chronfile: &Path, chron_dir: &Path) -> Self {
        let port = free_port();
        let child = Command::new(cargo_bin("chron"))
            .arg(chronfile)
            .env("PORT", port.to_string())
            .env("CHRON_DIR", chron_dir)
            .env("RUST_LOG", "info")
            .spawn()
            .expect("chron should spawn");
        Self {
            child,
            port,
            chron_dir: chron_dir.to_path_buf(),
        }
    }

    fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    fn job_status(&self, name: &str) -> Vec<Value> {
        let path = self.chron_dir.join("jobStatus.json");
        let Ok(bytes) = std::fs::read(&path) else {
            return Vec::new();
        };
        let entries: Vec<Value> = serde_json::from_slice(&bytes).unwrap_or_default();
        entries
            .into_iter()
            .filter(|e| e["name"] == name)
            .collect()
    }

    fn mailbox_source(&self, source: &str) -> Vec<Value> {
        let path = self.chron_dir.join("mailbox.json");
        let Ok(bytes) = std::fs::read(&path) else {
            return Vec::new();
        };
        let messages: Vec<Value> = serde_json::from_slice(&bytes).unwrap_or_default();
        messages
            .into_iter()
            .filter(|m| m["source"] == source)
            .collect()
    }

    fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.chron_dir.join("daemon.log")).unwrap_or_default()
    }
}

impl Drop for ChronProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Poll `condition` until it is true or `timeout` elapses.
fn wait_for<F: FnMut() -> bool>(timeout: Duration, mut condition: F) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    false
}

fn write_chronfile(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("chron.toml");
    let mut file = std::fs::File::create(&path).expect("create chronfile");
    file.write_all(contents.as_bytes()).expect("write chronfile");
    path
}

#[test]
#[serial(chron_port)]
fn startup_keep_alive_runs_repeatedly_without_errors() {
    let dir = tempfile::tempdir().unwrap();
    let chron_dir = dir.path().join("data");
    let chronfile = write_chronfile(
        dir.path(),
        r#"
            [startup.echo-loop]
            command = "true"
            keepAlive = true
        "#,
    );

    let chron = ChronProcess::spawn(&chronfile, &chron_dir);

    let ran_twice = wait_for(Duration::from_secs(12), || {
        chron.job_status("echo-loop").len() >= 2
    });
    assert!(ran_twice, "expected at least two runs of echo-loop");

    let runs = chron.job_status("echo-loop");
    assert!(runs.iter().all(|r| r["status_code"] == 0));
    assert!(chron.mailbox_source("@errors").is_empty());
}

#[test]
#[serial(chron_port)]
fn failing_startup_job_posts_to_error_mailbox() {
    let dir = tempfile::tempdir().unwrap();
    let chron_dir = dir.path().join("data");
    let chronfile = write_chronfile(
        dir.path(),
        r#"
            [startup.flaky]
            command = "exit 1"
            keepAlive = true
        "#,
    );

    let chron = ChronProcess::spawn(&chronfile, &chron_dir);

    let posted_twice = wait_for(Duration::from_secs(12), || {
        chron.mailbox_source("@errors").len() >= 2
    });
    assert!(posted_twice, "expected at least two error messages for flaky");

    let messages = chron.mailbox_source("@errors");
    assert!(messages
        .iter()
        .all(|m| m["message"].as_str().unwrap().contains("flaky failed with status code 1")));
}

#[test]
#[serial(chron_port)]
fn scheduled_missed_run_catch_up_runs_synchronously() {
    let dir = tempfile::tempdir().unwrap();
    let chron_dir = dir.path().join("data");
    std::fs::create_dir_all(&chron_dir).unwrap();

    let five_minutes_ago = (chrono_like_now_ms()).saturating_sub(5 * 60 * 1000);
    let seeded = serde_json::json!([
        { "id": "seed-1", "name": "tick", "timestamp": five_minutes_ago, "status_code": 0 }
    ]);
    std::fs::write(
        chron_dir.join("jobStatus.json"),
        serde_json::to_vec_pretty(&seeded).unwrap(),
    )
    .unwrap();

    let chronfile = write_chronfile(
        dir.path(),
        r#"
            [schedule.tick]
            schedule = "* * * * *"
            command = "true"
            makeUpMissedRuns = 2
        "#,
    );

    let chron = ChronProcess::spawn(&chronfile, &chron_dir);

    let caught_up = wait_for(Duration::from_secs(5), || {
        chron.job_status("tick").len() >= 3 // the seed entry plus 2 catch-up runs
    });
    assert!(caught_up, "expected 2 synchronous catch-up runs for tick");

    let log = chron.daemon_log();
    assert!(
        log.contains("Making up 2 of 5 missed runs for tick"),
        "daemon log did not contain the catch-up message: {log}"
    );
}

#[test]
#[serial(chron_port)]
fn reset_terminates_in_flight_children() {
    let dir = tempfile::tempdir().unwrap();
    let chron_dir = dir.path().join("data");
    let chronfile = write_chronfile(
        dir.path(),
        r#"
            [startup.sleeper]
            command = "sleep 60"
            keepAlive = true
        "#,
    );

    let chron = ChronProcess::spawn(&chronfile, &chron_dir);

    let running = wait_for(Duration::from_secs(5), || {
        let client = reqwest::blocking::Client::new();
        client
            .get(format!("{}/job/sleeper/status", chron.base_url()))
            .send()
            .ok()
            .and_then(|r| r.json::<Value>().ok())
            .map(|v| v.get("pid").is_some())
            .unwrap_or(false)
    });
    assert!(running, "expected sleeper to be running before reset");

    // Trigger reset by rewriting the chronfile to drop the job entirely.
    write_chronfile(dir.path(), "");

    let terminated = wait_for(Duration::from_secs(5), || {
        let client = reqwest::blocking::Client::new();
        let Ok(resp) = client.get(format!("{}/", chron.base_url())).send() else {
            return false;
        };
        let Ok(jobs) = resp.json::<Vec<Value>>() else {
            return false;
        };
        jobs.is_empty()
    });
    assert!(terminated, "expected registry to be empty after reload clears sleeper");
}

#[test]
#[serial(chron_port)]
fn control_plane_terminate_stops_a_running_job() {
    let dir = tempfile::tempdir().unwrap();
    let chron_dir = dir.path().join("data");
    let chronfile = write_chronfile(
        dir.path(),
        r#"
            [startup.sleeper]
            command = "sleep 60"
            keepAlive = false
        "#,
    );

    let chron = ChronProcess::spawn(&chronfile, &chron_dir);
    let client = reqwest::blocking::Client::new();

    let running = wait_for(Duration::from_secs(5), || {
        client
            .get(format!("{}/job/sleeper/status", chron.base_url()))
            .send()
            .ok()
            .and_then(|r| r.json::<Value>().ok())
            .map(|v| v.get("pid").is_some())
            .unwrap_or(false)
    });
    assert!(running, "expected sleeper to be running");

    let resp = client
        .post(format!("{}/job/sleeper/terminate", chron.base_url()))
        .send()
        .expect("terminate request");
    assert_eq!(resp.text().unwrap(), "Terminated job");

    let stopped = wait_for(Duration::from_secs(5), || {
        client
            .get(format!("{}/job/sleeper/status", chron.base_url()))
            .send()
            .ok()
            .and_then(|r| r.json::<Value>().ok())
            .map(|v| v.get("pid").is_none())
            .unwrap_or(false)
    });
    assert!(stopped, "expected sleeper to no longer be running");
}

#[test]
#[serial(chron_port)]
fn live_reconfiguration_swaps_jobs_within_a_couple_seconds() {
    let dir = tempfile::tempdir().unwrap();
    let chron_dir = dir.path().join("data");
    let chronfile = write_chronfile(
        dir.path(),
        r#"
            [schedule.a]
            schedule = "0 0 1 1 *"
            command = "true"
        "#,
    );

    let chron = ChronProcess::spawn(&chronfile, &chron_dir);
    let client = reqwest::blocking::Client::new();

    let has_a = wait_for(Duration::from_secs(5), || {
        client
            .get(format!("{}/", chron.base_url()))
            .send()
            .ok()
            .and_then(|r| r.json::<Vec<Value>>().ok())
            .map(|jobs| jobs.iter().any(|j| j["name"] == "a"))
            .unwrap_or(false)
    });
    assert!(has_a, "expected job 'a' to be registered initially");

    write_chronfile(
        dir.path(),
        r#"
            [schedule.b]
            schedule = "0 0 1 1 *"
            command = "true"
        "#,
    );

    let swapped = wait_for(Duration::from_secs(5), || {
        client
            .get(format!("{}/", chron.base_url()))
            .send()
            .ok()
            .and_then(|r| r.json::<Vec<Value>>().ok())
            .map(|jobs| jobs.len() == 1 && jobs[0]["name"] == "b")
            .unwrap_or(false)
    });
    assert!(swapped, "expected reload to replace 'a' with 'b'");
}

#[test]
#[serial(chron_port)]
fn missing_chronfile_argument_exits_nonzero() {
    let output = Command::new(cargo_bin("chron"))
        .env("PORT", "0")
        .output()
        .expect("chron should run");
    assert!(!output.status.success());
}

#[test]
#[serial(chron_port)]
fn invalid_port_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let chronfile = write_chronfile(dir.path(), "");
    let output = Command::new(cargo_bin("chron"))
        .arg(&chronfile)
        .env("PORT", "not-a-number")
        .env("CHRON_DIR", dir.path().join("data"))
        .output()
        .expect("chron should run");
    assert!(!output.status.success());
}

/// Avoids pulling a `Date.now()`-equivalent crate into the black-box
/// tests just for a single epoch-millis read.
fn chrono_like_now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
