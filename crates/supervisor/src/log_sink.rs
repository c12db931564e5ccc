// SPDX-License-Identifier: MIT

//! Per-invocation log file framing: a header and divider before each
//! run's output, a divider and status line after.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

const DIVIDER: &str = "--------------------------------------------------------------------------------";

/// Open the per-job log file in append mode, creating the `logs/`
/// directory if needed, and write the start-of-run header.
pub fn open_and_write_header(log_path: &Path) -> std::io::Result<File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(log_path)?;
    writeln!(file, "{}", Local::now().to_rfc3339())?;
    writeln!(file, "{}", DIVIDER)?;
    Ok(file)
}

/// Write the end-of-run divider and status line.
pub fn write_footer(file: &mut File, status_code: i32) -> std::io::Result<()> {
    writeln!(file, "{}", DIVIDER)?;
    writeln!(file, "Status: {}", status_code)?;
    writeln!(file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_footer_frame_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("logs").join("job-a.log");
        let mut file = open_and_write_header(&log_path).unwrap();
        writeln!(file, "hello from the job").unwrap();
        write_footer(&mut file, 0).unwrap();
        drop(file);

        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert!(contents.contains("hello from the job"));
        assert!(contents.contains("Status: 0"));
        assert_eq!(contents.matches(DIVIDER).count(), 2);
    }

    #[test]
    fn reopening_appends_rather_than_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("job-a.log");
        {
            let mut file = open_and_write_header(&log_path).unwrap();
            write_footer(&mut file, 0).unwrap();
        }
        {
            let mut file = open_and_write_header(&log_path).unwrap();
            write_footer(&mut file, 1).unwrap();
        }
        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(contents.matches("Status:").count(), 2);
    }
}
