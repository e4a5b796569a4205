//! Retention sweeping for the trace directory.
//!
//! Deletes trace files older than a cutoff. Age is judged by filesystem
//! modification time, not by the timestamp token in the filename, so files
//! the parser cannot read still age out.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::{Error, Result};

/// What a sweep removed, or would remove under `--dry-run`.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub files: Vec<PathBuf>,
    pub total_size_bytes: u64,
    pub dry_run: bool,
}

/// Sweep trace files older than `max_age_days`.
///
/// With `dry_run` the report is identical but nothing is deleted.
pub fn sweep(dir: &Path, max_age_days: u64, dry_run: bool) -> Result<SweepReport> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(max_age_days * 24 * 3600))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    sweep_before(dir, cutoff, dry_run)
}

/// Sweep trace files modified before `cutoff`.
pub fn sweep_before(dir: &Path, cutoff: SystemTime, dry_run: bool) -> Result<SweepReport> {
    if !dir.is_dir() {
        return Err(Error::TraceDirMissing(dir.to_path_buf()));
    }

    let pattern = dir.join("*.html");
    let entries = glob::glob(&pattern.to_string_lossy())
        .map_err(|e| Error::Config(format!("invalid trace glob: {}", e)))?;

    let mut report = SweepReport {
        dry_run,
        ..Default::default()
    };

    for entry in entries.flatten() {
        let Ok(metadata) = std::fs::metadata(&entry) else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        if modified >= cutoff {
            continue;
        }

        if !dry_run {
            std::fs::remove_file(&entry)?;
            tracing::info!(file = %entry.display(), "deleted old trace file");
        }

        report.total_size_bytes += metadata.len();
        report.files.push(entry);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_reports_without_deleting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1700000000.html");
        std::fs::write(&path, "trace").unwrap();

        // Everything on disk is older than a cutoff in the future.
        let cutoff = SystemTime::now() + Duration::from_secs(3600);
        let report = sweep_before(dir.path(), cutoff, true).unwrap();

        assert!(report.dry_run);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.total_size_bytes, 5);
        assert!(path.exists(), "dry run must not delete");
    }

    #[test]
    fn test_sweep_deletes_old_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1700000000.html");
        std::fs::write(&path, "trace").unwrap();

        let cutoff = SystemTime::now() + Duration::from_secs(3600);
        let report = sweep_before(dir.path(), cutoff, false).unwrap();

        assert_eq!(report.files.len(), 1);
        assert!(!path.exists());
    }

    #[test]
    fn test_sweep_keeps_files_newer_than_cutoff() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.html");
        std::fs::write(&old, "old").unwrap();

        std::thread::sleep(Duration::from_millis(50));
        let cutoff = SystemTime::now();
        std::thread::sleep(Duration::from_millis(50));

        let new = dir.path().join("new.html");
        std::fs::write(&new, "new").unwrap();

        let report = sweep_before(dir.path(), cutoff, false).unwrap();
        assert_eq!(report.files, vec![old.clone()]);
        assert!(!old.exists());
        assert!(new.exists());
    }

    #[test]
    fn test_sweep_ignores_non_html_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        let cutoff = SystemTime::now() + Duration::from_secs(3600);
        let report = sweep_before(dir.path(), cutoff, false).unwrap();
        assert!(report.files.is_empty());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_sweep_missing_dir_is_error() {
        let result = sweep(Path::new("/nonexistent/traces"), 7, true);
        assert!(matches!(result, Err(Error::TraceDirMissing(_))));
    }

    #[test]
    fn test_huge_max_age_saturates_to_epoch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.html"), "x").unwrap();

        // Nothing can be older than the epoch, so nothing matches.
        let report = sweep(dir.path(), 36500, false).unwrap();
        assert!(report.files.is_empty());
    }
}
