//! `sync`: copy trace files out of the service container.
//!
//! The target service runs under docker-compose and writes traces inside its
//! own filesystem. This shells out to `docker-compose` to list and copy them
//! into the local trace directory. Files already present locally are skipped,
//! so repeated syncs are cheap.

use std::path::Path;
use std::process::Command;

use anyhow::Context;
use clap::Args;

/// Where the service writes traces inside its container.
const CONTAINER_TRACES_DIR: &str = "/app/profiles";

#[derive(Args)]
pub struct SyncArgs {
    /// docker-compose service name of the target
    #[arg(long, env = "TRACECAMP_CONTAINER", default_value = "api")]
    pub container: String,
}

pub fn run(traces_dir: &Path, args: SyncArgs) -> anyhow::Result<()> {
    let copied = sync_from_container(traces_dir, &args.container)?;
    println!("Synced {} new trace file(s) into {}", copied, traces_dir.display());
    Ok(())
}

/// Copy new trace files from the container. Returns how many were copied.
///
/// A container that is not running is a no-op, not an error: sync runs
/// automatically before `serve` and `dashboard` and must not break them when
/// the stack is down.
pub fn sync_from_container(traces_dir: &Path, container: &str) -> anyhow::Result<usize> {
    std::fs::create_dir_all(traces_dir)
        .with_context(|| format!("failed to create {}", traces_dir.display()))?;

    let ps = Command::new("docker-compose")
        .args(["ps", "-q", container])
        .output()
        .context("failed to run docker-compose")?;
    let container_id = String::from_utf8_lossy(&ps.stdout).trim().to_string();
    if container_id.is_empty() {
        println!("Container {:?} is not running; nothing to sync.", container);
        return Ok(0);
    }

    let find = Command::new("docker-compose")
        .args([
            "exec",
            "-T",
            container,
            "find",
            CONTAINER_TRACES_DIR,
            "-name",
            "*.html",
            "-type",
            "f",
        ])
        .output()
        .context("failed to list traces in container")?;

    let listing = String::from_utf8_lossy(&find.stdout);
    let mut copied = 0usize;
    let mut skipped = 0usize;

    for remote_path in listing.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(filename) = remote_path.rsplit('/').next() else {
            continue;
        };
        let target = traces_dir.join(filename);
        if target.exists() {
            skipped += 1;
            continue;
        }

        let cp = Command::new("docker")
            .args([
                "cp",
                &format!("{}:{}", container_id, remote_path),
                &target.to_string_lossy(),
            ])
            .output()
            .context("failed to run docker cp")?;

        if cp.status.success() {
            copied += 1;
        } else {
            tracing::warn!(
                file = filename,
                stderr = %String::from_utf8_lossy(&cp.stderr).trim(),
                "failed to copy trace file"
            );
        }
    }

    tracing::info!(copied, skipped, "container sync finished");
    Ok(copied)
}
