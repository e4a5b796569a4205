//! `clean`: retention sweep over the trace directory.

use std::path::Path;

use anyhow::Context;
use clap::Args;

use tracecamp_core::format::format_mb;
use tracecamp_core::sweep;

#[derive(Args)]
pub struct CleanArgs {
    /// Delete traces older than this many days
    #[arg(long, env = "TRACECAMP_CLEAN_DAYS", default_value_t = 7)]
    pub days: u64,

    /// Report what would be deleted without deleting
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(traces_dir: &Path, args: CleanArgs) -> anyhow::Result<()> {
    let report = sweep(traces_dir, args.days, args.dry_run)
        .with_context(|| format!("failed to sweep {}", traces_dir.display()))?;

    if report.files.is_empty() {
        println!("No old trace files to clean (older than {} days).", args.days);
        return Ok(());
    }

    println!(
        "{} trace file(s) older than {} days ({})",
        report.files.len(),
        args.days,
        format_mb(report.total_size_bytes)
    );

    for file in &report.files {
        if report.dry_run {
            println!("Would delete: {}", file.display());
        } else {
            println!("Deleted: {}", file.display());
        }
    }

    if !report.dry_run {
        println!("Cleaned {} file(s).", report.files.len());
    }

    Ok(())
}
