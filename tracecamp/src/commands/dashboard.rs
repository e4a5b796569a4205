//! `dashboard`: render the static HTML dashboard.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use tracecamp_core::present::dashboard;
use tracecamp_core::{SortKey, TraceStore};

use super::open_browser;

#[derive(Args)]
pub struct DashboardArgs {
    /// Output path for the dashboard (default: <traces-dir>/profiling_dashboard.html)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Pull new traces from the service container before rendering
    #[arg(long)]
    pub auto_sync: bool,

    /// Do not open the dashboard in the browser
    #[arg(long)]
    pub no_browser: bool,

    /// docker-compose service name for the pre-render sync
    #[arg(long, env = "TRACECAMP_CONTAINER", default_value = "api")]
    pub container: String,
}

pub fn run(traces_dir: &Path, args: DashboardArgs) -> anyhow::Result<()> {
    if args.auto_sync {
        super::sync::sync_from_container(traces_dir, &args.container)?;
    }

    let store = TraceStore::scan(traces_dir)
        .with_context(|| format!("failed to scan {}", traces_dir.display()))?;

    println!("Trace directory: {}", traces_dir.display());
    println!("Found {} trace file(s)", store.stats.total_files);
    for record in store.get_filtered(None, Some(10), SortKey::Time) {
        println!("  {}", record.filename);
    }
    if store.stats.total_files > 10 {
        println!("  ... and {} more", store.stats.total_files - 10);
    }

    let output = args
        .output
        .unwrap_or_else(|| traces_dir.join("profiling_dashboard.html"));
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    std::fs::write(&output, dashboard::render(&store))
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!();
    println!("Dashboard written to {}", output.display());
    let link = format!(
        "file://{}",
        output
            .canonicalize()
            .unwrap_or_else(|_| output.clone())
            .display()
    );
    println!("Open: {}", link);

    if !args.no_browser {
        open_browser(&link);
    }

    Ok(())
}
