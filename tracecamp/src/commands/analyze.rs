//! `analyze`: console listing and aggregate statistics.

use std::path::Path;

use anyhow::Context;
use clap::Args;

use tracecamp_core::present::print_listing;
use tracecamp_core::{SortKey, TraceStore};

use super::{parse_limit, SortArg};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Only list traces for this app
    #[arg(long)]
    pub app: Option<String>,

    /// Maximum traces to list ("none" or 0 for unlimited)
    #[arg(long, default_value = "20")]
    pub limit: String,

    /// Listing sort order
    #[arg(long, value_enum, default_value_t = SortArg::Duration)]
    pub sort: SortArg,
}

pub fn run(traces_dir: &Path, args: AnalyzeArgs) -> anyhow::Result<()> {
    let store = TraceStore::scan(traces_dir)
        .with_context(|| format!("failed to scan {}", traces_dir.display()))?;

    let limit = parse_limit(&args.limit).map_err(anyhow::Error::msg)?;
    print_listing(
        &store,
        args.app.as_deref(),
        limit,
        SortKey::from(args.sort),
        None,
    );

    Ok(())
}
