//! `serve`: static trace server plus console listing.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Args;

use tracecamp_core::present::server::TraceFileServer;
use tracecamp_core::present::{print_listing, trace_url};
use tracecamp_core::{SortKey, TraceStore};

use super::{open_browser, parse_limit, SortArg};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to serve trace files on
    #[arg(long, env = "TRACECAMP_SERVER_PORT", default_value_t = 8102)]
    pub port: u16,

    /// Only list traces for this app
    #[arg(long)]
    pub app: Option<String>,

    /// Maximum traces to list ("none" or 0 for unlimited)
    #[arg(long, default_value = "20")]
    pub limit: String,

    /// Listing sort order
    #[arg(long, value_enum, default_value_t = SortArg::Time)]
    pub sort: SortArg,

    /// Pull new traces from the service container before serving
    #[arg(long)]
    pub auto_sync: bool,

    /// Do not open the top listed trace in the browser
    #[arg(long)]
    pub no_browser: bool,

    /// docker-compose service name for the pre-serve sync
    #[arg(long, env = "TRACECAMP_CONTAINER", default_value = "api")]
    pub container: String,
}

pub fn run(traces_dir: &Path, args: ServeArgs) -> anyhow::Result<()> {
    if args.auto_sync {
        super::sync::sync_from_container(traces_dir, &args.container)?;
    }

    let store = TraceStore::scan(traces_dir)
        .with_context(|| format!("failed to scan {}", traces_dir.display()))?;
    if store.records.is_empty() {
        bail!(
            "no trace files in {}; run `tracecamp generate` first",
            traces_dir.display()
        );
    }

    let limit = parse_limit(&args.limit).map_err(anyhow::Error::msg)?;
    let sort = SortKey::from(args.sort);

    let server = TraceFileServer::bind(traces_dir, args.port)
        .with_context(|| format!("failed to bind port {}", args.port))?;

    print_listing(&store, args.app.as_deref(), limit, sort, Some(args.port));
    println!();
    println!("Serving traces at http://localhost:{}/", args.port);
    println!("Press Ctrl+C to stop.");

    if !args.no_browser {
        if let Some(top) = browser_target(&store, args.app.as_deref(), sort) {
            open_browser(&trace_url(args.port, &top.filename));
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    let stop = Arc::clone(&running);
    ctrlc::set_handler(move || {
        stop.store(false, Ordering::SeqCst);
    })
    .context("failed to install interrupt handler")?;

    server.serve(&running).context("trace server failed")?;
    println!("Server stopped.");
    Ok(())
}

/// The trace to open in the browser: the top entry of the listing the
/// operator asked for, under the same app filter and sort order.
fn browser_target(
    store: &TraceStore,
    app: Option<&str>,
    sort: SortKey,
) -> Option<tracecamp_core::TraceRecord> {
    store.get_filtered(app, Some(1), sort).into_iter().next()
}
