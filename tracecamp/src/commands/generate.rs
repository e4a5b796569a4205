//! `generate`: run a profiled request campaign against the target service.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Args;

use tracecamp_core::campaign::report;
use tracecamp_core::{CampaignConfig, SyncCampaignRunner};

#[derive(Args)]
pub struct GenerateArgs {
    /// Campaign configuration file (created on first run)
    #[arg(
        long,
        env = "TRACECAMP_CONFIG_FILE",
        default_value = "profiling_config.json"
    )]
    pub config: PathBuf,

    /// Base URL of the target service
    #[arg(
        long,
        env = "TRACECAMP_BASE_URL",
        default_value = "http://127.0.0.1:8101"
    )]
    pub base_url: String,

    /// Maximum requests in flight at once
    #[arg(long, env = "TRACECAMP_CONCURRENT_REQUESTS", default_value_t = 3)]
    pub concurrent: usize,

    /// Requests per endpoint
    #[arg(long, env = "TRACECAMP_REQUESTS_PER_ENDPOINT", default_value_t = 2)]
    pub requests: usize,

    /// Comma-separated endpoint group names (default: all groups)
    #[arg(long)]
    pub endpoints: Option<String>,

    /// Also drive endpoints marked disabled in the config
    #[arg(long)]
    pub include_disabled: bool,

    /// Login identifier for the campaign account
    #[arg(
        long,
        env = "TRACECAMP_AUTH_EMAIL",
        default_value = "admin@example.com"
    )]
    pub email: String,

    /// Login secret for the campaign account
    #[arg(long, env = "TRACECAMP_AUTH_PASSWORD", default_value = "admin")]
    pub password: String,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    if !args.config.exists() {
        CampaignConfig::write_default(&args.config)
            .with_context(|| format!("failed to write {}", args.config.display()))?;
        println!("Created default config at {}", args.config.display());
        println!("Review it, then run `tracecamp generate` again.");
        return Ok(());
    }

    let config = CampaignConfig::load_from(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    let endpoints = config.select_endpoints(args.endpoints.as_deref(), args.include_disabled);
    if endpoints.is_empty() {
        bail!("no endpoints selected; check --endpoints against the config");
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        println!("\nInterrupt received, finishing in-flight requests...");
        cancel_flag.store(true, Ordering::SeqCst);
    })
    .context("failed to install interrupt handler")?;

    println!(
        "Campaign: {} endpoints x {} requests, {} concurrent, against {}",
        endpoints.len(),
        args.requests,
        args.concurrent,
        args.base_url
    );

    let mut runner =
        SyncCampaignRunner::new(&args.base_url, config.auth, &args.email, &args.password)
            .context("failed to create campaign runner")?;

    if runner.authenticate() {
        println!("Authenticated as {}", args.email);
    } else {
        println!("Authentication failed; continuing with anonymous requests.");
    }

    let outcomes = runner.dispatch(&endpoints, args.concurrent, args.requests, Arc::clone(&cancel));

    report::print_summary(&outcomes);

    if cancel.load(Ordering::SeqCst) {
        println!("\nCampaign interrupted; partial results above.");
    } else {
        println!("\nCampaign complete. Run `tracecamp analyze` to inspect the traces.");
    }

    Ok(())
}
