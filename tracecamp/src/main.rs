//! tracecamp - profiling campaign CLI.
//!
//! Drives profiled request campaigns against a target service, then scans,
//! serves, and analyzes the trace files the service writes.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tracecamp",
    about = "Profiling campaign tool: generate traced requests, then analyze the traces",
    version
)]
struct Cli {
    /// Directory holding trace HTML files
    #[arg(long, global = true, env = "TRACECAMP_TRACES_DIR", default_value = "profiles")]
    traces_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a request campaign against the target service
    Generate(commands::generate::GenerateArgs),
    /// Copy trace files out of the service container
    Sync(commands::sync::SyncArgs),
    /// Serve trace files over HTTP with a console listing
    Serve(commands::serve::ServeArgs),
    /// Generate the static HTML dashboard
    Dashboard(commands::dashboard::DashboardArgs),
    /// Print the trace listing and aggregate statistics
    Analyze(commands::analyze::AnalyzeArgs),
    /// Delete trace files older than a retention window
    Clean(commands::clean::CleanArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = tracecamp_core::logging::init().context("failed to initialize logging")?;

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Sync(args) => commands::sync::run(&cli.traces_dir, args),
        Commands::Serve(args) => commands::serve::run(&cli.traces_dir, args),
        Commands::Dashboard(args) => commands::dashboard::run(&cli.traces_dir, args),
        Commands::Analyze(args) => commands::analyze::run(&cli.traces_dir, args),
        Commands::Clean(args) => commands::clean::run(&cli.traces_dir, args),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }

    result
}
