//! Presentation layer: console listing, static trace server, and the HTML
//! dashboard.

pub mod dashboard;
pub mod server;

use crate::format::{format_duration_opt, format_mb};
use crate::trace::store::{AggregateStats, SortKey, TraceStore};
use crate::trace::TraceRecord;

/// URL for opening one trace file through the local trace server.
pub fn trace_url(port: u16, filename: &str) -> String {
    format!(
        "http://localhost:{}/{}",
        port,
        urlencoding::encode(filename)
    )
}

/// Print the grouped trace listing to stdout.
///
/// When `port` is given each entry carries a clickable server URL; without
/// it the listing is analysis-only.
pub fn print_listing(
    store: &TraceStore,
    app: Option<&str>,
    limit: Option<usize>,
    sort: SortKey,
    port: Option<u16>,
) {
    let records = store.get_filtered(app, limit, sort);

    if records.is_empty() {
        println!("No trace files found.");
        println!("Run a campaign first to generate traces.");
        return;
    }

    println!();
    println!("{}", "=".repeat(70));
    println!("TRACE ANALYSIS");
    println!("{}", "=".repeat(70));

    let mut grouped: std::collections::BTreeMap<&str, Vec<&TraceRecord>> =
        std::collections::BTreeMap::new();
    for record in &records {
        grouped.entry(record.app.as_str()).or_default().push(record);
    }

    let mut index = 1;
    for (app, traces) in grouped {
        println!();
        println!("{} ({} traces)", app, traces.len());
        println!("{}", "-".repeat(70));
        for record in traces {
            println!(
                "{:>3}. [{:>8}] {}",
                index,
                format_duration_opt(record.duration_secs),
                record.endpoint
            );
            println!(
                "     {} | {}",
                record.formatted_time,
                format_mb(record.size_bytes)
            );
            if let Some(port) = port {
                println!("     {}", trace_url(port, &record.filename));
            }
            index += 1;
        }
    }

    println!();
    print_stats(&store.stats);
}

/// Print aggregate statistics to stdout.
pub fn print_stats(stats: &AggregateStats) {
    println!("{}", "=".repeat(70));
    println!("SUMMARY");
    println!("  Total files: {}", stats.total_files);
    println!("  Total size:  {}", format_mb(stats.total_size_bytes));
    if stats.avg_duration_secs > 0.0 {
        println!("  Avg duration: {:.3}s", stats.avg_duration_secs);
    }
    if let Some(fastest) = &stats.fastest {
        println!(
            "  Fastest: {} ({})",
            fastest.endpoint,
            format_duration_opt(fastest.duration_secs)
        );
    }
    if let Some(slowest) = &stats.slowest {
        println!(
            "  Slowest: {} ({})",
            slowest.endpoint,
            format_duration_opt(slowest.duration_secs)
        );
    }
    if !stats.counts_by_app.is_empty() {
        println!("  Apps:");
        for (app, count) in &stats.counts_by_app {
            println!("    {:<20} {}", app, count);
        }
    }
    println!("{}", "=".repeat(70));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_url_encodes_filename() {
        let url = trace_url(8102, "0.1s _ api/v1/users _ 1700000000.html");
        assert!(url.starts_with("http://localhost:8102/"));
        assert!(!url.contains(' '));
        assert!(url.contains("api%2Fv1%2Fusers"));
    }
}
