//! Per-campaign summary report.
//!
//! Groups outcomes by endpoint and prints success rate, duration spread, and
//! error counts to stdout at the end of a run.

use std::collections::BTreeMap;

use crate::campaign::runner::RequestOutcome;

/// Rolled-up statistics for one endpoint across a campaign.
#[derive(Debug, Clone)]
pub struct EndpointSummary {
    pub requests: usize,
    pub successful: usize,
    pub total_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub errors: usize,
    pub auth_used: bool,
}

impl Default for EndpointSummary {
    fn default() -> Self {
        Self {
            requests: 0,
            successful: 0,
            total_duration: 0.0,
            min_duration: f64::INFINITY,
            max_duration: 0.0,
            errors: 0,
            auth_used: false,
        }
    }
}

impl EndpointSummary {
    pub fn success_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.successful as f64 / self.requests as f64 * 100.0
        }
    }

    pub fn avg_duration(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.total_duration / self.requests as f64
        }
    }
}

/// Group outcomes by endpoint and accumulate per-endpoint statistics.
pub fn summarize(outcomes: &[RequestOutcome]) -> BTreeMap<String, EndpointSummary> {
    let mut summaries: BTreeMap<String, EndpointSummary> = BTreeMap::new();

    for outcome in outcomes {
        let summary = summaries.entry(outcome.endpoint.clone()).or_default();
        summary.requests += 1;
        summary.total_duration += outcome.duration_secs;
        summary.min_duration = summary.min_duration.min(outcome.duration_secs);
        summary.max_duration = summary.max_duration.max(outcome.duration_secs);
        summary.auth_used |= outcome.auth_used;
        if outcome.success {
            summary.successful += 1;
        } else {
            summary.errors += 1;
        }
    }

    summaries
}

/// Print the end-of-campaign report to stdout.
pub fn print_summary(outcomes: &[RequestOutcome]) {
    println!();
    println!("{}", "=".repeat(60));
    println!("CAMPAIGN SUMMARY");
    println!("{}", "=".repeat(60));

    if outcomes.is_empty() {
        println!("No requests were dispatched.");
        return;
    }

    for (endpoint, summary) in summarize(outcomes) {
        let marker = if summary.auth_used { "[auth]" } else { "[anon]" };
        println!();
        println!("{} {}", marker, endpoint);
        println!("  Requests:     {}", summary.requests);
        println!("  Success Rate: {:.1}%", summary.success_rate());
        println!(
            "  Duration:     {:.3}s - {:.3}s (avg {:.3}s)",
            summary.min_duration,
            summary.max_duration,
            summary.avg_duration()
        );
        if summary.errors > 0 {
            println!("  Errors:       {}", summary.errors);
        }
    }

    let total = outcomes.len();
    let successful = outcomes.iter().filter(|o| o.success).count();
    let total_duration: f64 = outcomes.iter().map(|o| o.duration_secs).sum();

    println!();
    println!("{}", "-".repeat(60));
    println!("OVERALL");
    println!("  Total Requests: {}", total);
    println!(
        "  Successful:     {} ({:.1}%)",
        successful,
        successful as f64 / total as f64 * 100.0
    );
    println!("  Failed:         {}", total - successful);
    println!("  Total Duration: {:.3}s", total_duration);
    println!("{}", "=".repeat(60));
}
