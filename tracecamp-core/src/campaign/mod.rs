//! Campaign execution: authentication, concurrent dispatch, and the
//! per-run summary report.

pub mod report;
pub mod runner;

pub use report::{print_summary, summarize, EndpointSummary};
pub use runner::{CampaignRunner, RequestOutcome, SyncCampaignRunner, PROFILE_MARKER};
