//! # tracecamp-core
//!
//! Core library for tracecamp - a profiling campaign tool.
//!
//! This library provides:
//! - A campaign runner that drives concurrent, traced HTTP requests
//! - A total parser reconstructing records from trace filenames
//! - Scanning and aggregation over the shared trace directory
//! - Presentation (console listing, static file server, HTML dashboard)
//! - Retention sweeping
//!
//! ## Architecture
//!
//! The pipeline is producer -> ingest -> parse -> aggregate -> present:
//! the campaign runner makes the target service emit trace files, the trace
//! store scans and parses them, and the presentation layer renders the
//! aggregates. All shared state is the trace directory on disk; every
//! invocation is independent and idempotent.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tracecamp_core::{SortKey, TraceStore};
//!
//! let store = TraceStore::scan(Path::new("profiles")).expect("failed to scan traces");
//! for record in store.get_filtered(None, Some(10), SortKey::Duration) {
//!     println!("{} {}", record.endpoint, record.app);
//! }
//! ```

// Re-export commonly used items at the crate root
pub use campaign::{CampaignRunner, RequestOutcome, SyncCampaignRunner};
pub use config::{AuthConfig, CampaignConfig, EndpointSpec};
pub use error::{Error, Result};
pub use sweep::{sweep, SweepReport};
pub use trace::store::{AggregateStats, SortKey, TraceStore};
pub use trace::TraceRecord;

// Public modules
pub mod campaign;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod present;
pub mod sweep;
pub mod trace;
