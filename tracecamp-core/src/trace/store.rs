//! Trace store scanning and aggregation.
//!
//! The trace directory is the only shared state between invocations. Every
//! scan rebuilds records from scratch (no persisted identity), folds them
//! into aggregate statistics, and groups them by app. Parsing is total, so a
//! malformed filename can never abort the scan of its neighbors.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::trace::TraceRecord;

/// Sort order for filtered listings. Always descending: the first item is
/// the one an operator most wants to see first (newest, slowest, largest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Time,
    Duration,
    Size,
}

/// Aggregate statistics over one scan. Computed, never persisted.
#[derive(Debug, Clone, Default)]
pub struct AggregateStats {
    pub total_files: usize,
    pub total_size_bytes: u64,
    /// Average over records with a known duration only; 0.0 when none have one
    pub avg_duration_secs: f64,
    pub fastest: Option<TraceRecord>,
    pub slowest: Option<TraceRecord>,
    pub counts_by_app: BTreeMap<String, usize>,
}

/// One scan of the trace directory: records, aggregates, and app grouping.
#[derive(Debug, Default)]
pub struct TraceStore {
    pub records: Vec<TraceRecord>,
    pub stats: AggregateStats,
    pub app_groups: BTreeMap<String, Vec<TraceRecord>>,
}

impl TraceStore {
    /// Scan a trace directory (non-recursive) and aggregate what it finds.
    ///
    /// An empty directory is a valid, empty store. A missing directory is an
    /// error: it points at a setup problem the operator should see.
    pub fn scan(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::TraceDirMissing(dir.to_path_buf()));
        }

        let pattern = dir.join("*.html");
        let entries = glob::glob(&pattern.to_string_lossy())
            .map_err(|e| Error::Config(format!("invalid trace glob: {}", e)))?;

        let records: Vec<TraceRecord> = entries
            .flatten()
            .map(|path| TraceRecord::from_path(&path))
            .collect();

        tracing::debug!(dir = %dir.display(), files = records.len(), "scanned trace directory");

        Ok(Self::from_records(records))
    }

    /// Fold a record list into aggregates and app groups.
    ///
    /// Duplicate filenames simply produce duplicate records; there is no
    /// dedup contract.
    pub fn from_records(records: Vec<TraceRecord>) -> Self {
        let mut stats = AggregateStats {
            total_files: records.len(),
            ..Default::default()
        };
        let mut app_groups: BTreeMap<String, Vec<TraceRecord>> = BTreeMap::new();

        let mut duration_total = 0.0;
        let mut duration_count = 0usize;

        for record in &records {
            stats.total_size_bytes += record.size_bytes;
            *stats.counts_by_app.entry(record.app.clone()).or_default() += 1;
            app_groups
                .entry(record.app.clone())
                .or_default()
                .push(record.clone());

            if let Some(duration) = record.duration_secs {
                duration_total += duration;
                duration_count += 1;

                let is_fastest = stats
                    .fastest
                    .as_ref()
                    .and_then(|r| r.duration_secs)
                    .map_or(true, |best| duration < best);
                if is_fastest {
                    stats.fastest = Some(record.clone());
                }

                let is_slowest = stats
                    .slowest
                    .as_ref()
                    .and_then(|r| r.duration_secs)
                    .map_or(true, |worst| duration > worst);
                if is_slowest {
                    stats.slowest = Some(record.clone());
                }
            }
        }

        if duration_count > 0 {
            stats.avg_duration_secs = duration_total / duration_count as f64;
        }

        Self {
            records,
            stats,
            app_groups,
        }
    }

    /// Filter by app, sort descending by `sort`, then truncate to `limit`.
    ///
    /// The filter runs before sorting and the limit after, so `limit = k`
    /// always yields the first k elements of the unlimited sorted result.
    pub fn get_filtered(
        &self,
        app: Option<&str>,
        limit: Option<usize>,
        sort: SortKey,
    ) -> Vec<TraceRecord> {
        let mut records: Vec<TraceRecord> = self
            .records
            .iter()
            .filter(|r| app.map_or(true, |a| r.app == a))
            .cloned()
            .collect();

        match sort {
            SortKey::Time => records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortKey::Duration => records.sort_by(|a, b| {
                // Unknown durations sort as zero, matching the listing's "N/A last"
                let a = a.duration_secs.unwrap_or(0.0);
                let b = b.duration_secs.unwrap_or(0.0);
                b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortKey::Size => records.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes)),
        }

        if let Some(limit) = limit {
            records.truncate(limit);
        }

        records
    }
}
