//! End-to-end pipeline tests: real trace files on disk, through scan,
//! parse, classify, aggregate, and filter.

use std::path::Path;

use tracecamp_core::{SortKey, TraceStore};

fn write_trace(dir: &Path, name: &str, size: usize) {
    std::fs::write(dir.join(name), "x".repeat(size)).unwrap();
}

#[test]
fn scan_parses_classifies_and_aggregates() {
    let dir = tempfile::tempdir().unwrap();
    write_trace(
        dir.path(),
        "0.123s _ api/v1/users ?profile=1 _ 1700000000.html",
        2048,
    );

    let store = TraceStore::scan(dir.path()).unwrap();
    assert_eq!(store.records.len(), 1);

    let record = &store.records[0];
    assert_eq!(record.duration_secs, Some(0.123));
    assert_eq!(record.endpoint, "api/v1/users");
    assert_eq!(record.app, "users");
    assert_eq!(record.timestamp, 1700000000);
    assert_eq!(record.size_bytes, 2048);

    assert_eq!(store.stats.total_files, 1);
    assert_eq!(store.stats.total_size_bytes, 2048);
    assert_eq!(store.stats.counts_by_app["users"], 1);
}

#[test]
fn scan_survives_unparseable_neighbors() {
    let dir = tempfile::tempdir().unwrap();
    write_trace(dir.path(), "0.5s _ admin _ 1700000001.html", 100);
    write_trace(dir.path(), "complete nonsense.html", 50);

    let store = TraceStore::scan(dir.path()).unwrap();
    assert_eq!(store.stats.total_files, 2);
    // The nonsense file still produced a record with an endpoint and app
    assert!(store.records.iter().all(|r| !r.endpoint.is_empty()));
    assert!(store.records.iter().all(|r| !r.app.is_empty()));
}

#[test]
fn scan_ignores_non_html_files() {
    let dir = tempfile::tempdir().unwrap();
    write_trace(dir.path(), "1700000000.html", 10);
    std::fs::write(dir.path().join("README.md"), "notes").unwrap();

    let store = TraceStore::scan(dir.path()).unwrap();
    assert_eq!(store.stats.total_files, 1);
}

#[test]
fn filtered_listing_is_a_prefix_of_the_unlimited_one() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..5 {
        write_trace(
            dir.path(),
            &format!("0.{}s _ api/v1/users _ 17000000{:02}.html", i + 1, i),
            10,
        );
    }

    let store = TraceStore::scan(dir.path()).unwrap();
    let unlimited = store.get_filtered(None, None, SortKey::Duration);
    let limited = store.get_filtered(None, Some(3), SortKey::Duration);

    assert_eq!(limited.len(), 3);
    for (a, b) in limited.iter().zip(unlimited.iter()) {
        assert_eq!(a.filename, b.filename);
    }

    // Descending by duration
    assert!(unlimited
        .windows(2)
        .all(|w| w[0].duration_secs >= w[1].duration_secs));
}

#[test]
fn app_filter_runs_before_limit() {
    let dir = tempfile::tempdir().unwrap();
    write_trace(dir.path(), "0.9s _ admin _ 1700000001.html", 10);
    write_trace(dir.path(), "0.1s _ api/v1/users _ 1700000002.html", 10);
    write_trace(dir.path(), "0.2s _ api/v1/users _ 1700000003.html", 10);

    let store = TraceStore::scan(dir.path()).unwrap();

    // If the limit applied first, the single slot could go to the admin
    // trace and the app filter would return nothing.
    let users = store.get_filtered(Some("users"), Some(1), SortKey::Duration);
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].app, "users");
    assert_eq!(users[0].duration_secs, Some(0.2));
}
