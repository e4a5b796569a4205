//! Trace records and the filename parser.
//!
//! Trace files are written by a profiler embedded in the target service. The
//! filenames follow a loosely versioned, undocumented convention that encodes
//! duration, endpoint, and timestamp in several arrangements. We do not own
//! that convention, so parsing is defensive: an ordered cascade of patterns
//! is tried most specific first, and a numeric-scrape fallback guarantees
//! that *every* filename yields a best-effort record.
//!
//! # Error Handling
//!
//! Parsing is total. A filename that matches nothing still produces a record
//! with a sanitized endpoint; a timestamp token that fails to parse as epoch
//! seconds falls back to the file's modification time. This keeps a single
//! unreadable file from ever aborting a directory scan.

pub mod classify;
pub mod store;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::UNIX_EPOCH;

use regex::Regex;

use crate::format::format_epoch;

/// A structured view of one trace file, rebuilt on every scan.
#[derive(Debug, Clone)]
pub struct TraceRecord {
    /// Path to the backing trace file (the file is owned by the filesystem)
    pub path: PathBuf,
    /// Original filename; the parsing input and the on-disk key
    pub filename: String,
    /// Request duration, when the filename carried a duration token.
    /// `None` means unknown, never zero.
    pub duration_secs: Option<f64>,
    /// Best-effort reconstruction of the HTTP path; never empty
    pub endpoint: String,
    /// Coarse classification label derived from the endpoint
    pub app: String,
    /// Epoch seconds from the filename token, else the file mtime
    pub timestamp: i64,
    /// Human-readable rendering of `timestamp`
    pub formatted_time: String,
    /// File size at scan time
    pub size_bytes: u64,
}

impl TraceRecord {
    /// Build a record for a trace file on disk.
    ///
    /// Total: any path yields a record. Stat failures degrade to zero size
    /// and an epoch-zero mtime fallback rather than erroring.
    pub fn from_path(path: &Path) -> TraceRecord {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let metadata = std::fs::metadata(path).ok();
        let size_bytes = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
        let mtime_epoch = metadata
            .and_then(|m| m.modified().ok())
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let parsed = parse_filename(&filename);
        let timestamp = parsed.timestamp.unwrap_or(mtime_epoch);
        let app = classify::classify_app(&parsed.endpoint);

        TraceRecord {
            path: path.to_path_buf(),
            filename,
            duration_secs: parsed.duration_secs,
            endpoint: parsed.endpoint,
            app,
            timestamp,
            formatted_time: format_epoch(timestamp),
            size_bytes,
        }
    }
}

/// What a filename alone tells us, before file metadata fills the gaps.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedName {
    pub duration_secs: Option<f64>,
    pub endpoint: String,
    pub timestamp: Option<i64>,
}

/// How to read the capture groups of a matched pattern.
enum Shape {
    /// Groups: (duration, endpoint, timestamp)
    DurationEndpointStamp,
    /// Groups: (timestamp); the endpoint is whatever text remains
    StampOnly,
}

struct Pattern {
    re: Regex,
    shape: Shape,
}

/// The cascade, most specific first. Kept as a table of (pattern, shape)
/// pairs rather than one combined expression so individual arrangements stay
/// testable and new profiler versions only add a row.
fn patterns() -> &'static [Pattern] {
    static PATTERNS: OnceLock<Vec<Pattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let dur_end_stamp = [
            // "0.123s _ endpoint ?profile=1 _ 1758190144.html"
            r"^(\d+\.?\d*)s\s+_\s+([^?]+)\s+\?profile=1\s+_\s+(\d+)\.html$",
            // "0.123s _ endpoint ?profile=1 1758190144.html"
            r"^(\d+\.?\d*)s\s+_\s+([^?]+)\s+\?profile=1\s+(\d+)\.html$",
            // "0.123s endpoint ?profile=1 1758190144.html"
            r"^(\d+\.?\d*)s\s+([^?]+)\s+\?profile=1\s+(\d+)\.html$",
            // "0.123s _ endpoint _ 1758190144.html"
            r"^(\d+\.?\d*)s\s+_\s+([^_]+)\s+_\s+(\d+)\.html$",
            // "0.123s endpoint 1758190144.html"
            r"^(\d+\.?\d*)s\s+(\S+)\s+(\d+)\.html$",
        ];

        let mut patterns: Vec<Pattern> = dur_end_stamp
            .iter()
            .map(|p| Pattern {
                re: Regex::new(p).expect("invalid trace filename pattern"),
                shape: Shape::DurationEndpointStamp,
            })
            .collect();

        // "1758190144.html" - timestamp only
        patterns.push(Pattern {
            re: Regex::new(r"^(\d+)\.html$").expect("invalid trace filename pattern"),
            shape: Shape::StampOnly,
        });

        patterns
    })
}

fn numeric_re() -> &'static Regex {
    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    NUMERIC.get_or_init(|| Regex::new(r"\d+\.?\d*").expect("invalid numeric pattern"))
}

fn separator_re() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[_\s]+").expect("invalid separator pattern"))
}

/// Parse a trace filename into its structured parts.
///
/// Total function: tries the pattern cascade first, then falls back to
/// scraping numeric substrings. Never fails, never panics.
pub fn parse_filename(filename: &str) -> ParsedName {
    for pattern in patterns() {
        let Some(caps) = pattern.re.captures(filename) else {
            continue;
        };
        return match pattern.shape {
            Shape::DurationEndpointStamp => ParsedName {
                duration_secs: caps[1].parse().ok(),
                endpoint: normalize_endpoint(&caps[2]),
                timestamp: caps[3].parse().ok(),
            },
            Shape::StampOnly => {
                let stamp = &caps[1];
                let residue = filename.trim_end_matches(".html").replace(stamp, "");
                ParsedName {
                    duration_secs: None,
                    endpoint: normalize_endpoint(&residue),
                    timestamp: stamp.parse().ok(),
                }
            }
        };
    }

    scrape_numerics(filename)
}

/// Fallback for filenames no pattern recognizes: the first numeric token
/// with a decimal point is the duration, the last numeric token is the
/// timestamp, and the endpoint is the filename with digits and the
/// extension stripped.
fn scrape_numerics(filename: &str) -> ParsedName {
    let numerics: Vec<&str> = numeric_re()
        .find_iter(filename)
        .map(|m| m.as_str())
        .collect();

    let duration_secs = numerics
        .iter()
        .find(|n| n.contains('.'))
        .and_then(|n| n.parse().ok());
    let timestamp = numerics.last().and_then(|n| n.parse::<i64>().ok());

    let stripped = numeric_re().replace_all(filename, "");
    let stripped = stripped.trim_end_matches(".html");
    let endpoint = separator_re().replace_all(stripped, " ");

    ParsedName {
        duration_secs,
        endpoint: normalize_endpoint(&endpoint),
        timestamp,
    }
}

/// Trim separator noise; an endpoint is never empty.
fn normalize_endpoint(raw: &str) -> String {
    let cleaned = raw.trim().trim_matches('_').trim();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned.to_string()
    }
}
