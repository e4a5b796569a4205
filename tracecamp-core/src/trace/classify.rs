//! Endpoint-to-app classification.
//!
//! Maps a reconstructed endpoint to a coarse "app" label used for grouping
//! in reports and the dashboard. This is an ad hoc heuristic over path
//! substrings, kept as an ordered rule table: rules are checked top to
//! bottom and the first match wins. Specific categories must stay above the
//! generic versioned-API bucket or they would be swallowed by it.

/// How a matched rule produces its label.
enum Label {
    Fixed(&'static str),
    /// First path segment after the `api/v1` prefix, else `api`.
    ApiSegment,
    /// Second path segment of the endpoint, else `other`.
    SecondSegment,
}

struct Rule {
    applies: fn(&str) -> bool,
    label: Label,
}

fn is_admin(e: &str) -> bool {
    e.contains("admin")
}

fn is_auth(e: &str) -> bool {
    e.contains("api/v1/auth") || e.contains("auth")
}

fn is_schema(e: &str) -> bool {
    e.contains("schema")
}

fn is_profiling_tool(e: &str) -> bool {
    e.contains("silk") || e.contains("rosetta")
}

fn is_static_media(e: &str) -> bool {
    e.contains("static") || e.contains("media")
}

fn is_job_monitor(e: &str) -> bool {
    e.contains("flower")
}

fn is_versioned_api(e: &str) -> bool {
    e.contains("api/v1")
}

fn is_root(e: &str) -> bool {
    e.is_empty() || e == "/"
}

fn is_error_page(e: &str) -> bool {
    e.contains("404") || e.contains("500") || e.contains("error")
}

fn always(_e: &str) -> bool {
    true
}

/// Ordered rule table; the final catch-all guarantees a label.
const RULES: &[Rule] = &[
    Rule { applies: is_admin, label: Label::Fixed("admin") },
    Rule { applies: is_auth, label: Label::Fixed("auth") },
    Rule { applies: is_schema, label: Label::Fixed("api_schema") },
    Rule { applies: is_profiling_tool, label: Label::Fixed("profiling_tools") },
    Rule { applies: is_static_media, label: Label::Fixed("static_media") },
    Rule { applies: is_job_monitor, label: Label::Fixed("celery_monitoring") },
    Rule { applies: is_versioned_api, label: Label::ApiSegment },
    Rule { applies: is_root, label: Label::Fixed("health_checks") },
    Rule { applies: is_error_page, label: Label::Fixed("error_pages") },
    Rule { applies: always, label: Label::SecondSegment },
];

/// Classify an endpoint into an app label. Always returns a non-empty label;
/// the fallback is `other`.
pub fn classify_app(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    let lower = trimmed.to_lowercase();

    for rule in RULES {
        if (rule.applies)(&lower) {
            return match rule.label {
                Label::Fixed(label) => label.to_string(),
                Label::ApiSegment => api_segment(trimmed),
                Label::SecondSegment => second_segment(trimmed),
            };
        }
    }

    // The catch-all rule makes this unreachable.
    "other".to_string()
}

/// `api/v1/<segment>/...` -> `<segment>`; anything else under the versioned
/// prefix collapses to `api`.
fn api_segment(endpoint: &str) -> String {
    let parts: Vec<&str> = endpoint.trim_matches('/').split('/').collect();
    if parts.len() > 2 && parts[0] == "api" && parts[1] == "v1" && !parts[2].is_empty() {
        parts[2].to_string()
    } else {
        "api".to_string()
    }
}

fn second_segment(endpoint: &str) -> String {
    let parts: Vec<&str> = endpoint.trim_matches('/').split('/').collect();
    if parts.len() > 1 && !parts[1].is_empty() {
        parts[1].to_string()
    } else {
        "other".to_string()
    }
}
