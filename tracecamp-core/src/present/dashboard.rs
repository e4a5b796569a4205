//! Static HTML dashboard generation.
//!
//! Renders one self-contained HTML page from a scanned trace store: an app
//! distribution chart, a search box, filter tabs, and per-app sections of
//! trace cards. Card links are relative, so the page works straight off the
//! filesystem when written next to the trace files. The page is a plain
//! file; regenerating it is the only way to refresh the data.

use crate::format::{format_duration_opt, format_mb};
use crate::trace::store::TraceStore;
use crate::trace::TraceRecord;

/// Render the dashboard page for one scan.
pub fn render(store: &TraceStore) -> String {
    let labels: Vec<&String> = store.stats.counts_by_app.keys().collect();
    let counts: Vec<usize> = store.stats.counts_by_app.values().copied().collect();
    let chart_labels = serde_json::to_string(&labels).unwrap_or_else(|_| "[]".to_string());
    let chart_data = serde_json::to_string(&counts).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Trace Dashboard</title>
<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
<style>
  body {{ font-family: -apple-system, sans-serif; margin: 2rem; background: #f5f6f8; }}
  h1 {{ margin-bottom: 0.2rem; }}
  .meta {{ color: #667; margin-bottom: 1.5rem; }}
  .chart-wrap {{ max-width: 720px; background: #fff; padding: 1rem; border-radius: 8px; }}
  #search {{ width: 100%; max-width: 720px; padding: 0.6rem; margin: 1.5rem 0 0.8rem;
             border: 1px solid #ccd; border-radius: 6px; font-size: 1rem; }}
  .tabs {{ margin-bottom: 1rem; }}
  .tab {{ display: inline-block; padding: 0.3rem 0.8rem; margin: 0 0.3rem 0.3rem 0;
          border-radius: 14px; background: #e4e7ec; cursor: pointer; font-size: 0.9rem; }}
  .tab.active {{ background: #3465d4; color: #fff; }}
  details {{ background: #fff; border-radius: 8px; margin-bottom: 0.8rem; padding: 0.5rem 1rem; }}
  summary {{ cursor: pointer; font-weight: 600; padding: 0.4rem 0; }}
  .card {{ border-top: 1px solid #eef; padding: 0.6rem 0.2rem; cursor: pointer; }}
  .card:hover {{ background: #f2f6ff; }}
  .endpoint {{ font-weight: 500; }}
  .details {{ color: #667; font-size: 0.85rem; }}
  .duration {{ color: #3465d4; font-variant-numeric: tabular-nums; }}
</style>
</head>
<body>
<h1>Trace Dashboard</h1>
<div class="meta">{total_files} traces, {total_size}</div>
<div class="chart-wrap"><canvas id="appChart"></canvas></div>
<input id="search" type="text" placeholder="Search endpoints..."
       oninput="applyFilters()">
<div class="tabs" id="tabs">
<span class="tab active" data-app="" onclick="selectTab(this)">all</span>
{tabs}</div>
{sections}
<script>
new Chart(document.getElementById('appChart'), {{
  type: 'bar',
  data: {{
    labels: {chart_labels},
    datasets: [{{ label: 'Traces per app', data: {chart_data},
                  backgroundColor: '#3465d4' }}]
  }},
  options: {{ plugins: {{ legend: {{ display: false }} }},
              scales: {{ y: {{ beginAtZero: true, ticks: {{ precision: 0 }} }} }} }}
}});

function openProfile(filename) {{
  window.open('./' + encodeURIComponent(filename), '_blank');
}}

function selectTab(tab) {{
  document.querySelectorAll('.tab').forEach(t => t.classList.remove('active'));
  tab.classList.add('active');
  applyFilters();
}}

function applyFilters() {{
  const app = document.querySelector('.tab.active').dataset.app;
  const query = document.getElementById('search').value.toLowerCase();
  document.querySelectorAll('details').forEach(section => {{
    let visible = 0;
    section.querySelectorAll('.card').forEach(card => {{
      const matchesApp = !app || section.dataset.app === app;
      const matchesQuery = !query ||
        card.dataset.endpoint.toLowerCase().includes(query);
      const show = matchesApp && matchesQuery;
      card.style.display = show ? '' : 'none';
      if (show) visible++;
    }});
    section.style.display = visible > 0 ? '' : 'none';
  }});
}}
</script>
</body>
</html>
"#,
        total_files = store.stats.total_files,
        total_size = format_mb(store.stats.total_size_bytes),
        tabs = app_tabs(store),
        sections = app_sections(store),
        chart_labels = chart_labels,
        chart_data = chart_data,
    )
}

fn app_tabs(store: &TraceStore) -> String {
    store
        .app_groups
        .keys()
        .map(|app| {
            format!(
                "<span class=\"tab\" data-app=\"{app}\" onclick=\"selectTab(this)\">{app}</span>\n",
                app = escape_html(app)
            )
        })
        .collect()
}

fn app_sections(store: &TraceStore) -> String {
    store
        .app_groups
        .iter()
        .map(|(app, traces)| {
            format!(
                "<details open data-app=\"{app}\"><summary>{app} ({count})</summary>\n{cards}</details>\n",
                app = escape_html(app),
                count = traces.len(),
                cards = trace_cards(traces),
            )
        })
        .collect()
}

fn trace_cards(traces: &[TraceRecord]) -> String {
    traces
        .iter()
        .map(|record| {
            format!(
                concat!(
                    "<div class=\"card\" data-endpoint=\"{endpoint}\" ",
                    "onclick=\"openProfile('{filename}')\">\n",
                    "<div class=\"endpoint\">{endpoint} ",
                    "<span class=\"duration\">{duration}</span></div>\n",
                    "<div class=\"details\">{time} | {size}</div>\n",
                    "</div>\n"
                ),
                endpoint = escape_html(&record.endpoint),
                filename = escape_js(&record.filename),
                duration = format_duration_opt(record.duration_secs),
                time = escape_html(&record.formatted_time),
                size = format_mb(record.size_bytes),
            )
        })
        .collect()
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_js(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(endpoint: &str, app: &str) -> TraceRecord {
        TraceRecord {
            path: PathBuf::from("x.html"),
            filename: format!("0.1s _ {} _ 1700000000.html", endpoint),
            duration_secs: Some(0.1),
            endpoint: endpoint.to_string(),
            app: app.to_string(),
            timestamp: 1700000000,
            formatted_time: "2023-11-14 22:13:20".to_string(),
            size_bytes: 1024,
        }
    }

    #[test]
    fn test_render_contains_endpoints_and_tabs() {
        let store = TraceStore::from_records(vec![
            record("api/v1/users", "users"),
            record("admin/login", "admin"),
        ]);

        let html = render(&store);
        assert!(html.contains("api/v1/users"));
        assert!(html.contains("data-app=\"users\""));
        assert!(html.contains("data-app=\"admin\""));
        assert!(html.contains("2 traces"));
        assert!(html.contains("chart.js"));
    }

    #[test]
    fn test_render_escapes_markup() {
        let store = TraceStore::from_records(vec![record("<script>alert(1)</script>", "other")]);
        let html = render(&store);
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;"));
    }

    // Links must stay relative: the page sits in the trace directory and
    // has to work off the filesystem with no server running.
    #[test]
    fn test_card_links_are_relative() {
        let store = TraceStore::from_records(vec![record("api/v1/users", "users")]);
        let html = render(&store);
        assert!(html.contains("window.open('./' + encodeURIComponent(filename)"));
        assert!(!html.contains("http://localhost"));
    }

    #[test]
    fn test_escape_js_quotes() {
        assert_eq!(escape_js("it's"), "it\\'s");
        assert_eq!(escape_js("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_render_empty_store() {
        let store = TraceStore::from_records(vec![]);
        let html = render(&store);
        assert!(html.contains("0 traces"));
    }
}
