//! Subcommand implementations and shared CLI helpers.

pub mod analyze;
pub mod clean;
pub mod dashboard;
pub mod generate;
pub mod serve;
pub mod sync;

use clap::ValueEnum;
use tracecamp_core::SortKey;

/// Sort order flag shared by `serve` and `analyze`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Time,
    Duration,
    Size,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Time => SortKey::Time,
            SortArg::Duration => SortKey::Duration,
            SortArg::Size => SortKey::Size,
        }
    }
}

/// Parse a listing limit. `none` and `0` mean unlimited.
pub fn parse_limit(raw: &str) -> Result<Option<usize>, String> {
    if raw.eq_ignore_ascii_case("none") || raw == "0" {
        return Ok(None);
    }
    raw.parse::<usize>()
        .map(Some)
        .map_err(|_| format!("invalid limit {:?}: expected a number or \"none\"", raw))
}

/// Open a URL in the default browser. Best effort: a missing opener is
/// logged, never an error.
pub fn open_browser(url: &str) {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    let result = std::process::Command::new(opener)
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn();

    if let Err(e) = result {
        tracing::debug!(opener, error = %e, "could not open browser");
    }
}
