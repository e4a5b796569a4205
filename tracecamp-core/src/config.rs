//! Campaign configuration loading and management
//!
//! The campaign configuration is a JSON document passed to `generate` via
//! `--config`. It describes how to log into the target service and which
//! endpoint groups to drive. The target service's login schema is not under
//! our control, so the payload field names are themselves configuration.
//!
//! Log files follow the XDG Base Directory Specification:
//! - State/Logs: `$XDG_STATE_HOME/tracecamp/` (~/.local/state/tracecamp/)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Returns the state directory path (for logs)
///
/// `$XDG_STATE_HOME/tracecamp/` (~/.local/state/tracecamp/)
pub fn state_dir() -> PathBuf {
    xdg_state_home().join("tracecamp")
}

/// Returns the log file path
pub fn log_path() -> PathBuf {
    state_dir().join("tracecamp.log")
}

/// Campaign configuration: login exchange plus endpoint groups.
#[derive(Debug, Deserialize, Serialize)]
pub struct CampaignConfig {
    /// Login exchange configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Named groups of endpoints to drive
    pub endpoint_groups: BTreeMap<String, Vec<EndpointSpec>>,
}

/// Login exchange configuration.
///
/// Field names are configurable because the target service's login schema
/// varies between deployments.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    /// Path of the login endpoint, relative to the base URL
    #[serde(default = "default_login_endpoint")]
    pub login_endpoint: String,

    /// Payload field name for the login identifier
    #[serde(default = "default_email_field")]
    pub email_field: String,

    /// Payload field name for the login secret
    #[serde(default = "default_password_field")]
    pub password_field: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_endpoint: default_login_endpoint(),
            email_field: default_email_field(),
            password_field: default_password_field(),
        }
    }
}

fn default_login_endpoint() -> String {
    "/api/auth/jwt/create/".to_string()
}

fn default_email_field() -> String {
    "email".to_string()
}

fn default_password_field() -> String {
    "password".to_string()
}

/// One endpoint to drive during a campaign.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EndpointSpec {
    /// Request path, relative to the base URL
    pub endpoint: String,

    /// HTTP method (defaults to GET)
    #[serde(default = "default_method")]
    pub method: String,

    /// Whether the request carries the bearer credential
    #[serde(default)]
    pub auth: bool,

    /// Optional JSON request body (POST/PUT/PATCH only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Disabled endpoints are skipped unless explicitly included
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_enabled() -> bool {
    true
}

impl CampaignConfig {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: CampaignConfig = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Write the default configuration to `path`.
    ///
    /// Used for first-run ergonomics: `generate` creates this file and exits
    /// instead of failing when no config exists yet.
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&Self::default_config())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The configuration written on first run.
    pub fn default_config() -> Self {
        let mut endpoint_groups = BTreeMap::new();
        endpoint_groups.insert(
            "auth".to_string(),
            vec![
                EndpointSpec {
                    endpoint: "/api/auth/users/".to_string(),
                    method: "GET".to_string(),
                    auth: true,
                    data: None,
                    enabled: true,
                },
                EndpointSpec {
                    endpoint: "/api/auth/users/me/".to_string(),
                    method: "GET".to_string(),
                    auth: true,
                    data: None,
                    enabled: true,
                },
            ],
        );
        endpoint_groups.insert(
            "admin".to_string(),
            vec![
                EndpointSpec {
                    endpoint: "/admin/".to_string(),
                    method: "GET".to_string(),
                    auth: false,
                    data: None,
                    enabled: true,
                },
                EndpointSpec {
                    endpoint: "/api/schema/".to_string(),
                    method: "GET".to_string(),
                    auth: false,
                    data: None,
                    enabled: true,
                },
            ],
        );

        Self {
            auth: AuthConfig::default(),
            endpoint_groups,
        }
    }

    /// Resolve the endpoint list for a campaign.
    ///
    /// `groups` is an optional comma-separated list of group names; when
    /// absent, every group is included. Disabled endpoints are filtered out
    /// unless `include_disabled` is set. Unknown group names log a warning
    /// and contribute nothing.
    pub fn select_endpoints(
        &self,
        groups: Option<&str>,
        include_disabled: bool,
    ) -> Vec<EndpointSpec> {
        let mut selected = Vec::new();

        let group_names: Vec<&str> = match groups {
            Some(list) => list.split(',').map(str::trim).collect(),
            None => self.endpoint_groups.keys().map(String::as_str).collect(),
        };

        for name in group_names {
            match self.endpoint_groups.get(name) {
                Some(endpoints) => {
                    selected.extend(
                        endpoints
                            .iter()
                            .filter(|ep| include_disabled || ep.enabled)
                            .cloned(),
                    );
                }
                None => {
                    tracing::warn!(group = name, "unknown endpoint group, skipping");
                }
            }
        }

        selected
    }
}
