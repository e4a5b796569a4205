//! Campaign runner: authentication and concurrent request dispatch.
//!
//! A campaign is one batch of profiled requests against a target service.
//! Every request carries the profiling marker so the target's middleware
//! writes a trace file for it. Dispatch is bounded by a semaphore, so at most
//! `concurrency` requests are in flight at once regardless of batch size.
//!
//! # Error Handling
//!
//! A failed login degrades the campaign to anonymous requests instead of
//! aborting it. A failed request becomes an outcome with status 0 and a
//! transport error message; the batch always completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::{AuthConfig, EndpointSpec};
use crate::error::{Error, Result};

/// Query-string marker that makes the target service profile the request.
pub const PROFILE_MARKER: &str = "profile=1";

/// The result of one dispatched request.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    /// Request path including the profiling marker
    pub endpoint: String,
    pub method: String,
    /// HTTP status, or 0 when the request never produced a response
    pub status_code: u16,
    pub duration_secs: f64,
    /// Response body length in bytes
    pub content_length: usize,
    /// True for 2xx and 3xx responses
    pub success: bool,
    /// Transport-level failure message; `None` for any HTTP response
    pub error: Option<String>,
    pub auth_used: bool,
}

/// Drives one campaign against a target service.
pub struct CampaignRunner {
    base_url: String,
    auth: AuthConfig,
    email: String,
    password: String,
    client: reqwest::Client,
    auth_token: Option<String>,
}

impl CampaignRunner {
    /// Create a runner with the default 30 second request timeout.
    pub fn new(base_url: &str, auth: AuthConfig, email: &str, password: &str) -> Result<Self> {
        Self::with_timeout(base_url, auth, email, password, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: &str,
        auth: AuthConfig,
        email: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tracecamp/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            email: email.to_string(),
            password: password.to_string(),
            client,
            auth_token: None,
        })
    }

    /// Attempt the login exchange and cache the bearer token.
    ///
    /// Returns the token on success. Any failure (transport error, non-2xx,
    /// unexpected body shape) logs a warning and returns `None`; the campaign
    /// then runs anonymously.
    pub async fn authenticate(&mut self) -> Option<&str> {
        let url = format!("{}{}", self.base_url, self.auth.login_endpoint);

        let mut payload = serde_json::Map::new();
        payload.insert(
            self.auth.email_field.clone(),
            serde_json::Value::String(self.email.clone()),
        );
        payload.insert(
            self.auth.password_field.clone(),
            serde_json::Value::String(self.password.clone()),
        );

        let response = match self.client.post(&url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "login request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(url = %url, status = %response.status(), "login rejected");
            return None;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "login response was not JSON");
                return None;
            }
        };

        match body.get("access").and_then(|v| v.as_str()) {
            Some(token) => {
                tracing::info!("authenticated against {}", self.base_url);
                self.auth_token = Some(token.to_string());
                self.auth_token.as_deref()
            }
            None => {
                tracing::warn!(url = %url, "login response carried no access token");
                None
            }
        }
    }

    /// Dispatch `repeats` requests per endpoint with bounded concurrency.
    ///
    /// The semaphore caps in-flight requests at `concurrency` (minimum 1).
    /// Setting `cancel` stops tasks that have not yet started; requests
    /// already in flight run to completion and their outcomes are kept.
    pub async fn dispatch(
        &self,
        endpoints: &[EndpointSpec],
        concurrency: usize,
        repeats: usize,
        cancel: Arc<AtomicBool>,
    ) -> Vec<RequestOutcome> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for spec in endpoints {
            for _ in 0..repeats {
                let permit_source = Arc::clone(&semaphore);
                let cancel = Arc::clone(&cancel);
                let client = self.client.clone();
                let base_url = self.base_url.clone();
                let token = self.auth_token.clone();
                let spec = spec.clone();

                tasks.spawn(async move {
                    let _permit = permit_source.acquire_owned().await.ok()?;
                    if cancel.load(Ordering::SeqCst) {
                        return None;
                    }
                    Some(Self::single_request(&client, &base_url, &spec, token.as_deref()).await)
                });
            }
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(outcome)) => outcomes.push(outcome),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "request task panicked"),
            }
        }

        let successful = outcomes.iter().filter(|o| o.success).count();
        tracing::info!(
            total = outcomes.len(),
            successful,
            "campaign dispatch finished"
        );

        outcomes
    }

    async fn single_request(
        client: &reqwest::Client,
        base_url: &str,
        spec: &EndpointSpec,
        token: Option<&str>,
    ) -> RequestOutcome {
        // The marker goes on every request; without it the target writes no
        // trace file and the campaign produces nothing to analyze.
        let separator = if spec.endpoint.contains('?') { '&' } else { '?' };
        let marked_endpoint = format!("{}{}{}", spec.endpoint, separator, PROFILE_MARKER);
        let url = format!("{}{}", base_url, marked_endpoint);

        let method =
            Method::from_bytes(spec.method.to_uppercase().as_bytes()).unwrap_or(Method::GET);
        let method_name = method.to_string();

        let mut request = client.request(method.clone(), &url);

        // Recorded per endpoint spec, not per token: the report must still
        // show which endpoints required auth when login failed.
        let auth_used = spec.auth;
        if spec.auth {
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }
        }

        if matches!(method, Method::POST | Method::PUT | Method::PATCH) {
            if let Some(data) = &spec.data {
                request = request.json(data);
            }
        }

        let started = Instant::now();

        // A failure while reading the body is still a transport failure;
        // a mid-body disconnect must never be recorded as success.
        let body_result = match request.send().await {
            Ok(response) => {
                let status_code = response.status().as_u16();
                response.text().await.map(|body| (status_code, body))
            }
            Err(e) => Err(e),
        };
        let duration_secs = started.elapsed().as_secs_f64();

        match body_result {
            Ok((status_code, body)) => {
                let success = (200..400).contains(&status_code);

                tracing::debug!(
                    endpoint = %marked_endpoint,
                    status = status_code,
                    duration_secs,
                    "request completed"
                );

                RequestOutcome {
                    endpoint: marked_endpoint,
                    method: method_name,
                    status_code,
                    duration_secs,
                    content_length: body.len(),
                    success,
                    error: None,
                    auth_used,
                }
            }
            Err(e) => {
                tracing::warn!(endpoint = %marked_endpoint, error = %e, "request failed");

                RequestOutcome {
                    endpoint: marked_endpoint,
                    method: method_name,
                    status_code: 0,
                    duration_secs,
                    content_length: 0,
                    success: false,
                    error: Some(e.to_string()),
                    auth_used,
                }
            }
        }
    }
}

/// Synchronous wrapper around [`CampaignRunner`] for CLI use.
///
/// Owns a current-thread runtime so callers never deal with async directly.
pub struct SyncCampaignRunner {
    inner: CampaignRunner,
    runtime: tokio::runtime::Runtime,
}

impl SyncCampaignRunner {
    pub fn new(base_url: &str, auth: AuthConfig, email: &str, password: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Http(format!("failed to start async runtime: {}", e)))?;

        Ok(Self {
            inner: CampaignRunner::new(base_url, auth, email, password)?,
            runtime,
        })
    }

    /// Run the login exchange; returns whether a token was obtained.
    pub fn authenticate(&mut self) -> bool {
        self.runtime.block_on(self.inner.authenticate()).is_some()
    }

    pub fn dispatch(
        &self,
        endpoints: &[EndpointSpec],
        concurrency: usize,
        repeats: usize,
        cancel: Arc<AtomicBool>,
    ) -> Vec<RequestOutcome> {
        self.runtime
            .block_on(self.inner.dispatch(endpoints, concurrency, repeats, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(endpoint: &str) -> EndpointSpec {
        EndpointSpec {
            endpoint: endpoint.to_string(),
            method: "GET".to_string(),
            auth: false,
            data: None,
            enabled: true,
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let runner = CampaignRunner::new(
            "http://127.0.0.1:8101/",
            AuthConfig::default(),
            "a@example.com",
            "pw",
        )
        .unwrap();
        assert_eq!(runner.base_url, "http://127.0.0.1:8101");
    }

    // Grab a local port nothing listens on so connections fail fast.
    fn dead_base_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_outcome() {
        let runner = CampaignRunner::new(
            &dead_base_url(),
            AuthConfig::default(),
            "a@example.com",
            "pw",
        )
        .unwrap();

        let outcomes = runner
            .dispatch(
                &[spec("/api/v1/users/")],
                1,
                1,
                Arc::new(AtomicBool::new(false)),
            )
            .await;

        assert_eq!(outcomes.len(), 1);
        let outcome = &outcomes[0];
        assert_eq!(outcome.status_code, 0);
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
        assert!(outcome.endpoint.ends_with("?profile=1"));
    }

    #[test]
    fn test_marker_separator_respects_existing_query() {
        let with_query = spec("/search/?q=x");
        let separator = if with_query.endpoint.contains('?') { '&' } else { '?' };
        assert_eq!(separator, '&');
    }

    #[tokio::test]
    async fn test_cancel_skips_pending_requests() {
        let runner = CampaignRunner::new(
            &dead_base_url(),
            AuthConfig::default(),
            "a@example.com",
            "pw",
        )
        .unwrap();

        let cancel = Arc::new(AtomicBool::new(true));
        let outcomes = runner
            .dispatch(&[spec("/api/v1/users/")], 2, 3, cancel)
            .await;
        assert!(outcomes.is_empty());
    }
}
