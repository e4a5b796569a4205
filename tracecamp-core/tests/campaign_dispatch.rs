//! Campaign dispatch tests against a local stub service.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracecamp_core::config::{AuthConfig, EndpointSpec};
use tracecamp_core::CampaignRunner;

/// A stub HTTP service that records the peak number of concurrent requests.
struct StubService {
    base_url: String,
    max_in_flight: Arc<AtomicUsize>,
}

fn start_stub(status: u16, delay: Duration) -> StubService {
    let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").unwrap());
    let port = server.server_addr().to_ip().unwrap().port();

    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));

    for _ in 0..8 {
        let server = Arc::clone(&server);
        let in_flight = Arc::clone(&in_flight);
        let max_in_flight = Arc::clone(&max_in_flight);
        std::thread::spawn(move || {
            while let Ok(request) = server.recv() {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(delay);
                in_flight.fetch_sub(1, Ordering::SeqCst);
                let _ = request
                    .respond(tiny_http::Response::from_string("ok").with_status_code(status));
            }
        });
    }

    StubService {
        base_url: format!("http://127.0.0.1:{}", port),
        max_in_flight,
    }
}

/// A stub that advertises a 100-byte body but closes after a few bytes,
/// so the response headers arrive fine and the body read fails.
fn start_truncating_stub() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial");
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn spec(endpoint: &str) -> EndpointSpec {
    EndpointSpec {
        endpoint: endpoint.to_string(),
        method: "GET".to_string(),
        auth: false,
        data: None,
        enabled: true,
    }
}

fn not_cancelled() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

#[tokio::test]
async fn dispatch_completes_all_requests() {
    let stub = start_stub(200, Duration::from_millis(10));
    let runner =
        CampaignRunner::new(&stub.base_url, AuthConfig::default(), "a@example.com", "pw").unwrap();

    let endpoints = vec![spec("/api/v1/users/"), spec("/admin/"), spec("/api/schema/")];
    let outcomes = runner.dispatch(&endpoints, 3, 2, not_cancelled()).await;

    assert_eq!(outcomes.len(), 6);
    for outcome in &outcomes {
        assert_eq!(outcome.status_code, 200);
        assert!(outcome.success);
        assert!(outcome.error.is_none());
        assert!(outcome.duration_secs > 0.0);
        assert_eq!(outcome.content_length, 2);
        assert!(outcome.endpoint.contains("profile=1"));
    }
}

#[tokio::test]
async fn dispatch_never_exceeds_concurrency_bound() {
    let stub = start_stub(200, Duration::from_millis(50));
    let runner =
        CampaignRunner::new(&stub.base_url, AuthConfig::default(), "a@example.com", "pw").unwrap();

    let endpoints = vec![spec("/a/"), spec("/b/"), spec("/c/"), spec("/d/")];
    let outcomes = runner.dispatch(&endpoints, 2, 3, not_cancelled()).await;

    assert_eq!(outcomes.len(), 12);
    assert!(
        stub.max_in_flight.load(Ordering::SeqCst) <= 2,
        "peak concurrency {} exceeded the bound",
        stub.max_in_flight.load(Ordering::SeqCst)
    );
}

#[tokio::test]
async fn server_errors_are_failures_without_transport_error() {
    let stub = start_stub(500, Duration::from_millis(1));
    let runner =
        CampaignRunner::new(&stub.base_url, AuthConfig::default(), "a@example.com", "pw").unwrap();

    let outcomes = runner.dispatch(&[spec("/broken/")], 1, 1, not_cancelled()).await;

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert_eq!(outcome.status_code, 500);
    assert!(!outcome.success);
    assert!(outcome.error.is_none(), "HTTP errors are not transport errors");
}

#[tokio::test]
async fn timeouts_become_transport_failures() {
    let stub = start_stub(200, Duration::from_millis(500));
    let runner = CampaignRunner::with_timeout(
        &stub.base_url,
        AuthConfig::default(),
        "a@example.com",
        "pw",
        Duration::from_millis(50),
    )
    .unwrap();

    let outcomes = runner.dispatch(&[spec("/slow/")], 1, 1, not_cancelled()).await;

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert_eq!(outcome.status_code, 0);
    assert!(!outcome.success);
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn truncated_body_is_a_transport_failure() {
    let base_url = start_truncating_stub();
    let runner =
        CampaignRunner::new(&base_url, AuthConfig::default(), "a@example.com", "pw").unwrap();

    let outcomes = runner.dispatch(&[spec("/cut/")], 1, 1, not_cancelled()).await;

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert_eq!(outcome.status_code, 0);
    assert!(!outcome.success);
    assert!(outcome.error.is_some());
    assert_eq!(outcome.content_length, 0);
}

#[tokio::test]
async fn auth_endpoints_stay_flagged_without_a_token() {
    let stub = start_stub(200, Duration::from_millis(1));
    let runner =
        CampaignRunner::new(&stub.base_url, AuthConfig::default(), "a@example.com", "pw").unwrap();

    let mut authed = spec("/api/auth/users/");
    authed.auth = true;
    let anon = spec("/admin/");

    // No authenticate() call, so no token was obtained.
    let outcomes = runner
        .dispatch(&[authed, anon], 1, 1, not_cancelled())
        .await;

    assert_eq!(outcomes.len(), 2);
    let by_auth = |flag: bool| outcomes.iter().find(|o| o.auth_used == flag);
    assert!(by_auth(true).unwrap().endpoint.contains("api/auth/users"));
    assert!(by_auth(false).unwrap().endpoint.contains("admin"));
}

#[tokio::test]
async fn authenticate_degrades_on_bad_response() {
    // The stub returns a 200 body that is not JSON, so the login exchange
    // must fail gracefully.
    let stub = start_stub(200, Duration::from_millis(1));
    let mut runner =
        CampaignRunner::new(&stub.base_url, AuthConfig::default(), "a@example.com", "pw").unwrap();

    assert!(runner.authenticate().await.is_none());
}
