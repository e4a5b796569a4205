//! Static file server for trace HTML files.
//!
//! Serves files out of the trace directory by exact filename. No directory
//! listing, no application logic. Runs on the caller's thread until the
//! shutdown flag flips; the receive loop polls with a short timeout so the
//! flag is observed promptly.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tiny_http::{Header, Response, Server};

use crate::error::{Error, Result};

pub struct TraceFileServer {
    root: PathBuf,
    server: Server,
}

impl TraceFileServer {
    /// Bind on all interfaces at `port`, serving files from `root`.
    pub fn bind(root: &Path, port: u16) -> Result<Self> {
        let server = Server::http(("0.0.0.0", port))
            .map_err(|e| Error::Server(format!("failed to bind port {}: {}", port, e)))?;

        tracing::info!(port, root = %root.display(), "trace server listening");

        Ok(Self {
            root: root.to_path_buf(),
            server,
        })
    }

    /// Serve requests until `running` goes false.
    pub fn serve(&self, running: &AtomicBool) -> Result<()> {
        while running.load(Ordering::SeqCst) {
            match self.server.recv_timeout(Duration::from_millis(200)) {
                Ok(Some(request)) => self.handle(request),
                Ok(None) => {}
                Err(e) => return Err(Error::Server(format!("server receive failed: {}", e))),
            }
        }
        Ok(())
    }

    fn handle(&self, request: tiny_http::Request) {
        let raw_path = request.url().trim_start_matches('/');
        let decoded = urlencoding::decode(raw_path)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| raw_path.to_string());

        tracing::debug!(path = %decoded, "trace request");

        // Exact-filename lookup only; anything path-like is rejected.
        if decoded.is_empty() || decoded.contains("..") || decoded.contains('/') {
            let _ = request.respond(Response::from_string("Not Found").with_status_code(404));
            return;
        }

        let path = self.root.join(&decoded);
        if !path.is_file() {
            let _ = request.respond(Response::from_string("Not Found").with_status_code(404));
            return;
        }

        match std::fs::File::open(&path) {
            Ok(file) => {
                let mut response = Response::from_file(file);
                if decoded.ends_with(".html") {
                    if let Ok(header) =
                        Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..])
                    {
                        response = response.with_header(header);
                    }
                }
                let _ = request.respond(response);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to open trace file");
                let _ = request
                    .respond(Response::from_string("Internal Server Error").with_status_code(500));
            }
        }
    }

    /// The port actually bound, useful when binding port 0 in tests.
    pub fn port(&self) -> u16 {
        self.server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(0)
    }
}
