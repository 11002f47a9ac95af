//! Static HTTP server for a dskit registry directory.
//!
//! Serves `{root}/registry.json` and any file below `{root}` by relative path,
//! which is exactly the layout the CLI's registry client reads:
//! `GET /registry.json` and `GET /<file name>`. `/health` answers with a small
//! JSON status document.
//!
//! The [`TestServer`] helper starts a server on a random port for integration testing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{debug, error, info};

pub const MANIFEST_FILE: &str = "registry.json";

/// Read-only view of a registry directory.
pub struct RegistryDir {
    root: PathBuf,
}

impl RegistryDir {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path to a file under the root.
    ///
    /// Returns `None` for anything that could leave the root: `..`, `.`,
    /// empty segments, backslashes, or a NUL byte.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let path = url_path.split(['?', '#']).next().unwrap_or_default();
        let path = path.strip_prefix('/')?;
        if path.is_empty() || path.contains(['\\', '\0']) {
            return None;
        }
        let mut resolved = self.root.clone();
        for segment in path.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return None;
            }
            resolved.push(segment);
        }
        Some(resolved)
    }

    /// Read a file by request path. `Ok(None)` when it does not exist.
    pub fn read(&self, url_path: &str) -> io::Result<Option<Vec<u8>>> {
        let Some(path) = self.resolve(url_path) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        fs::read(&path).map(Some)
    }

    pub fn manifest(&self) -> io::Result<Option<Vec<u8>>> {
        self.read(&format!("/{MANIFEST_FILE}"))
    }
}

fn content_type(url_path: &str) -> &'static str {
    let path = url_path.split('?').next().unwrap_or_default();
    if path.ends_with(".json") {
        "application/json"
    } else {
        "text/plain; charset=utf-8"
    }
}

fn respond_err(req: tiny_http::Request, code: u16, msg: &str) {
    let _ = req.respond(Response::from_string(msg).with_status_code(StatusCode(code)));
}

fn respond_data(req: tiny_http::Request, data: Vec<u8>, content_type: &str) {
    let response = match Header::from_bytes("Content-Type", content_type) {
        Ok(header) => Response::from_data(data).with_header(header),
        Err(()) => Response::from_data(data),
    };
    let _ = req.respond(response);
}

/// Handle a single HTTP request.
pub fn handle_request(registry: &RegistryDir, req: tiny_http::Request) {
    let method = req.method().clone();
    let url = req.url().to_owned();
    debug!("{method} {url}");

    if method != Method::Get {
        respond_err(req, 405, "method not allowed");
        return;
    }
    if url == "/health" {
        let body = serde_json::json!({
            "status": "ok",
            "manifest": registry.root().join(MANIFEST_FILE).is_file(),
        });
        respond_data(req, body.to_string().into_bytes(), "application/json");
        return;
    }
    if registry.resolve(&url).is_none() {
        respond_err(req, 400, "invalid path");
        return;
    }
    match registry.read(&url) {
        Ok(Some(data)) => {
            debug!("GET {url}: {} bytes", data.len());
            respond_data(req, data, content_type(&url));
        }
        Ok(None) => respond_err(req, 404, "not found"),
        Err(e) => {
            error!("GET {url}: {e}");
            respond_err(req, 500, "read error");
        }
    }
}

/// Start the server loop, blocking the current thread.
pub fn run_server(registry: &Arc<RegistryDir>, addr: &str) -> io::Result<()> {
    let server = Server::http(addr).map_err(|e| io::Error::other(e.to_string()))?;
    info!("serving {} on {addr}", registry.root().display());
    for request in server.incoming_requests() {
        handle_request(registry, request);
    }
    Ok(())
}

/// A test helper that serves a registry directory on a random port in a
/// background thread.
///
/// The server listens on `127.0.0.1:{port}`. Drop the `TestServer` to stop it.
pub struct TestServer {
    pub url: String,
    pub port: u16,
    pub root: PathBuf,
    server: Arc<Server>,
    _handle: std::thread::JoinHandle<()>,
}

impl TestServer {
    /// Serve `root`, creating it if needed. Binds to `127.0.0.1:0`.
    pub fn start(root: PathBuf) -> Self {
        fs::create_dir_all(&root).expect("failed to create test registry dir");
        let server =
            Arc::new(Server::http("127.0.0.1:0").expect("failed to bind test HTTP server"));
        let port = server.server_addr().to_ip().expect("not an IP addr").port();
        let url = format!("http://127.0.0.1:{port}");

        let registry = RegistryDir::new(root.clone());
        let srv = Arc::clone(&server);
        let handle = std::thread::spawn(move || {
            for request in srv.incoming_requests() {
                handle_request(&registry, request);
            }
        });

        Self {
            url,
            port,
            root,
            server,
            _handle: handle,
        }
    }

    /// Write a file into the served directory.
    pub fn put(&self, name: &str, content: &[u8]) {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(path, content).expect("failed to write registry file");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.unblock();
    }
}
