//! Shared helpers for integration tests.
//!
//! `TestServer` is a tiny HTTP/1.1 server on a std `TcpListener` that stands
//! in for github.com and its API. Every route answers with a fixed sequence
//! of responses; once the sequence is used up the last one repeats.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

/// Asset body used by every fixture.
pub const PLUGIN_BINARY: &[u8] = b"my-plugin-binary";

/// SHA-256 of [`PLUGIN_BINARY`].
pub const PLUGIN_BINARY_SHA256: &str =
    "d9336538c1469e9ced64c5ee3f9c1bf7b7ef80ccc656c73bc244de35dfbf69d4";

/// Download prefix used by the fixture templates.
pub const WHOAMI_DOWNLOAD_PREFIX: &str =
    "https://github.com/rajatjindal/kubectl-whoami/releases/download";

/// Asset referenced by the fixture templates at `v0.0.2`.
pub const WHOAMI_ASSET: &str = "kubectl-whoami_v0.0.2_darwin_amd64.tar.gz";

/// Path of a file under `tests/data`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Contents of a file under `tests/data`.
pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).unwrap()
}

/// A response the server sends.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }
}

/// A request the server received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct State {
    routes: HashMap<String, Vec<Reply>>,
    requests: Vec<RecordedRequest>,
}

pub struct TestServer {
    base_url: String,
    state: Arc<Mutex<State>>,
}

impl TestServer {
    /// Bind an ephemeral port and serve in a background thread.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(State::default()));

        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let shared = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &shared));
            }
        });

        Self { base_url, state }
    }

    /// Answer `path` with `replies` in order, repeating the last one.
    pub fn route(&self, path: &str, replies: Vec<Reply>) -> &Self {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert(path.to_string(), replies);
        self
    }

    /// `http://127.0.0.1:<port>`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Number of requests received for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Serve the whoami release through the API routes.
    pub fn serve_whoami_release(&self, tag: &str, asset: &str, body: &[u8]) -> &Self {
        let release = format!(
            r#"{{"tag_name":"{}","prerelease":false,"assets":[{{"id":1,"name":"{}","size":{}}}]}}"#,
            tag,
            asset,
            body.len()
        );
        self.route(
            &format!("/repos/rajatjindal/kubectl-whoami/releases/tags/{}", tag),
            vec![Reply::ok(release)],
        )
        .route(
            "/repos/rajatjindal/kubectl-whoami/releases/assets/1",
            vec![Reply::ok(body.to_vec())],
        )
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };

    let reply = {
        let mut state = state.lock().unwrap();
        let reply = match state.routes.get_mut(&request.path) {
            Some(replies) if replies.len() > 1 => replies.remove(0),
            Some(replies) => replies
                .first()
                .cloned()
                .unwrap_or_else(|| Reply::status(404)),
            None => Reply::status(404),
        };
        state.requests.push(request);
        reply
    };

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        reply.status,
        reason(reply.status),
        reply.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&reply.body);
    let _ = stream.flush();
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 1024];

    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let text = String::from_utf8_lossy(&data);
    let mut lines = text.split("\r\n");
    let target = lines.next()?.split_whitespace().nth(1)?.to_string();
    let path = target.split('?').next().unwrap_or_default().to_string();

    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect();

    Some(RecordedRequest { path, headers })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
