//! Loopback HTTP bridge accepting selection payloads from the browser side.
//!
//! Selections are user-driven and low rate, so connections are handled one
//! at a time on the accept loop; that also serializes writes to the shared
//! selection store. Per-connection failures are logged and never take the
//! loop down.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::app::classify::classify;
use crate::app::normalize::normalize_frames;
use crate::app::validate::validate;
use crate::infra::config::Bridge as BridgeConfig;
use crate::infra::store::{SelectionStore, StoredSelection};

const MAX_HEADER_LINE_BYTES: usize = 8 * 1024;
const MAX_HEADER_COUNT: usize = 64;

/// The bound endpoint plus everything a request needs: body limits from the
/// config and the injected selection store.
pub struct Bridge {
    listener: TcpListener,
    config: BridgeConfig,
    store: Arc<SelectionStore>,
}

impl Bridge {
    /// Bind the configured host and port. Port 0 picks a free port, which
    /// tests rely on.
    pub fn bind(config: BridgeConfig, store: Arc<SelectionStore>) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener =
            TcpListener::bind(&addr).with_context(|| format!("failed to bind {addr}"))?;
        Ok(Self {
            listener,
            config,
            store,
        })
    }

    /// Address the bridge is actually listening on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("failed to read bridge local address")
    }

    /// Accept and serve connections until the process ends.
    pub fn run(&self) -> Result<()> {
        info!(addr = %self.local_addr()?, "bridge listening");
        loop {
            let (stream, peer) = match self.listener.accept() {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(err = %err, "accept failed");
                    continue;
                }
            };
            debug!(peer = %peer, "connection accepted");
            if let Err(err) = self.handle_connection(stream) {
                warn!(peer = %peer, err = %err, "connection error");
            }
        }
    }

    /// Serve exactly one connection; used by `run` and directly by tests.
    pub fn handle_next(&self) -> Result<()> {
        let (stream, _) = self.listener.accept().context("accept failed")?;
        self.handle_connection(stream)
    }

    fn handle_connection(&self, mut stream: TcpStream) -> Result<()> {
        let mut reader = BufReader::new(stream.try_clone().context("failed to clone stream")?);

        let request = match read_request(&mut reader, self.config.max_body_bytes()) {
            Ok(request) => request,
            Err(reject) => return respond_error(&mut stream, reject.status, reject.reason, &reject.message),
        };

        match (request.method.as_str(), request.path.as_str()) {
            ("POST", "/selection") => self.handle_selection(&mut stream, &request.body),
            ("GET", "/selection/latest") => self.handle_latest(&mut stream),
            ("GET", "/health") => respond_json(
                &mut stream,
                200,
                "OK",
                &json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }).to_string(),
            ),
            ("POST" | "GET", _) => {
                respond_error(&mut stream, 404, "Not Found", "unknown endpoint")
            }
            _ => respond_error(&mut stream, 405, "Method Not Allowed", "unsupported method"),
        }
    }

    fn handle_selection(&self, stream: &mut TcpStream, body: &[u8]) -> Result<()> {
        let document: Value = match serde_json::from_slice(body) {
            Ok(document) => document,
            Err(err) => {
                warn!(err = %err, "selection body is not valid JSON");
                return respond_error(stream, 400, "Bad Request", "request body is not valid JSON");
            }
        };

        let payload = match validate(&document) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(reason = %err, "selection rejected");
                return respond_error(stream, 400, "Bad Request", &err.to_string());
            }
        };

        let frames = normalize_frames(payload.frames);
        let classification = classify(&frames);
        let stored = StoredSelection {
            dom_label: payload.dom_label,
            frames,
            classification,
        };

        info!(
            dom_label = stored.dom_label.as_deref().unwrap_or("<unknown element>"),
            frames = stored.frames.len(),
            "selection accepted"
        );

        let rendered = serde_json::to_string(&stored).context("failed to encode selection")?;
        self.store.publish(stored);
        respond_json(stream, 200, "OK", &rendered)
    }

    fn handle_latest(&self, stream: &mut TcpStream) -> Result<()> {
        match self.store.latest() {
            Some(stored) => {
                let rendered =
                    serde_json::to_string(&stored).context("failed to encode selection")?;
                respond_json(stream, 200, "OK", &rendered)
            }
            None => respond_error(stream, 404, "Not Found", "no selection captured yet"),
        }
    }
}

struct Request {
    method: String,
    path: String,
    body: Vec<u8>,
}

struct Reject {
    status: u16,
    reason: &'static str,
    message: String,
}

impl Reject {
    fn new(status: u16, reason: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            reason,
            message: message.into(),
        }
    }
}

/// Parse the request line, headers, and body of one HTTP/1.1 exchange,
/// enforcing the body ceiling and JSON content type before any byte of the
/// body is trusted.
fn read_request(
    reader: &mut BufReader<TcpStream>,
    max_body_bytes: usize,
) -> std::result::Result<Request, Reject> {
    let request_line = read_header_line(reader)?;
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(path)) = (parts.next(), parts.next()) else {
        return Err(Reject::new(400, "Bad Request", "malformed request line"));
    };
    let method = method.to_owned();
    let path = path.to_owned();

    let mut content_length: Option<usize> = None;
    let mut content_type: Option<String> = None;
    for _ in 0..MAX_HEADER_COUNT {
        let line = read_header_line(reader)?;
        if line.is_empty() {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "content-length" => {
                content_length = value.trim().parse().ok();
            }
            "content-type" => {
                content_type = Some(value.trim().to_ascii_lowercase());
            }
            _ => {}
        }
    }

    if method != "POST" {
        return Ok(Request {
            method,
            path,
            body: Vec::new(),
        });
    }

    let Some(length) = content_length else {
        return Err(Reject::new(411, "Length Required", "missing Content-Length"));
    };
    if length > max_body_bytes {
        return Err(Reject::new(
            413,
            "Payload Too Large",
            format!("request body exceeds {max_body_bytes} bytes"),
        ));
    }
    if !content_type.is_some_and(|value| value.contains("application/json")) {
        return Err(Reject::new(
            415,
            "Unsupported Media Type",
            "content type must be application/json",
        ));
    }

    let mut body = vec![0u8; length];
    reader
        .read_exact(&mut body)
        .map_err(|_| Reject::new(400, "Bad Request", "request body shorter than Content-Length"))?;

    Ok(Request { method, path, body })
}

fn read_header_line(reader: &mut BufReader<TcpStream>) -> std::result::Result<String, Reject> {
    let mut line = String::new();
    reader
        .by_ref()
        .take(MAX_HEADER_LINE_BYTES as u64)
        .read_line(&mut line)
        .map_err(|_| Reject::new(400, "Bad Request", "malformed request"))?;
    if line.len() >= MAX_HEADER_LINE_BYTES {
        return Err(Reject::new(400, "Bad Request", "header line too long"));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn respond_json(stream: &mut TcpStream, status: u16, reason: &str, body: &str) -> Result<()> {
    write!(
        stream,
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
    .context("failed to write response")
}

fn respond_error(stream: &mut TcpStream, status: u16, reason: &'static str, message: &str) -> Result<()> {
    let body = json!({ "error": message }).to_string();
    respond_json(stream, status, reason, &body)
}
