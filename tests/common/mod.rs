//! Common test utilities for integration tests
//!
//! The pipeline talks plain HTTP/1.1, so the tests drive it against a tiny
//! canned-response server on a loopback `TcpListener`. This keeps the tests
//! honest about wire behavior (HEAD vs GET, redirects not needed, dropped
//! connections mid-body) without pulling a mock framework into the tree.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A canned HTTP response served by [`TestServer`].
#[allow(dead_code)]
#[derive(Clone)]
pub enum CannedResponse {
    /// Complete response with the given status, extra headers and body.
    Full {
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    },
    /// Advertises `promised` body bytes but sends only `body` before dropping
    /// the connection, simulating a mid-stream connection reset.
    Truncated { promised: usize, body: Vec<u8> },
}

#[allow(dead_code)]
impl CannedResponse {
    pub fn html(body: &str) -> Self {
        CannedResponse::Full {
            status: 200,
            headers: vec![("Content-Type".to_string(), "text/html".to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn bytes(body: &[u8]) -> Self {
        CannedResponse::Full {
            status: 200,
            headers: Vec::new(),
            body: body.to_vec(),
        }
    }

    pub fn status(status: u16) -> Self {
        CannedResponse::Full {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_last_modified(body: &[u8], stamp: &str) -> Self {
        CannedResponse::Full {
            status: 200,
            headers: vec![("Last-Modified".to_string(), stamp.to_string())],
            body: body.to_vec(),
        }
    }
}

/// Handler invoked per request with `(method, target, global hit index)`.
pub type Handler = dyn Fn(&str, &str, usize) -> CannedResponse + Send + Sync;

/// Minimal canned-response HTTP server for integration tests.
#[allow(dead_code)]
pub struct TestServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    handle: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &str, usize) -> CannedResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback listener");
        let addr = listener.local_addr().expect("listener has a local addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let handler: Arc<Handler> = Arc::new(handler);

        let hits_for_task = hits.clone();
        let handle = tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(_) => break,
                };
                let handler = handler.clone();
                let hits = hits_for_task.clone();
                tokio::spawn(async move {
                    let _ = serve_connection(stream, handler, hits).await;
                });
            }
        });

        TestServer { addr, hits, handle }
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Number of requests served so far, transport retries included.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    handler: Arc<Handler>,
    hits: Arc<AtomicUsize>,
) -> std::io::Result<()> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];

    // HTTP/1.1 keep-alive: serve requests until the peer closes.
    loop {
        let header_end = loop {
            if let Some(pos) = find_subslice(&buffer, b"\r\n\r\n") {
                break pos;
            }
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buffer.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let request_line = head.lines().next().unwrap_or_default().to_string();
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let target = parts.next().unwrap_or_default().to_string();
        // GET and HEAD requests carry no body
        buffer.drain(..header_end + 4);

        let hit = hits.fetch_add(1, Ordering::SeqCst);
        match handler(&method, &target, hit) {
            CannedResponse::Full {
                status,
                headers,
                body,
            } => {
                let reason = reason_phrase(status);
                let mut response =
                    format!("HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\n", body.len());
                for (name, value) in &headers {
                    response.push_str(&format!("{name}: {value}\r\n"));
                }
                response.push_str("\r\n");
                stream.write_all(response.as_bytes()).await?;
                if method != "HEAD" {
                    stream.write_all(&body).await?;
                }
                stream.flush().await?;
            }
            CannedResponse::Truncated { promised, body } => {
                let response = format!("HTTP/1.1 200 OK\r\nContent-Length: {promised}\r\n\r\n");
                stream.write_all(response.as_bytes()).await?;
                stream.write_all(&body).await?;
                stream.flush().await?;
                // Drop the connection with the body incomplete
                return Ok(());
            }
        }
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Builds a listing page with one `entry`-classed article per link.
#[allow(dead_code)]
pub fn listing_page(links: &[&str]) -> String {
    let entries: String = links
        .iter()
        .map(|href| {
            format!(
                r#"<article class="entry"><header><a href="{href}">arquivo</a></header></article>"#
            )
        })
        .collect();
    format!("<html><body><section id=\"content\">{entries}</section></body></html>")
}

/// A listing page with no entries at all.
#[allow(dead_code)]
pub fn empty_listing_page() -> String {
    "<html><body><section id=\"content\"></section></body></html>".to_string()
}

/// Test configuration pointed at the given base URL, with all delays
/// collapsed so retry paths run fast.
#[allow(dead_code)]
pub fn test_config(base_url: String) -> terceirizados_cli::config::ResolvedConfig {
    terceirizados_cli::config::ResolvedConfig {
        base_url,
        page_delay_ms: 0,
        retry_delay_secs: 0,
        transport_max_retries: 1,
        transport_initial_delay_ms: 1,
        transport_max_delay_ms: 10,
        listing_timeout_secs: 5,
        probe_timeout_secs: 5,
        download_timeout_secs: 5,
        ..Default::default()
    }
}
