//! HTTP requests and streaming downloads with read timeout.
//!
//! Uses async reqwest internally with tokio::time::timeout for stall detection,
//! but presents a sync interface so callers can run on a plain background thread.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use futures_util::StreamExt;

/// Progress callback granularity and write buffer size (64KB)
pub const CHUNK_SIZE: usize = 64 * 1024;

/// HTTP settings, passed explicitly to every component that talks to the network
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    /// Stall timeout: no bytes within this window aborts a download
    pub read_timeout: Duration,
    /// Whole-request timeout for small API calls (bulk listing)
    pub request_timeout: Duration,
    /// Sent on every request; the card service rejects anonymous clients
    pub user_agent: String,
    /// Honor HTTP(S)_PROXY from the environment
    pub system_proxy: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("cardline/{}", env!("CARGO_PKG_VERSION")),
            system_proxy: true,
        }
    }
}

/// Error types for stream operations
#[derive(Debug)]
pub enum StreamError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Body ended before the declared Content-Length
    Incomplete { received: u64, expected: u64 },
    /// I/O error (includes read timeouts)
    Io(io::Error),
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Incomplete { received, expected } => {
                write!(f, "incomplete body: {received} of {expected} bytes")
            }
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl StreamError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::Io(io::Error::new(io::ErrorKind::TimedOut, "request timed out"));
        }
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == io::ErrorKind::TimedOut)
    }
}

impl From<io::Error> for StreamError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Build an async HTTP client from explicit settings.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client, StreamError> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.as_str())
        .pool_max_idle_per_host(2);
    if !config.system_proxy {
        builder = builder.no_proxy();
    }
    builder.build().map_err(|e| StreamError::from_reqwest(&e))
}

/// HTTP GET a small JSON document as text, bounded by `timeout`.
pub fn get_text(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, StreamError> {
    SHARED_RUNTIME.handle().block_on(async {
        let request = async {
            client
                .get(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| StreamError::from_reqwest(&e))?
                .text()
                .await
                .map_err(|e| StreamError::from_reqwest(&e))
        };
        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(StreamError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no response within {}s", timeout.as_secs()),
            ))),
        }
    })
}

/// HTTP GET → stream body into `dest`, reporting progress every [`CHUNK_SIZE`] bytes.
///
/// `on_chunk(done, total)` receives cumulative bytes and the declared
/// Content-Length, if any. Each body read is bounded by `read_timeout`.
/// The file is flushed and synced before returning; a body shorter than
/// the declared length is an error.
///
/// Returns total bytes written.
pub fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    read_timeout: Duration,
    mut on_chunk: impl FnMut(u64, Option<u64>),
) -> Result<u64, StreamError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| StreamError::from_reqwest(&e))?;

        let total = response.content_length();
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, File::create(dest)?);
        let mut body = response.bytes_stream();
        let mut done = 0u64;
        let mut reported = 0u64;

        loop {
            let next = match tokio::time::timeout(read_timeout, body.next()).await {
                Ok(next) => next,
                Err(_) => {
                    return Err(StreamError::Io(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("read timeout ({}s with no data)", read_timeout.as_secs()),
                    )));
                }
            };
            let Some(chunk) = next else { break };
            let chunk = chunk.map_err(|e| StreamError::from_reqwest(&e))?;
            writer.write_all(&chunk)?;
            done += chunk.len() as u64;
            if done - reported >= CHUNK_SIZE as u64 {
                on_chunk(done, total);
                reported = done;
            }
        }

        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        if let Some(expected) = total {
            if done != expected {
                return Err(StreamError::Incomplete {
                    received: done,
                    expected,
                });
            }
        }
        if done != reported {
            on_chunk(done, total);
        }
        Ok(done)
    })
}
