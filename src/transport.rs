//! Reusable transport handle for calling the web service
//!
//! The handle is created and owned by the caller and lives across many calls.
//! Each call resets it, sets the target URL, then performs the request while
//! body chunks are handed to a sink in the order they arrive.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use thiserror::Error;

/// Size of the buffer used when draining a response body
const CHUNK_SIZE: usize = 16 * 1024;

/// Errors that can occur while configuring or performing a request
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying HTTP client could not be built
    #[error("Failed to create HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// `perform` was called without a URL set since the last reset
    #[error("No URL configured for request")]
    NoUrl,

    /// The target URL could not be parsed
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection, DNS, timeout, or other request failure
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server returned status {0}")]
    Status(reqwest::StatusCode),

    /// The response body could not be read to the end
    #[error("Failed to read response body: {0}")]
    Read(#[from] std::io::Error),
}

/// A reusable request handle
///
/// Implementations must forget all per-call configuration on `reset`, so one
/// call never sees the URL of the previous one.
pub trait Transport {
    /// Clears configuration left over from a previous call
    fn reset(&mut self);

    /// Sets the URL for the next `perform`
    fn set_url(&mut self, url: &str) -> Result<(), TransportError>;

    /// Performs the request, passing each received body chunk to `sink`
    fn perform(&mut self, sink: &mut dyn FnMut(&[u8])) -> Result<(), TransportError>;
}

/// Live HTTP transport backed by a blocking reqwest client
///
/// The client (and its connection pool) is kept across calls; only the
/// per-call URL is cleared on reset.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: Option<Url>,
}

impl HttpTransport {
    /// Creates a transport with no request timeout
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(None)
    }

    /// Creates a transport whose requests give up after `timeout`
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, TransportError> {
        // reqwest's blocking client defaults to 30s; None here means no limit
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Build)?;
        Ok(Self::with_client(client))
    }

    /// Creates a transport around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client, url: None }
    }

    /// Returns the URL configured for the next request, if any
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }
}

impl Transport for HttpTransport {
    fn reset(&mut self) {
        self.url = None;
    }

    fn set_url(&mut self, url: &str) -> Result<(), TransportError> {
        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        self.url = Some(parsed);
        Ok(())
    }

    fn perform(&mut self, sink: &mut dyn FnMut(&[u8])) -> Result<(), TransportError> {
        let url = self.url.clone().ok_or(TransportError::NoUrl)?;

        let mut response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = match response.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            sink(&buf[..n]);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transport_has_no_url() {
        let transport = HttpTransport::new().expect("Client should build");
        assert!(transport.url().is_none());
    }

    #[test]
    fn test_set_url_then_reset_clears_url() {
        let mut transport = HttpTransport::new().expect("Client should build");
        transport
            .set_url("http://localhost/api?rt=20&stpid=456&")
            .expect("URL should parse");
        assert!(transport.url().is_some());

        transport.reset();

        assert!(transport.url().is_none());
    }

    #[test]
    fn test_set_url_rejects_unparseable_url() {
        let mut transport = HttpTransport::new().expect("Client should build");
        let err = transport.set_url("not a url").unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_perform_without_url_fails() {
        let mut transport = HttpTransport::new().expect("Client should build");
        let mut received = Vec::new();
        let err = transport
            .perform(&mut |chunk| received.extend_from_slice(chunk))
            .unwrap_err();
        assert!(matches!(err, TransportError::NoUrl));
        assert!(received.is_empty());
    }

    #[test]
    fn test_with_timeout_builds() {
        let transport = HttpTransport::with_timeout(Some(Duration::from_secs(5)));
        assert!(transport.is_ok());
    }
}
