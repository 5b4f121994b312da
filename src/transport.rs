//! Transport seam and the pooled `reqwest` implementation.
//!
//! A [`Transport`] drives exactly one attempt to completion. It never retries:
//! a failure to connect or a timeout is reported once and handed back to the
//! retry loop, which surfaces it to the caller.

use crate::{Error, Result};
use async_trait::async_trait;
use http::{HeaderMap, Method};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Default time allowed to establish a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time allowed for a whole attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Content-Length is only a hint; larger bodies grow the buffer as chunks arrive.
const MAX_PREALLOCATED_BODY: u64 = 1 << 20;

/// Per-attempt time bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Time allowed to establish the connection.
    pub connect: Duration,
    /// Time allowed for the whole attempt, body included.
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            request: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// A fully prepared attempt.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute URL, already joined from base URL and path.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub timeouts: Timeouts,
}

/// What came back from the wire for one attempt.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Accumulated body bytes. Empty when the server sent no body.
    pub body: Vec<u8>,
}

/// Executes single attempts against a remote endpoint.
///
/// Implementations must allow concurrent `submit` calls without one request's
/// I/O blocking another's.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Drives one attempt to completion or transport failure.
    async fn submit(&self, request: TransportRequest) -> Result<RawResponse>;

    /// Applies new timeouts. Called only while the client is exclusively borrowed.
    fn reconfigure(&mut self, _timeouts: &Timeouts) -> Result<()> {
        Ok(())
    }
}

/// Connection-pooled transport built on `reqwest`.
///
/// Idle connections to the base host are kept for reuse, and HTTP/2 is
/// negotiated when the server offers it. At most `max_connections` attempts
/// are in flight at once; further callers wait for a slot without holding any
/// lock.
pub struct PooledTransport {
    http_client: reqwest::Client,
    slots: Semaphore,
    max_connections: usize,
    user_agent: Option<String>,
}

impl PooledTransport {
    /// Creates a pool allowing `max_connections` concurrent attempts.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_connections` is zero or too large, or the underlying HTTP
    /// client cannot be built.
    pub fn new(max_connections: usize, timeouts: &Timeouts) -> Result<Self> {
        Self::with_user_agent(max_connections, timeouts, None)
    }

    pub(crate) fn with_user_agent(
        max_connections: usize,
        timeouts: &Timeouts,
        user_agent: Option<String>,
    ) -> Result<Self> {
        if max_connections == 0 || max_connections > Semaphore::MAX_PERMITS {
            return Err(Error::ConfigurationError(format!(
                "max_connections must be between 1 and {}, got {}",
                Semaphore::MAX_PERMITS,
                max_connections
            )));
        }

        let http_client = build_http_client(max_connections, timeouts, user_agent.as_deref())?;

        Ok(Self {
            http_client,
            slots: Semaphore::new(max_connections),
            max_connections,
            user_agent,
        })
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Number of attempts that could start right now without waiting.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }
}

fn build_http_client(
    max_connections: usize,
    timeouts: &Timeouts,
    user_agent: Option<&str>,
) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .pool_max_idle_per_host(max_connections)
        .connect_timeout(timeouts.connect);
    if let Some(user_agent) = user_agent {
        builder = builder.user_agent(user_agent);
    }
    builder
        .build()
        .map_err(|e| Error::ConfigurationError(format!("Failed to build HTTP client: {}", e)))
}

#[async_trait]
impl Transport for PooledTransport {
    async fn submit(&self, request: TransportRequest) -> Result<RawResponse> {
        let _slot = self
            .slots
            .acquire()
            .await
            .map_err(|_| Error::ClientDestroyed)?;

        let mut builder = self
            .http_client
            .request(request.method, request.url)
            .headers(request.headers)
            .timeout(request.timeouts.request);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let mut response = builder.send().await.map_err(Error::from_transport)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();

        let capacity = response.content_length().unwrap_or(0).min(MAX_PREALLOCATED_BODY);
        let mut body = Vec::with_capacity(capacity as usize);
        while let Some(chunk) = response.chunk().await.map_err(Error::from_transport)? {
            body.extend_from_slice(&chunk);
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn reconfigure(&mut self, timeouts: &Timeouts) -> Result<()> {
        self.http_client =
            build_http_client(self.max_connections, timeouts, self.user_agent.as_deref())?;
        Ok(())
    }
}

impl Drop for PooledTransport {
    fn drop(&mut self) {
        self.slots.close();
        tracing::debug!(
            max_connections = self.max_connections,
            "Released transport pool"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_starts_with_all_slots_free() {
        let transport = PooledTransport::new(4, &Timeouts::default()).unwrap();
        assert_eq!(transport.max_connections(), 4);
        assert_eq!(transport.available_slots(), 4);
    }

    #[test]
    fn test_zero_connections_rejected() {
        let result = PooledTransport::new(0, &Timeouts::default());
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_reconfigure_rebuilds_client() {
        let mut transport = PooledTransport::new(2, &Timeouts::default()).unwrap();
        let timeouts = Timeouts {
            connect: Duration::from_secs(1),
            request: Duration::from_secs(2),
        };
        assert!(transport.reconfigure(&timeouts).is_ok());
        assert_eq!(transport.available_slots(), 2);
    }
}
