//! Client handle, retry loop, and single-attempt execution.
//!
//! The [`Client`] type is the main entry point for making requests. Use
//! [`Client::new`] for the defaults or [`ClientBuilder`] to configure one.

use crate::{
    config::{ClientConfig, DEFAULT_MAX_CONNECTIONS},
    headers::{to_header_map, Header},
    retry::{Decision, RetryPolicy},
    transport::{PooledTransport, Timeouts, Transport, TransportRequest},
    Error, Response, Result,
};
use http::{HeaderMap, Method};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// A reusable client bound to one base URL.
///
/// Create it once and share it: `request` takes `&self`, so any number of
/// tasks may call it concurrently through `&Client` or `Arc<Client>`. The
/// setters take `&mut self` and therefore can only run before the client is
/// shared.
///
/// Paths are appended to the base URL verbatim. No slash is inserted or
/// removed and nothing is escaped, so callers must pass pre-encoded paths
/// starting with `/`.
///
/// Each attempt is bounded by the connect and request timeouts, but there is
/// no deadline across retries. Wrap the call in `tokio::time::timeout` if one
/// is needed.
///
/// # Examples
///
/// ```no_run
/// use restline::{Client, Header};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), restline::Error> {
/// let mut client = Client::new("https://api.example.com", 10)?;
/// client.set_timeouts(Duration::from_secs(5), Duration::from_secs(10))?;
/// client.set_retries(3, Duration::from_millis(500));
///
/// let headers = [
///     Header::new("Content-Type", "application/json"),
///     Header::new("Authorization", "Bearer TOKEN"),
/// ];
/// let txn = r#"{"amount": 1000, "currency": "USD"}"#;
///
/// let response = client.request("POST", "/v1/txn", Some(txn), &headers).await?;
/// println!("Status: {}", response.status);
///
/// client.destroy();
/// # Ok(())
/// # }
/// ```
pub struct Client {
    base_url: String,
    transport: Option<Box<dyn Transport>>,
    timeouts: Timeouts,
    retry_policy: RetryPolicy,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("timeouts", &self.timeouts)
            .field("retry_policy", &self.retry_policy)
            .field("destroyed", &self.transport.is_none())
            .finish()
    }
}

impl Client {
    /// Creates a client with default timeouts and retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` does not parse or `max_connections` is zero.
    pub fn new(base_url: impl AsRef<str>, max_connections: usize) -> Result<Self> {
        Self::builder()
            .base_url(base_url)?
            .max_connections(max_connections)
            .build()
    }

    /// Creates a client from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .base_url(&config.base_url)?
            .max_connections(config.max_connections)
            .timeouts(config.timeouts())
            .retry_policy(config.retry_policy());
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        builder.build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Replaces the per-attempt connect and total timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientDestroyed`] after [`destroy`](Client::destroy), or
    /// an error if the transport cannot apply the new values.
    pub fn set_timeouts(&mut self, connect: Duration, request: Duration) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(Error::ClientDestroyed)?;
        let timeouts = Timeouts { connect, request };
        transport.reconfigure(&timeouts)?;
        self.timeouts = timeouts;
        Ok(())
    }

    /// Sets the retry budget and the delay before the first retry.
    ///
    /// Any cap or jitter configured on the policy is kept.
    pub fn set_retries(&mut self, max_retries: u32, base_backoff: Duration) {
        self.retry_policy.max_retries = max_retries;
        self.retry_policy.base_backoff = base_backoff;
    }

    pub fn set_retry_policy(&mut self, policy: RetryPolicy) {
        self.retry_policy = policy;
    }

    /// Releases the transport pool. Calling it again does nothing.
    ///
    /// Requests made afterwards fail with [`Error::ClientDestroyed`]. Dropping
    /// the client has the same effect.
    pub fn destroy(&mut self) {
        if self.transport.take().is_some() {
            tracing::debug!(base_url = %self.base_url, "Client destroyed");
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.transport.is_none()
    }

    /// Sends a request, retrying 5xx responses with exponential backoff.
    ///
    /// The response is returned for every HTTP status: 2xx, 3xx and 4xx come
    /// back after one attempt, and a 5xx comes back once retries are used up.
    /// The body, when present, is sent as-is; set `Content-Type` through
    /// `headers` if the server needs it.
    ///
    /// # Errors
    ///
    /// Transport failures (connection refused, DNS, timeouts) are returned
    /// immediately and never retried. Invalid methods or headers and a
    /// destroyed client also fail before anything is sent.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        json_body: Option<&str>,
        headers: &[Header],
    ) -> Result<Response> {
        let transport = self.transport.as_deref().ok_or(Error::ClientDestroyed)?;
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| Error::ConfigurationError(format!("Invalid method {:?}: {}", method, e)))?;
        let url = format!("{}{}", self.base_url, path);
        let headers = to_header_map(headers)?;

        let start_time = Instant::now();
        let mut retries = 0;

        loop {
            let attempt = Attempt {
                method: &method,
                url: &url,
                headers: &headers,
                body: json_body,
                number: retries + 1,
            };

            let response = match self.execute_attempt(transport, attempt, start_time).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        attempt = retries + 1,
                        method = %method,
                        url = %url,
                        "Request failed"
                    );
                    return Err(e);
                }
            };

            match self.retry_policy.classify(response.status, retries) {
                Decision::Return => {
                    tracing::info!(
                        status = response.status,
                        latency_ms = response.latency.as_millis(),
                        attempts = response.attempts,
                        "Received HTTP response"
                    );
                    return Ok(response);
                }
                Decision::Retry => {
                    retries += 1;
                    let delay = self.retry_policy.delay_for_retry(retries);
                    tracing::warn!(
                        status = response.status,
                        attempt = retries,
                        delay_ms = delay.as_millis(),
                        "Server error (5xx), retrying after delay"
                    );
                    drop(response);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Makes a GET request.
    pub async fn get(&self, path: &str, headers: &[Header]) -> Result<Response> {
        self.request("GET", path, None, headers).await
    }

    /// Makes a POST request with a JSON body.
    pub async fn post(&self, path: &str, json_body: &str, headers: &[Header]) -> Result<Response> {
        self.request("POST", path, Some(json_body), headers).await
    }

    /// Makes a PUT request with a JSON body.
    pub async fn put(&self, path: &str, json_body: &str, headers: &[Header]) -> Result<Response> {
        self.request("PUT", path, Some(json_body), headers).await
    }

    /// Makes a PATCH request with a JSON body.
    pub async fn patch(&self, path: &str, json_body: &str, headers: &[Header]) -> Result<Response> {
        self.request("PATCH", path, Some(json_body), headers).await
    }

    /// Makes a DELETE request.
    pub async fn delete(&self, path: &str, headers: &[Header]) -> Result<Response> {
        self.request("DELETE", path, None, headers).await
    }

    /// Executes a single attempt and materializes its response.
    async fn execute_attempt(
        &self,
        transport: &dyn Transport,
        attempt: Attempt<'_>,
        start_time: Instant,
    ) -> Result<Response> {
        tracing::debug!(
            method = %attempt.method,
            url = %attempt.url,
            attempt = attempt.number,
            "Executing HTTP request"
        );

        let raw = transport
            .submit(TransportRequest {
                method: attempt.method.clone(),
                url: attempt.url.to_string(),
                headers: attempt.headers.clone(),
                body: attempt.body.map(str::to_string),
                timeouts: self.timeouts,
            })
            .await?;

        let response = Response::new(
            raw.status,
            raw.headers,
            raw.body,
            attempt.number,
            start_time.elapsed(),
        );
        if let crate::Json::Unparsed { error } = &response.json {
            tracing::debug!(
                status = response.status,
                body_len = response.body.len(),
                error = %error,
                "Response body is not JSON"
            );
        }
        Ok(response)
    }
}

struct Attempt<'a> {
    method: &'a Method,
    url: &'a str,
    headers: &'a HeaderMap,
    body: Option<&'a str>,
    number: u32,
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use restline::{ClientBuilder, RetryPolicy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), restline::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://api.example.com")?
///     .max_connections(16)
///     .connect_timeout(Duration::from_secs(5))
///     .request_timeout(Duration::from_secs(10))
///     .retry_policy(
///         RetryPolicy::new(5, Duration::from_millis(200))
///             .with_max_backoff(Duration::from_secs(5)),
///     )
///     .user_agent("my-app/1.0")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<String>,
    max_connections: usize,
    timeouts: Timeouts,
    retry_policy: RetryPolicy,
    user_agent: Option<String>,
    transport: Option<Box<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            timeouts: Timeouts::default(),
            retry_policy: RetryPolicy::default(),
            user_agent: None,
            transport: None,
        }
    }

    /// Sets the base URL prefixed to every request path.
    ///
    /// The string is kept exactly as given; it is only parsed to reject
    /// obviously malformed values early.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        Url::parse(url.as_ref())?;
        self.base_url = Some(url.as_ref().to_string());
        Ok(self)
    }

    /// Sets the maximum number of concurrent connections.
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connect = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request = timeout;
        self
    }

    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets the `User-Agent` sent by the pooled transport.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Uses a custom transport instead of the pooled `reqwest` one.
    ///
    /// `max_connections` and `user_agent` are ignored in that case.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided or the transport pool
    /// cannot be created.
    pub fn build(self) -> Result<Client> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::ConfigurationError("Base URL is required".to_string()))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(PooledTransport::with_user_agent(
                self.max_connections,
                &self.timeouts,
                self.user_agent,
            )?),
        };

        Ok(Client {
            base_url,
            transport: Some(transport),
            timeouts: self.timeouts,
            retry_policy: self.retry_policy,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
