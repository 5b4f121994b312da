//! Serializable client configuration.
//!
//! [`ClientConfig`] lets an application keep client settings in whatever file
//! format it already loads with serde. Every field has a default, so a config
//! only needs the base URL.

use crate::retry::{RetryPolicy, DEFAULT_BASE_BACKOFF, DEFAULT_MAX_RETRIES};
use crate::transport::{Timeouts, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default upper bound on concurrent connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

/// Client settings in plain units.
///
/// # Examples
///
/// ```
/// use restline::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(
///     r#"{ "base_url": "https://api.example.com", "max_retries": 5 }"#,
/// ).unwrap();
///
/// assert_eq!(config.max_retries, 5);
/// assert_eq!(config.base_backoff_ms, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix joined verbatim to every request path.
    pub base_url: String,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Retries after the first attempt, for 5xx responses only.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub base_backoff_ms: u64,
    /// Optional cap on a single backoff delay.
    pub max_backoff_ms: Option<u64>,
    /// Randomize each delay between 50% and 100% of its nominal value.
    pub jitter: bool,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            max_retries: DEFAULT_MAX_RETRIES,
            base_backoff_ms: DEFAULT_BASE_BACKOFF.as_millis() as u64,
            max_backoff_ms: None,
            jitter: false,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Creates a default config for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            request: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(self.max_retries, Duration::from_millis(self.base_backoff_ms))
            .with_jitter(self.jitter);
        match self.max_backoff_ms {
            Some(ms) => policy.with_max_backoff(Duration::from_millis(ms)),
            None => policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("https://api.example.com");

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.timeouts(), Timeouts::default());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_partial_deserialize() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "base_url": "https://api.example.com",
                "connect_timeout_secs": 5,
                "request_timeout_secs": 10,
                "max_backoff_ms": 4000
            }"#,
        )
        .unwrap();

        assert_eq!(config.timeouts().connect, Duration::from_secs(5));
        assert_eq!(config.timeouts().request, Duration::from_secs(10));
        assert_eq!(
            config.retry_policy().max_backoff,
            Some(Duration::from_secs(4))
        );
        assert_eq!(config.max_retries, 3);
    }
}
