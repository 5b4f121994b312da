//! Error types for request execution.
//!
//! Only failures that prevent a [`Response`](crate::Response) from existing are
//! errors here. An HTTP status of any kind, including a 5xx left over after
//! retries are exhausted, is returned as a normal response for the caller to
//! inspect.

/// The main error type for the client.
///
/// # Examples
///
/// ```no_run
/// use restline::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new("https://api.example.com", 8)?;
///
/// match client.request("GET", "/v1/accounts", None, &[]).await {
///     Ok(response) if response.is_server_error() => {
///         eprintln!("server still failing after {} attempts", response.attempts);
///     }
///     Ok(response) => println!("status {}", response.status),
///     Err(Error::Timeout) => eprintln!("attempt timed out"),
///     Err(e) => eprintln!("request could not be completed: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection refused, DNS lookup failed, etc.).
    ///
    /// This wraps the underlying `reqwest::Error`. The engine never retries it.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The attempt exceeded its connect or total timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be dispatched because of how the client or the
    /// request was configured, such as an invalid method or header value.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The base URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The client was destroyed and no longer owns a transport pool.
    #[error("Client has been destroyed")]
    ClientDestroyed,

    /// Failed to deserialize a response body into the requested type.
    ///
    /// Produced by [`Response::deserialize`](crate::Response::deserialize); the
    /// raw body is preserved for debugging.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: u16,
    },
}

impl Error {
    /// Returns `true` if the error happened at the transport layer, meaning the
    /// attempt never produced an HTTP status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout)
    }

    /// Returns the HTTP status code if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error carries one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Maps a `reqwest` failure onto the error taxonomy, splitting timeouts out.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }
}

/// A specialized `Result` type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
