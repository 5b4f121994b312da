//! The response handed back once the retry loop stops.
//!
//! A [`Response`] keeps the raw body bytes alongside a best-effort JSON parse,
//! so a malformed or empty body never hides what the server actually sent.

use crate::{Error, Result};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;

/// Outcome of parsing a response body as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Json {
    /// The body was a valid JSON document.
    Parsed(serde_json::Value),
    /// The body was empty or not valid JSON.
    Unparsed {
        /// The parser's error message.
        error: String,
    },
}

impl Json {
    /// Parses `body`, recording a failure instead of returning it.
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(value) => Json::Parsed(value),
            Err(e) => Json::Unparsed {
                error: e.to_string(),
            },
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Json::Parsed(_))
    }

    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Json::Parsed(value) => Some(value),
            Json::Unparsed { .. } => None,
        }
    }
}

/// The terminal response of a request.
///
/// Any status can appear here. A 5xx means the retry budget ran out; 4xx
/// responses are never retried and also arrive here, so check [`status`]
/// rather than relying on an error.
///
/// [`status`]: Response::status
///
/// # Examples
///
/// ```no_run
/// use restline::{Client, Header};
///
/// # async fn example() -> Result<(), restline::Error> {
/// let client = Client::new("https://api.example.com", 4)?;
/// let headers = [Header::new("Accept", "application/json")];
///
/// let response = client.request("GET", "/v1/banks", None, &headers).await?;
///
/// println!("Status: {}", response.status);
/// println!("Attempts: {}", response.attempts);
/// match response.json_value() {
///     Some(doc) => println!("JSON: {}", doc),
///     None => println!("Raw: {}", response.text()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,

    /// The response headers.
    pub headers: HeaderMap,

    /// The raw body. Empty, not absent, when the server sent nothing.
    pub body: Vec<u8>,

    /// The body parsed as JSON, or the reason it could not be.
    pub json: Json,

    /// Attempts made, including the first. `1` means no retry happened.
    pub attempts: u32,

    /// Time from the first attempt starting until this response was read,
    /// backoff sleeps included.
    pub latency: Duration,
}

impl Response {
    /// Builds a response from raw parts, parsing the body as JSON.
    pub fn new(
        status: u16,
        headers: HeaderMap,
        body: Vec<u8>,
        attempts: u32,
        latency: Duration,
    ) -> Self {
        let json = Json::parse(&body);
        Self {
            status,
            headers,
            body,
            json,
            attempts,
            latency,
        }
    }

    /// Returns the parsed JSON document, if the body was valid JSON.
    pub fn json_value(&self) -> Option<&serde_json::Value> {
        self.json.as_value()
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] with the raw body if it does not
    /// match `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| Error::DeserializationFailed {
            raw_response: self.text().into_owned(),
            serde_error: e.to_string(),
            status: self.status,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` for 5xx statuses, i.e. retries were exhausted.
    pub fn is_server_error(&self) -> bool {
        crate::retry::is_retryable_status(self.status)
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}
