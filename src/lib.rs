//! # Restline - a pooled JSON REST client with retry
//!
//! Restline issues requests against a JSON REST API through a bounded,
//! reusable connection pool, and retries transient server errors (HTTP 5xx)
//! with exponential backoff.
//!
//! ## Quick Start
//!
//! ```no_run
//! use restline::{Client, Header};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), restline::Error> {
//!     let mut client = Client::new("https://auth.example.com", 10)?;
//!     client.set_timeouts(Duration::from_secs(5), Duration::from_secs(10))?;
//!     client.set_retries(3, Duration::from_millis(500));
//!
//!     let headers = [
//!         Header::new("Content-Type", "application/json"),
//!         Header::new("Authorization", "Bearer TOKEN"),
//!     ];
//!     let txn = r#"{"amount": 1000, "currency": "USD"}"#;
//!
//!     let response = client.request("POST", "/v1/txn", Some(txn), &headers).await?;
//!     println!("Status: {}", response.status);
//!     println!("Body: {}", response.text());
//!     if let Some(doc) = response.json_value() {
//!         println!("JSON: {:#}", doc);
//!     }
//!
//!     client.destroy();
//!     Ok(())
//! }
//! ```
//!
//! ## Retry behavior
//!
//! - A 5xx response is retried while the budget lasts, waiting
//!   `base, 2 * base, 4 * base, ...` between attempts.
//! - Once the budget is spent, the last 5xx response is returned as a normal
//!   [`Response`]. Exhaustion is not an error.
//! - Every other status, 4xx included, is returned after a single attempt.
//! - Transport failures (connection refused, DNS, timeouts) are returned as
//!   [`Error`] immediately and never retried.
//!
//! ## Response bodies
//!
//! [`Response::body`] always holds the raw bytes. [`Response::json`] holds the
//! parsed document or an [`Json::Unparsed`] marker when the body is empty or
//! not JSON.

mod client;
mod config;
mod error;
mod headers;
mod response;
pub mod retry;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use headers::{Header, HeaderSet};
pub use response::{Json, Response};
pub use retry::RetryPolicy;
pub use transport::{PooledTransport, RawResponse, Timeouts, Transport, TransportRequest};
