//! Posts a demo transaction and prints the response.
//!
//! This example shows how to:
//! - Create a client and tune timeouts and retries
//! - Send a JSON body with custom headers
//! - Inspect the status, raw body, and parsed JSON
//!
//! Run with: `cargo run --example basic_call -- https://auth.example.com`

use restline::{Client, Error, HeaderSet};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("restline=debug,basic_call=info")
        .init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://auth.example.com".to_string());

    let mut client = Client::new(&base_url, 10)?;
    client.set_timeouts(Duration::from_secs(5), Duration::from_secs(10))?;
    // Retry 5xx responses up to 3 times, starting at 500ms
    client.set_retries(3, Duration::from_millis(500));

    let headers = HeaderSet::new()
        .with("Content-Type", "application/json")
        .with("Authorization", "Bearer TOKEN");

    let txn = r#"{"amount": 1000, "currency": "USD"}"#;
    let response = client
        .request("POST", "/v1/txn", Some(txn), headers.as_slice())
        .await?;

    println!("Status: {}", response.status);
    println!("Body: {}", response.text());
    println!("Attempts: {}", response.attempts);
    println!("Latency: {:?}", response.latency);
    if let Some(doc) = response.json_value() {
        println!("JSON: {:#}", doc);
    }

    client.destroy();
    Ok(())
}
