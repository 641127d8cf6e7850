//! Integration tests for Harbor Market.
//!
//! These tests talk to a running storefront over HTTP, so they are
//! `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! hm-cli migrate
//! hm-cli seed catalog
//! cargo run -p harbor-storefront &
//! cargo test -p harbor-integration-tests -- --ignored
//! ```
//!
//! `STOREFRONT_TEST_URL` overrides the default `http://localhost:3000`.
//! Write endpoints are rate limited per client IP, so each test sends a
//! distinct `X-Forwarded-For` address.

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

const DEFAULT_STOREFRONT_URL: &str = "http://localhost:3000";

/// HTTP client bound to one storefront, with its own cookie jar (session).
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    client_ip: String,
}

impl TestContext {
    /// Create a context whose requests appear to come from `client_ip`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new(client_ip: &str) -> Self {
        let base_url = std::env::var("STOREFRONT_TEST_URL")
            .unwrap_or_else(|_| DEFAULT_STOREFRONT_URL.to_string());
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .unwrap_or_else(|e| panic!("failed to build HTTP client: {e}"));
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_ip: client_ip.to_string(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .header("x-forwarded-for", &self.client_ip)
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {path} failed: {e}"))
    }

    /// Send a JSON body with `method` to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn send_json(&self, method: reqwest::Method, path: &str, body: &Value) -> Response {
        self.client
            .request(method.clone(), self.url(path))
            .header("x-forwarded-for", &self.client_ip)
            .json(body)
            .send()
            .await
            .unwrap_or_else(|e| panic!("{method} {path} failed: {e}"))
    }

    /// POST a JSON body to `path`.
    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.send_json(reqwest::Method::POST, path, body).await
    }
}

/// Read a response as `(status, json)`; non-JSON bodies become `Null`.
pub async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}
