//! JSON fetcher for the chain REST API
//!
//! This module provides the single network primitive used by the resolver:
//! a bounded-timeout HTTP GET that yields parsed JSON or nothing. Failures are
//! logged and reported as `None` so callers treat them as "unknown", never as
//! an authoritative negative.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Error type for a single fetch
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network error, including timeouts
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("Server returned status {0}")]
    Status(StatusCode),

    /// Body was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Source of JSON documents addressed by URL
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// Fetch and parse `url`, or `None` on any failure
    async fn fetch_json(&self, url: &str) -> Option<Value>;
}

/// HTTP implementation of [`JsonFetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// HTTP client
    client: Client,

    /// Timeout for requests
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a new fetcher with the given per-request timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Fetch `url` and parse the body, keeping the failure reason
    pub async fn try_fetch(&self, url: &str) -> Result<Value, FetchError> {
        let response = self.client
            .get(url)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let value = serde_json::from_slice(&body)?;
        Ok(value)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Option<Value> {
        match self.try_fetch(url).await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("xID RPC fetch failed for {}: {}", url, e);
                None
            }
        }
    }
}
