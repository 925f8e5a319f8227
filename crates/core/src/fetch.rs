//! Blocking HTTP download of image bytes.
//!
//! One GET per call, no custom headers, no retries.

use crate::config::Config;
use crate::error::{AppError, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

/// Thin wrapper over a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with no request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(config.http_timeout)
    }

    /// Creates a fetcher whose requests give up after `timeout`.
    /// `None` waits indefinitely.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Downloads the body at `url`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`AppError::InvalidUrl`] if the URL does not parse
    /// - [`AppError::Network`] on transport failure
    /// - [`AppError::HttpStatus`] if the status is not 2xx
    pub fn get(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = Url::parse(url).map_err(|e| AppError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        log::info!("Fetching image from {}", parsed);

        let response = self
            .client
            .get(parsed)
            .send()
            .map_err(|e| AppError::network(format!("Error connecting to URL: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|e| AppError::network(format!("Failed to read response body: {}", e)))?;

        log::debug!("Received {} bytes from {}", body.len(), url);

        Ok(body.to_vec())
    }
}
