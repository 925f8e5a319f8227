use crate::error::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Image fetched when no source URL is configured.
pub const DEFAULT_SOURCE_URL: &str = "https://images.alphacoders.com/601/601059.jpg";

#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Source image for the example workflow.
    pub source_url: Option<String>,
    /// Directory prefix prepended to output file names.
    pub output_dir: Option<String>,
    /// HTTP request timeout. `None` waits indefinitely.
    pub http_timeout: Option<Duration>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_timeout = match non_empty("PHOTOKIT_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    AppError::Config(format!(
                        "PHOTOKIT_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            source_url: non_empty("PHOTOKIT_SOURCE_URL"),
            output_dir: non_empty("PHOTOKIT_OUTPUT_DIR"),
            http_timeout,
        })
    }

    pub fn source_url(&self) -> &str {
        self.source_url.as_deref().unwrap_or(DEFAULT_SOURCE_URL)
    }
}
