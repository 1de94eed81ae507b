//! Agent configuration.

use anyhow::{Context, Result};
use std::time::Duration;

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Endpoint URL returning the now-playing history JSON
    pub endpoint_url: String,

    /// Delay between polls
    pub poll_interval: Duration,

    /// HTTP request timeout
    pub request_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://localhost:8080/nowplaying/recent.json".to_string(),
            poll_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl AgentConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NOWPOLL_ENDPOINT_URL`: history endpoint URL
    /// - `NOWPOLL_POLL_INTERVAL_SECS`: seconds between polls (positive integer)
    /// - `NOWPOLL_REQUEST_TIMEOUT_SECS`: HTTP timeout in seconds
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but not a valid value.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("NOWPOLL_ENDPOINT_URL") {
            config.endpoint_url = url;
        }

        if let Ok(secs) = std::env::var("NOWPOLL_POLL_INTERVAL_SECS") {
            let secs: u64 = secs
                .parse()
                .context("Invalid NOWPOLL_POLL_INTERVAL_SECS")?;
            if secs == 0 {
                anyhow::bail!("NOWPOLL_POLL_INTERVAL_SECS must be positive");
            }
            config.poll_interval = Duration::from_secs(secs);
        }

        if let Ok(secs) = std::env::var("NOWPOLL_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .context("Invalid NOWPOLL_REQUEST_TIMEOUT_SECS")?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }
}
