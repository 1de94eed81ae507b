//! HTTP client for the remote now-playing endpoint.

use nowpoll_core::{FetchError, HistorySource, RawHistoryPayload};
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;

/// History client configuration.
#[derive(Debug, Clone)]
pub struct HistoryClientConfig {
    /// Endpoint URL returning the history JSON document
    pub endpoint_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Append a `dummy=<epoch-ms>` query parameter to defeat caches
    pub cache_bust: bool,
}

impl Default for HistoryClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://localhost:8080/nowplaying/recent.json".to_string(),
            timeout: Duration::from_secs(10),
            cache_bust: true,
        }
    }
}

/// HTTP client fetching the remote history document.
pub struct HistoryClient {
    client: reqwest::Client,
    endpoint: Url,
    cache_bust: bool,
}

impl HistoryClient {
    /// Create a new history client.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint URL is invalid or not http/https, or if
    /// the HTTP client cannot be created.
    pub fn new(config: HistoryClientConfig) -> Result<Self, ClientError> {
        let endpoint = Url::parse(&config.endpoint_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.endpoint_url)))?;

        match endpoint.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ClientError::InvalidUrl(format!(
                    "{}: unsupported scheme '{scheme}'",
                    config.endpoint_url
                )));
            }
        }

        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if endpoint.scheme() == "https" {
            builder = builder.use_rustls_tls();
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            cache_bust: config.cache_bust,
        })
    }

    /// Build the request URL, appending the cache-bust parameter if enabled.
    fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if self.cache_bust {
            url.query_pairs_mut()
                .append_pair("dummy", &epoch_ms().to_string());
        }
        url
    }

    /// Fetch and decode the current history payload.
    ///
    /// # Errors
    ///
    /// Returns error on network failures, non-2xx responses, or a body that
    /// does not decode as the history JSON shape.
    pub async fn fetch_recent(&self) -> Result<RawHistoryPayload, ClientError> {
        let url = self.request_url();

        tracing::debug!(%url, "GET now-playing history");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Api {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

impl HistorySource for HistoryClient {
    fn fetch_history(
        &mut self,
    ) -> impl Future<Output = Result<RawHistoryPayload, FetchError>> + Send {
        async move {
            self.fetch_recent()
                .await
                .map_err(|e| FetchError::new(e.to_string()))
        }
    }
}

/// Milliseconds since the UNIX epoch, for the cache-bust parameter.
fn epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Errors that can occur with the history client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// Client initialization failed
    #[error("client init error: {0}")]
    Init(String),
    /// Endpoint URL is invalid
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
    /// HTTP request failed
    #[error("request error: {0}")]
    Request(String),
    /// Endpoint returned an error status
    #[error("endpoint error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },
    /// Response body did not decode as the history payload
    #[error("parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = HistoryClientConfig::default();
        assert_eq!(
            config.endpoint_url,
            "http://localhost:8080/nowplaying/recent.json"
        );
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.cache_bust);
    }

    #[test]
    fn client_creation() {
        let client = HistoryClient::new(HistoryClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn invalid_url_rejected() {
        let config = HistoryClientConfig {
            endpoint_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            HistoryClient::new(config),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn non_http_scheme_rejected() {
        let config = HistoryClientConfig {
            endpoint_url: "ftp://example.com/recent.json".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            HistoryClient::new(config),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn cache_bust_appends_dummy_param() {
        let client = HistoryClient::new(HistoryClientConfig::default()).unwrap();
        let url = client.request_url();
        assert!(url.query_pairs().any(|(key, _)| key == "dummy"));
    }

    #[test]
    fn cache_bust_can_be_disabled() {
        let config = HistoryClientConfig {
            cache_bust: false,
            ..Default::default()
        };
        let client = HistoryClient::new(config).unwrap();
        assert!(client.request_url().query().is_none());
    }
}
