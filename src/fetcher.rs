//! HTTP retrieval of source payloads.
//!
//! A single attempt per URL: no retries, bounded by a client-wide timeout. Every
//! failure is returned as a [`FetchError`] so the caller can turn it into
//! "zero candidates from this source" without aborting the run.

use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument};

/// Why a retrieval produced no payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = e.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

/// Anything that can turn a URL into a text payload.
///
/// The pipeline is generic over this so tests can run scenarios without a network.
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`Fetch`] over a shared `reqwest` client with a fixed user agent and timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched payload"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_url() {
        let e = FetchError::Timeout {
            url: "https://example.org/feed".to_string(),
        };
        assert_eq!(e.to_string(), "request to https://example.org/feed timed out");

        let e = FetchError::Status {
            url: "https://example.org/feed".to_string(),
            status: 503,
        };
        assert!(e.to_string().contains("HTTP 503"));
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new("institutional_news/test", Duration::from_secs(1)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error_not_a_panic() {
        let fetcher = HttpFetcher::new("institutional_news/test", Duration::from_millis(500)).unwrap();
        // Port 9 on localhost is reserved (discard) and normally closed.
        let result = fetcher.fetch("http://127.0.0.1:9/feed.xml").await;
        assert!(result.is_err());
    }
}
