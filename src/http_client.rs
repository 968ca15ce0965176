//! HTTP client used for relay requests
//!
//! Features:
//! - Brotli, Zstd, Gzip compression (auto-negotiated)
//! - DNS caching + Happy Eyeballs (IPv4/IPv6 racing)
//! - Connection pooling with keep-alive
//! - Browser-like default headers

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::fingerprint::{random_profile, BrowserProfile};

/// Anything that can turn a URL into page text.
///
/// The relay chain, matcher and coordinator only depend on this trait, so
/// tests can script responses without a network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the response body as text.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// HTTP client with compression, pooling and a browser profile
#[derive(Debug, Clone)]
pub struct AcceleratedClient {
    client: Client,
    profile: BrowserProfile,
}

impl AcceleratedClient {
    /// Create a client with a random browser profile
    pub fn new() -> Result<Self> {
        Self::with_profile(random_profile())
    }

    /// Create client with specific browser profile
    pub fn with_profile(profile: BrowserProfile) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .zstd(true)
            .gzip(true)
            .deflate(true)
            .default_headers(profile.to_headers())
            // Per-attempt deadlines are enforced by the relay chain; this is
            // only a backstop for connections that never resolve.
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_store(true)
            .build()?;

        Ok(Self { client, profile })
    }

    /// Current browser profile
    #[must_use]
    pub fn profile(&self) -> &BrowserProfile {
        &self.profile
    }

    /// Get the underlying reqwest client
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl PageFetcher for AcceleratedClient {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        debug!(
            status = %response.status(),
            version = ?response.version(),
            content_encoding = ?response.headers().get("content-encoding"),
            "Response received"
        );

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::chrome_profile;

    #[test]
    fn builds_with_profile() {
        let profile = chrome_profile();
        let client = AcceleratedClient::with_profile(profile.clone()).unwrap();
        assert_eq!(client.profile().user_agent, profile.user_agent);
    }

    #[tokio::test]
    async fn unreachable_host_is_an_error() {
        let client = AcceleratedClient::new().unwrap();
        let result = client.fetch_text("http://127.0.0.1:9/unreachable").await;
        assert!(result.is_err());
    }
}
