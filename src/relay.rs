//! Pass-through relay chain.
//!
//! The source site blocks cross-origin reads, so every page goes through one
//! of a fixed list of relay endpoints. Endpoints are tried once each, in
//! order; the first one that returns a non-empty body wins.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::config::{RelayConfig, RelayEndpoint};
use crate::error::{ResolutionError, Result};
use crate::http_client::PageFetcher;

/// Fetches arbitrary URLs through a prioritized list of relays.
pub struct ProxyRelay<F> {
    fetcher: Arc<F>,
    endpoints: Vec<RelayEndpoint>,
    timeout: Duration,
}

impl<F: PageFetcher> ProxyRelay<F> {
    pub fn new(fetcher: Arc<F>, config: &RelayConfig) -> Self {
        Self {
            fetcher,
            endpoints: config.endpoints.clone(),
            timeout: config.timeout(),
        }
    }

    /// Relay endpoints in the order they are tried.
    #[must_use]
    pub fn endpoints(&self) -> &[RelayEndpoint] {
        &self.endpoints
    }

    /// Fetch `target` through the first relay that delivers content.
    ///
    /// Timeouts, transport errors and blank bodies all count as a failed
    /// attempt and move on to the next relay. Nothing is cached.
    ///
    /// # Errors
    ///
    /// `FetchFailed` carrying the last relay's failure when every relay fails.
    #[instrument(skip(self), fields(target = %target))]
    pub async fn fetch(&self, target: &str) -> Result<String> {
        let mut last_failure = String::from("no relay endpoints configured");

        for endpoint in &self.endpoints {
            let url = endpoint.wrap(target);
            let failure = match tokio::time::timeout(self.timeout, self.fetcher.fetch_text(&url)).await {
                Ok(Ok(body)) if !body.trim().is_empty() => {
                    debug!(relay = %endpoint.name, bytes = body.len(), "Relay delivered content");
                    return Ok(body);
                }
                Ok(Ok(_)) => "empty body".to_string(),
                Ok(Err(e)) => format!("{e:#}"),
                Err(_) => format!("timed out after {:?}", self.timeout),
            };

            warn!(relay = %endpoint.name, %failure, "Relay attempt failed");
            last_failure = format!("relay {}: {failure}", endpoint.name);
        }

        Err(ResolutionError::fetch_failed(last_failure))
    }
}
