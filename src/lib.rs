//! `anistream` - Resolve anime episodes to playable streams
//!
//! # Features
//!
//! - **Relay chain**: source pages are fetched through prioritized pass-through relays
//! - **Source matching**: catalog titles map to source-site identifiers, cached per session
//! - **Stream extraction**: the episode page's server map is isolated and strictly decoded
//! - **Validation**: placeholder and redirect URLs are dropped before playback
//! - **Coordination**: retries with exponential backoff, stale results are discarded
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use anistream::{AcceleratedClient, Config, EpisodeRequest, Outcome, ResolutionCoordinator, SourceCache};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let client = Arc::new(AcceleratedClient::new()?);
//!     let coordinator = ResolutionCoordinator::new(client, &config, SourceCache::new());
//!
//!     let request = EpisodeRequest::new("kitsu-11", "Naruto", 1);
//!     if let Outcome::Resolved(streams) = coordinator.resolve(request).await {
//!         println!("Playing {}", streams[0].url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod http_client;
pub mod playback;
pub mod relay;
pub mod resolve;
pub mod site;
pub mod stream;

pub use config::{Config, RelayConfig, RelayEndpoint, RetryConfig, ValidatorConfig};
pub use error::{ErrorKind, ResolutionError};
pub use fingerprint::{chrome_profile, firefox_profile, random_profile, BrowserProfile};
pub use http_client::{AcceleratedClient, PageFetcher};
pub use playback::{EpisodeCursor, PlaybackView};
pub use relay::ProxyRelay;
pub use resolve::{EpisodeRequest, Generation, Outcome, Phase, ResolutionCoordinator, ResolutionState, SourceCache};
pub use site::{AnimeDetails, SearchHit, SourceIdentifier, SourceMatcher};
pub use stream::{CandidateStream, StreamDescriptor, StreamExtractor, StreamValidator};

/// Version of anistream
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
