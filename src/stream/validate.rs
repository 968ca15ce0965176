//! Syntactic filtering of candidate stream URLs.
//!
//! Nothing here touches the network: a URL is trusted when it has a web
//! scheme (or is protocol-relative), is long enough to be real, and carries
//! none of the known placeholder or redirect markers.

use tracing::debug;

use crate::config::ValidatorConfig;
use crate::site::layout::https_if_protocol_relative;
use crate::stream::{CandidateStream, StreamDescriptor};

const ACCEPTED_PREFIXES: &[&str] = &["http://", "https://", "//"];

/// Filters candidates into playable descriptors.
#[derive(Debug, Clone)]
pub struct StreamValidator {
    min_url_length: usize,
    denylist: Vec<String>,
}

impl StreamValidator {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            min_url_length: config.min_url_length,
            denylist: config.denylist.clone(),
        }
    }

    /// Whether `url` passes every heuristic.
    #[must_use]
    pub fn accepts(&self, url: &str) -> bool {
        let lower = url.to_ascii_lowercase();
        ACCEPTED_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
            && url.len() > self.min_url_length
            && !self.denylist.iter().any(|pattern| url.contains(pattern.as_str()))
    }

    /// Keep the accepted candidates, in order, with protocol-relative URLs
    /// rewritten to `https:`. An empty result is a valid outcome.
    pub fn validate(&self, candidates: impl IntoIterator<Item = CandidateStream>) -> Vec<StreamDescriptor> {
        candidates
            .into_iter()
            .filter(|candidate| {
                let accepted = self.accepts(&candidate.url);
                if !accepted {
                    debug!(server = %candidate.server, url = %candidate.url, "Rejected candidate stream");
                }
                accepted
            })
            .map(|candidate| StreamDescriptor {
                url: https_if_protocol_relative(&candidate.url),
                server: candidate.server,
                quality: candidate.quality,
            })
            .collect()
    }
}

impl Default for StreamValidator {
    fn default() -> Self {
        Self::new(&ValidatorConfig::default())
    }
}
