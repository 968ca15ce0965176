//! Observable resolution state.

use std::fmt;

use serde::Serialize;

use crate::error::ResolutionError;
use crate::site::{SearchHit, SourceIdentifier};
use crate::stream::StreamDescriptor;

/// Token identifying one navigation. Bumped on every new request; anything
/// carrying an older token is stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the playback surface asks for: an episode of a catalog title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EpisodeRequest {
    /// Catalog id of the anime.
    pub anime_id: String,
    /// Canonical catalog title, used to search the source site.
    pub title: String,
    pub episode: u32,
}

impl EpisodeRequest {
    pub fn new(anime_id: impl Into<String>, title: impl Into<String>, episode: u32) -> Self {
        Self {
            anime_id: anime_id.into(),
            title: title.into(),
            episode,
        }
    }
}

/// One in-flight page resolution once the source identifier is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub source: SourceIdentifier,
    pub episode: u32,
    pub generation: Generation,
}

/// Pipeline stage of the current request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    MatchingSource,
    FetchingPage,
    Extracting,
    Validating,
    Resolved,
    Failed,
}

impl Phase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Failed)
    }
}

/// Snapshot published to subscribers after every accepted mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionState {
    pub generation: Generation,
    pub request: Option<EpisodeRequest>,
    /// Listing entry matched for this request. Left empty when the source
    /// identifier came from the cache.
    pub source: Option<SearchHit>,
    pub phase: Phase,
    /// Zero-based attempt number within the current request.
    pub attempt: u32,
    /// Non-empty exactly when `phase` is `Resolved`.
    pub streams: Vec<StreamDescriptor>,
    /// Index into `streams` of the stream being played.
    pub active: usize,
    /// Last failure: terminal when `phase` is `Failed`, otherwise the cause
    /// of a pending retry.
    pub error: Option<ResolutionError>,
}

impl ResolutionState {
    #[must_use]
    pub fn active_stream(&self) -> Option<&StreamDescriptor> {
        self.streams.get(self.active)
    }
}
