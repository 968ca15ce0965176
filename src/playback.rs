//! Episode navigation and the read model handed to a player.

use serde::Serialize;

use crate::resolve::{Phase, ResolutionState};
use crate::stream::StreamDescriptor;

/// Position inside a series of `count` episodes, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeCursor {
    number: u32,
    count: u32,
}

impl EpisodeCursor {
    /// `None` unless `1 <= number <= count`.
    #[must_use]
    pub fn new(number: u32, count: u32) -> Option<Self> {
        (number >= 1 && number <= count).then_some(Self { number, count })
    }

    /// Cursor for the episode a coordinator snapshot is about. The series
    /// length is `count` when given, else the matched listing's episode count,
    /// and never less than the episode itself.
    #[must_use]
    pub fn from_state(state: &ResolutionState, count: Option<u32>) -> Option<Self> {
        let number = state.request.as_ref()?.episode;
        let count = count
            .or_else(|| state.source.as_ref().map(|hit| hit.episodes))
            .unwrap_or(number)
            .max(number);
        Self::new(number, count)
    }

    #[must_use]
    pub fn number(self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn count(self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.number.checked_add(1).and_then(|n| Self::new(n, self.count))
    }

    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.number.checked_sub(1).and_then(|n| Self::new(n, self.count))
    }
}

/// What the playback surface renders for a resolved episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackView {
    pub streams: Vec<StreamDescriptor>,
    pub active: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub next_episode: Option<u32>,
    pub previous_episode: Option<u32>,
}

impl PlaybackView {
    /// Build a view from a coordinator snapshot. Only resolved states with
    /// at least one stream produce a view.
    #[must_use]
    pub fn from_state(state: &ResolutionState, cursor: EpisodeCursor, poster: Option<String>) -> Option<Self> {
        if state.phase != Phase::Resolved || state.streams.is_empty() {
            return None;
        }

        Some(Self {
            streams: state.streams.clone(),
            active: state.active.min(state.streams.len() - 1),
            poster: poster.filter(|p| !p.is_empty()),
            next_episode: cursor.next().map(EpisodeCursor::number),
            previous_episode: cursor.previous().map(EpisodeCursor::number),
        })
    }

    #[must_use]
    pub fn active_stream(&self) -> Option<&StreamDescriptor> {
        self.streams.get(self.active)
    }
}
