//! Per-episode stream resolution.
//!
//! [`ResolutionCoordinator`] drives matcher → relay → extractor → validator
//! for one `(anime, episode)` at a time. It owns the session's identifier
//! cache, retries transient failures with exponential backoff, and discards
//! every result that arrives for a superseded request.

pub mod cache;
pub mod coordinator;
pub mod state;

pub use cache::SourceCache;
pub use coordinator::{Outcome, ResolutionCoordinator};
pub use state::{EpisodeRequest, Generation, Phase, ResolutionRequest, ResolutionState};
