//! Resolution state machine.
//!
//! `Idle → MatchingSource → FetchingPage → Extracting → Validating →
//! Resolved | Failed`. Every state change goes through [`commit`], which
//! drops the change when the caller's generation is no longer current.
//!
//! [`commit`]: ResolutionCoordinator::commit

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::config::{Config, RetryConfig};
use crate::error::ResolutionError;
use crate::http_client::PageFetcher;
use crate::relay::ProxyRelay;
use crate::resolve::cache::SourceCache;
use crate::resolve::state::{EpisodeRequest, Generation, Phase, ResolutionRequest, ResolutionState};
use crate::site::{SiteLayout, SourceIdentifier, SourceMatcher};
use crate::stream::{StreamDescriptor, StreamExtractor, StreamValidator};

/// Result of one call to [`ResolutionCoordinator::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Non-empty, ordered streams; the first is the default.
    Resolved(Vec<StreamDescriptor>),
    /// Terminal failure after any automatic retries.
    Failed(ResolutionError),
    /// A newer navigation took over; nothing was published.
    Superseded,
}

/// Orchestrates matcher → relay → extractor → validator per episode.
pub struct ResolutionCoordinator<F> {
    matcher: SourceMatcher<F>,
    relay: Arc<ProxyRelay<F>>,
    layout: SiteLayout,
    extractor: StreamExtractor,
    validator: StreamValidator,
    cache: SourceCache,
    retry: RetryConfig,
    state: watch::Sender<ResolutionState>,
}

impl<F: PageFetcher> ResolutionCoordinator<F> {
    /// Build a coordinator around `fetcher`. `cache` is the session's
    /// identifier store; pass a clone to share it between coordinators.
    pub fn new(fetcher: Arc<F>, config: &Config, cache: SourceCache) -> Self {
        let relay = Arc::new(ProxyRelay::new(fetcher, &config.relay));
        let layout = SiteLayout::new(config.base_url.clone());
        let (state, _) = watch::channel(ResolutionState::default());

        Self {
            matcher: SourceMatcher::new(relay.clone(), layout.clone()),
            relay,
            layout,
            extractor: StreamExtractor::new(config.default_quality.clone()),
            validator: StreamValidator::new(&config.validator),
            cache,
            retry: config.retry.clone(),
            state,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Receiver that sees every accepted state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ResolutionState> {
        self.state.subscribe()
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> ResolutionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.state.borrow().generation == generation
    }

    /// Point the coordinator at a new episode. Any request still in flight
    /// becomes stale immediately.
    pub fn navigate(&self, request: EpisodeRequest) -> Generation {
        let mut generation = Generation::default();
        self.state.send_modify(|state| {
            generation = state.generation.next();
            *state = ResolutionState {
                generation,
                request: Some(request),
                ..ResolutionState::default()
            };
        });
        debug!(%generation, "Navigated");
        generation
    }

    /// Navigate to `request` and resolve it.
    pub async fn resolve(&self, request: EpisodeRequest) -> Outcome {
        let generation = self.navigate(request.clone());
        self.run(request, generation).await
    }

    /// Re-run the current episode under a fresh generation. A cached source
    /// identifier is reused, so this starts at `FetchingPage`.
    ///
    /// Returns `None` when nothing has been requested yet.
    pub async fn retry(&self) -> Option<Outcome> {
        let request = self.state.borrow().request.clone()?;
        info!(anime_id = %request.anime_id, episode = request.episode, "Manual retry");
        Some(self.resolve(request).await)
    }

    /// Switch the active stream of a resolved episode. Resolution is not
    /// re-run and the attempt counter is left alone.
    ///
    /// Returns `false` when nothing is resolved or `index` is out of range.
    pub fn select_stream(&self, index: usize) -> bool {
        let mut accepted = false;
        self.state.send_if_modified(|state| {
            accepted = state.phase == Phase::Resolved && index < state.streams.len();
            if accepted && state.active != index {
                state.active = index;
                true
            } else {
                false
            }
        });
        accepted
    }

    /// Apply `update` only if `generation` is still current.
    fn commit(&self, generation: Generation, update: impl FnOnce(&mut ResolutionState)) -> bool {
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            update(state);
            true
        })
    }

    fn enter(&self, generation: Generation, phase: Phase) -> bool {
        let entered = self.commit(generation, |state| state.phase = phase);
        if entered {
            debug!(%generation, ?phase, "Entered phase");
        }
        entered
    }

    #[instrument(skip_all, fields(anime_id = %request.anime_id, episode = request.episode, %generation))]
    async fn run(&self, request: EpisodeRequest, generation: Generation) -> Outcome {
        if request.episode == 0 {
            return self.finish_failed(generation, ResolutionError::not_found("episode numbers start at 1"));
        }

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            if !self.commit(generation, |state| state.attempt = attempt) {
                return Outcome::Superseded;
            }

            match self.attempt(&request, generation).await {
                Outcome::Resolved(streams) => return self.finish_resolved(generation, streams),
                Outcome::Failed(err) if err.is_retryable() && attempt + 1 < max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(attempt = attempt + 1, max_attempts, ?delay, error = %err, "Resolution failed, retrying");
                    if !self.commit(generation, |state| state.error = Some(err)) {
                        return Outcome::Superseded;
                    }

                    tokio::time::sleep(delay).await;
                    if !self.is_current(generation) {
                        debug!("Backoff elapsed for a superseded request");
                        return Outcome::Superseded;
                    }
                    attempt += 1;
                }
                Outcome::Failed(err) => return self.finish_failed(generation, err),
                Outcome::Superseded => {
                    debug!("Discarded result of a superseded request");
                    return Outcome::Superseded;
                }
            }
        }
    }

    /// One pass through the pipeline.
    async fn attempt(&self, request: &EpisodeRequest, generation: Generation) -> Outcome {
        let source = match self.cache.get(&request.title).await {
            Some(id) => id,
            None => match self.match_source(request, generation).await {
                Ok(Some(id)) => id,
                Ok(None) => return Outcome::Superseded,
                Err(err) => return Outcome::Failed(err),
            },
        };

        let page_request = ResolutionRequest {
            source,
            episode: request.episode,
            generation,
        };

        if !self.enter(generation, Phase::FetchingPage) {
            return Outcome::Superseded;
        }
        let url = self.layout.episode_url(&page_request.source, page_request.episode);
        let page = self.relay.fetch(&url).await;
        if !self.is_current(page_request.generation) {
            return Outcome::Superseded;
        }
        let page = match page {
            Ok(page) => page,
            Err(err) => return Outcome::Failed(err),
        };

        if !self.enter(generation, Phase::Extracting) {
            return Outcome::Superseded;
        }
        let candidates = match self.extractor.extract(&page) {
            Ok(candidates) => candidates,
            Err(err) => return Outcome::Failed(err),
        };
        drop(page);

        if !self.enter(generation, Phase::Validating) {
            return Outcome::Superseded;
        }
        let total = candidates.len();
        let streams = self.validator.validate(candidates);
        if streams.is_empty() {
            return Outcome::Failed(ResolutionError::no_valid_streams(format!(
                "all {total} candidate streams were rejected"
            )));
        }

        Outcome::Resolved(streams)
    }

    /// Search for the title, cache its identifier and publish the matched
    /// listing entry. `Ok(None)` means the request went stale on the way.
    async fn match_source(
        &self,
        request: &EpisodeRequest,
        generation: Generation,
    ) -> Result<Option<SourceIdentifier>, ResolutionError> {
        if !self.enter(generation, Phase::MatchingSource) {
            return Ok(None);
        }

        let matched = self.matcher.search(&request.title).await;
        if !self.is_current(generation) {
            return Ok(None);
        }

        let hit = matched?;
        let cached = self
            .cache
            .insert_if(&request.title, hit.id.clone(), || self.is_current(generation))
            .await;
        let Some(id) = cached else {
            return Ok(None);
        };

        if !self.commit(generation, |state| state.source = Some(hit)) {
            return Ok(None);
        }
        Ok(Some(id))
    }

    fn finish_resolved(&self, generation: Generation, streams: Vec<StreamDescriptor>) -> Outcome {
        let published = streams.clone();
        let committed = self.commit(generation, |state| {
            state.phase = Phase::Resolved;
            state.streams = published;
            state.active = 0;
            state.error = None;
        });

        if committed {
            info!(streams = streams.len(), "Resolved episode streams");
            Outcome::Resolved(streams)
        } else {
            Outcome::Superseded
        }
    }

    fn finish_failed(&self, generation: Generation, err: ResolutionError) -> Outcome {
        let published = err.clone();
        let committed = self.commit(generation, |state| {
            state.phase = Phase::Failed;
            state.streams.clear();
            state.error = Some(published);
        });

        if committed {
            warn!(error = %err, "Resolution failed");
            Outcome::Failed(err)
        } else {
            Outcome::Superseded
        }
    }
}
