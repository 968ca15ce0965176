//! Title → source identifier lookup.
//!
//! The matcher runs the site's own text search and trusts the first listing
//! entry. There is no similarity scoring: catalog titles arrive normalized,
//! and an ambiguous sequel title may match the wrong entry.

use std::sync::Arc;

use scraper::Html;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{ResolutionError, Result};
use crate::http_client::PageFetcher;
use crate::relay::ProxyRelay;
use crate::site::details::{parse_details, AnimeDetails};
use crate::site::layout::{self, SiteLayout};
use crate::site::SourceIdentifier;

/// Episode count assumed when the listing does not show one.
const DEFAULT_EPISODE_COUNT: u32 = 12;

/// First entry of a search listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: SourceIdentifier,
    pub title: String,
    pub kind: String,
    pub cover: String,
    pub episodes: u32,
}

/// Resolves display titles to [`SourceIdentifier`]s through the relay chain.
pub struct SourceMatcher<F> {
    relay: Arc<ProxyRelay<F>>,
    layout: SiteLayout,
}

impl<F: PageFetcher> SourceMatcher<F> {
    pub fn new(relay: Arc<ProxyRelay<F>>, layout: SiteLayout) -> Self {
        Self { relay, layout }
    }

    /// Search the site and return its first listing entry.
    ///
    /// # Errors
    ///
    /// `NotFound` for a blank title, an empty listing, or a first entry
    /// without a usable link; `FetchFailed` when no relay delivers the page.
    #[instrument(skip(self))]
    pub async fn search(&self, title: &str) -> Result<SearchHit> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ResolutionError::not_found("title is required for search"));
        }

        let html = self.relay.fetch(&self.layout.search_url(title)).await?;
        let hit = parse_first_listing(&html)?;
        info!(id = %hit.id, matched = %hit.title, "Matched source title");
        Ok(hit)
    }

    /// Identifier of the first listing entry for `title`.
    pub async fn resolve(&self, title: &str) -> Result<SourceIdentifier> {
        self.search(title).await.map(|hit| hit.id)
    }

    /// Fetch and parse the anime's details page.
    ///
    /// # Errors
    ///
    /// `FetchFailed` from the relay chain, `ParseFailed` when the page has no title.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn details(&self, id: &SourceIdentifier) -> Result<AnimeDetails> {
        let html = self.relay.fetch(&self.layout.details_url(id)).await?;
        parse_details(id, &html)
    }
}

/// Parse the first `article` of a search listing page.
pub fn parse_first_listing(html: &str) -> Result<SearchHit> {
    let document = Html::parse_document(html);
    let entry_sel = layout::selector(layout::LISTING_ENTRY)?;
    let link_sel = layout::selector(layout::LISTING_LINK)?;
    let title_sel = layout::selector(layout::LISTING_TITLE)?;
    let type_sel = layout::selector(layout::LISTING_TYPE)?;
    let episodes_sel = layout::selector(layout::LISTING_EPISODES)?;
    let cover_sel = layout::selector(layout::LISTING_COVER)?;

    let Some(entry) = document.select(&entry_sel).next() else {
        debug!("Search listing is empty");
        return Err(ResolutionError::not_found("search listing is empty"));
    };

    let id = layout::first_attr(entry, &link_sel, "href")
        .and_then(SourceIdentifier::from_link)
        .ok_or_else(|| ResolutionError::not_found("first listing entry has no anime link"))?;

    let episodes = layout::leading_number(&layout::first_text(entry, &episodes_sel))
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_EPISODE_COUNT);

    Ok(SearchHit {
        id,
        title: layout::first_text(entry, &title_sel),
        kind: layout::first_text(entry, &type_sel),
        cover: layout::first_attr(entry, &cover_sel, "src")
            .map(layout::https_if_protocol_relative)
            .unwrap_or_default(),
        episodes,
    })
}
