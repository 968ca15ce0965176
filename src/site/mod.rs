//! Source-site lookups.
//!
//! Everything that depends on the source site's HTML lives under this module:
//!
//! - [`layout`]: selectors, script markers and URL builders
//! - [`SourceMatcher`]: title search and anime details through the relay chain
//! - [`details`]: details page parsing

pub mod details;
pub mod layout;
pub mod matcher;

use std::fmt;

use serde::Serialize;

pub use details::{AnimeDetails, EpisodeEntry};
pub use layout::SiteLayout;
pub use matcher::{SearchHit, SourceMatcher};

/// Opaque key of a title on the source site (the last path segment of its
/// canonical link, e.g. `one-piece-tv`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SourceIdentifier(String);

impl SourceIdentifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier from a listing link such as `/anime/one-piece-tv`.
    ///
    /// Query strings and fragments are ignored. Returns `None` when no
    /// non-empty path segment remains.
    #[must_use]
    pub fn from_link(href: &str) -> Option<Self> {
        let path = href.split(['?', '#']).next().unwrap_or(href);
        path.split('/')
            .rfind(|segment| !segment.is_empty())
            .filter(|segment| !segment.contains(':'))
            .map(Self::new)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
