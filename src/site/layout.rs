//! Markup and URL contract of the source site.
//!
//! The site has no API and its markup is not versioned. Every selector,
//! marker and URL shape the crate depends on lives here, so a layout change
//! on the site is a one-file fix.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::error::{ResolutionError, Result};
use crate::site::SourceIdentifier;

// Search listing
pub const LISTING_ENTRY: &str = ".ListAnimes article";
pub const LISTING_LINK: &str = "a[href]";
pub const LISTING_TITLE: &str = ".Title";
pub const LISTING_TYPE: &str = ".Type";
pub const LISTING_EPISODES: &str = ".Episode";
pub const LISTING_COVER: &str = "img[src]";

// Anime details page
pub const DETAILS_TITLE: &str = ".AnimeName";
pub const DETAILS_SYNOPSIS: &str = ".Description p";
pub const DETAILS_COVER: &str = ".AnimeCover img";
pub const DETAILS_TYPE: &str = ".Type";
pub const DETAILS_STATUS: &str = ".Status";
pub const DETAILS_GENRES: &str = ".Nvgnrs a";
pub const DETAILS_EPISODES: &str = ".Episodes li";
pub const DETAILS_EPISODE_NUMBER: &str = ".Num";
pub const DETAILS_EPISODE_TITLE: &str = ".Title";

// Episode page
pub const SCRIPT_BLOCK: &str = "script";

/// Left-hand side of the script assignment holding the server → URL(s) map.
/// Matches up to and including the `=` and any whitespace after it.
pub static VIDEOS_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+videos\s*=\s*").expect("valid assignment pattern"));

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)").expect("valid number pattern"));

/// Builds site URLs from a configured base.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    base_url: String,
}

impl SiteLayout {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/browse?q={title}`
    #[must_use]
    pub fn search_url(&self, title: &str) -> String {
        format!("{}/browse?q={}", self.base_url, urlencoding::encode(title))
    }

    /// `{base}/ver/{id}-{episode}`
    #[must_use]
    pub fn episode_url(&self, id: &SourceIdentifier, episode: u32) -> String {
        format!("{}/ver/{}-{episode}", self.base_url, id.as_str())
    }

    /// `{base}/anime/{id}`
    #[must_use]
    pub fn details_url(&self, id: &SourceIdentifier) -> String {
        format!("{}/anime/{}", self.base_url, id.as_str())
    }
}

/// Compile one of the selectors above.
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ResolutionError::parse_failed(format!("selector {css}: {e:?}")))
}

/// Trimmed text of the first descendant matching `sel`, empty when absent.
pub(crate) fn first_text(element: ElementRef<'_>, sel: &Selector) -> String {
    element
        .select(sel)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Attribute of the first descendant matching `sel`.
pub(crate) fn first_attr<'a>(element: ElementRef<'a>, sel: &Selector, attr: &str) -> Option<&'a str> {
    element.select(sel).next().and_then(|e| e.value().attr(attr))
}

/// Leading integer of a text node ("12 Episodios" → 12).
pub(crate) fn leading_number(text: &str) -> Option<u32> {
    LEADING_NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Protocol-relative `//host/path` becomes `https://host/path`.
#[must_use]
pub fn https_if_protocol_relative(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SiteLayout {
        SiteLayout::new("https://site.test/")
    }

    #[test]
    fn search_url_encodes_title() {
        assert_eq!(
            layout().search_url("Shingeki no Kyojin: Final"),
            "https://site.test/browse?q=Shingeki%20no%20Kyojin%3A%20Final"
        );
    }

    #[test]
    fn episode_url_joins_id_and_number() {
        let id = SourceIdentifier::new("one-piece-tv");
        assert_eq!(layout().episode_url(&id, 1071), "https://site.test/ver/one-piece-tv-1071");
    }

    #[test]
    fn details_url_uses_anime_path() {
        let id = SourceIdentifier::new("naruto");
        assert_eq!(layout().details_url(&id), "https://site.test/anime/naruto");
    }

    #[test]
    fn assignment_pattern_tolerates_spacing() {
        assert!(VIDEOS_ASSIGNMENT.is_match("var videos = {}"));
        assert!(VIDEOS_ASSIGNMENT.is_match("var  videos={}"));
        assert!(!VIDEOS_ASSIGNMENT.is_match("var episodes = []"));
    }

    #[test]
    fn leading_number_parses_prefix_only() {
        assert_eq!(leading_number(" 24 Episodios"), Some(24));
        assert_eq!(leading_number("Episodio 3"), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn protocol_relative_becomes_https() {
        assert_eq!(https_if_protocol_relative("//cdn.test/a.jpg"), "https://cdn.test/a.jpg");
        assert_eq!(https_if_protocol_relative("http://cdn.test/a.jpg"), "http://cdn.test/a.jpg");
    }
}
