//! Stream entries before and after validation.

use serde::Serialize;

/// An unvalidated `(server, url)` pair read from an episode page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateStream {
    pub url: String,
    /// Server label as written on the page (e.g. `"SW"`, `"Okru"`).
    pub server: String,
    pub quality: Option<String>,
}

impl CandidateStream {
    pub fn new(server: impl Into<String>, url: impl Into<String>, quality: Option<String>) -> Self {
        Self {
            url: url.into(),
            server: server.into(),
            quality,
        }
    }
}

/// A validated, playback-ready stream. In a list, the first entry is the
/// default active stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    pub url: String,
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
}

impl StreamDescriptor {
    /// Label shown in a server picker, e.g. `"SW (HD)"`.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.quality {
            Some(quality) => format!("{} ({quality})", self.server),
            None => self.server.clone(),
        }
    }
}

impl From<StreamDescriptor> for CandidateStream {
    fn from(descriptor: StreamDescriptor) -> Self {
        Self {
            url: descriptor.url,
            server: descriptor.server,
            quality: descriptor.quality,
        }
    }
}
