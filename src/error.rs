//! Resolution error taxonomy.
//!
//! Every failure in the pipeline surfaces as a [`ResolutionError`] tagged with
//! an [`ErrorKind`]. The kind decides whether the coordinator retries on its
//! own or waits for the user.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Failure category of a resolution stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The source site has no listing for the title.
    NotFound,
    /// Every relay failed, timed out or returned an empty body.
    FetchFailed,
    /// The page was fetched but the expected structure is missing or malformed.
    ParseFailed,
    /// Candidates were extracted but none survived validation.
    NoValidStreams,
}

impl ErrorKind {
    /// Transient kinds are retried automatically; the rest need user action.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::FetchFailed | Self::ParseFailed)
    }

    /// Message shown on the playback surface.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::NotFound => "No streaming sources found for this anime",
            Self::FetchFailed => "Unable to reach the streaming source, please retry",
            Self::ParseFailed => "The episode page could not be read, please retry",
            Self::NoValidStreams => "No playable streams are available for this episode",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::FetchFailed => "fetch failed",
            Self::ParseFailed => "parse failed",
            Self::NoValidStreams => "no valid streams",
        };
        f.write_str(name)
    }
}

/// A typed failure from any resolution stage.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct ResolutionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ResolutionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FetchFailed, message)
    }

    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }

    pub fn no_valid_streams(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoValidStreams, message)
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

pub type Result<T> = std::result::Result<T, ResolutionError>;
