//! Episode page → candidate streams.
//!
//! Extraction runs in two stages so each failure mode shows up on its own:
//!
//! 1. [`isolate_expression`] finds the `var videos = …` assignment in a script
//!    and cuts out the balanced right-hand side, within a size bound.
//! 2. [`decode_server_map`] strictly decodes that text as a JSON object of
//!    server label → URL or list of URLs.

use scraper::Html;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{ResolutionError, Result};
use crate::site::layout::{self, VIDEOS_ASSIGNMENT};
use crate::stream::CandidateStream;

/// Longest right-hand side accepted by the isolation stage.
pub const MAX_EXPRESSION_BYTES: usize = 256 * 1024;

/// Stage 1: locate the server map assignment in one script body.
///
/// Returns `Ok(None)` when the script has no such assignment.
///
/// # Errors
///
/// `ParseFailed` when the assignment exists but its value does not start with
/// `{`/`[`, never closes, or exceeds [`MAX_EXPRESSION_BYTES`].
pub fn isolate_expression(script: &str) -> Result<Option<&str>> {
    let Some(assignment) = VIDEOS_ASSIGNMENT.find(script) else {
        return Ok(None);
    };

    let rest = &script[assignment.end()..];
    let (open, close) = match rest.chars().next() {
        Some('{') => ('{', '}'),
        Some('[') => ('[', ']'),
        _ => {
            return Err(ResolutionError::parse_failed(
                "video assignment is not followed by an object literal",
            ))
        }
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in rest.char_indices() {
        if i >= MAX_EXPRESSION_BYTES {
            return Err(ResolutionError::parse_failed(format!(
                "video assignment exceeds {MAX_EXPRESSION_BYTES} bytes"
            )));
        }
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(&rest[..=i]));
                }
            }
            _ => {}
        }
    }

    Err(ResolutionError::parse_failed("video assignment is never closed"))
}

/// Stage 2: decode an isolated expression into `(server, urls)` pairs in page order.
///
/// String values become a single URL; list values keep their string items.
/// Blank URLs, non-string list items and values of any other type are skipped.
///
/// # Errors
///
/// `ParseFailed` when the text is not a JSON object.
pub fn decode_server_map(expression: &str) -> Result<Vec<(String, Vec<String>)>> {
    let map: serde_json::Map<String, Value> = serde_json::from_str(expression)
        .map_err(|e| ResolutionError::parse_failed(format!("video map is not valid JSON: {e}")))?;

    let servers = map
        .into_iter()
        .map(|(server, value)| {
            let urls = match value {
                Value::String(url) => vec![url],
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(url) => Some(url),
                        _ => None,
                    })
                    .collect(),
                other => {
                    debug!(%server, kind = value_kind(&other), "Skipping unsupported server entry");
                    Vec::new()
                }
            };
            let urls = urls
                .into_iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect();
            (server, urls)
        })
        .collect();

    Ok(servers)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Turns episode page HTML into candidate streams.
#[derive(Debug, Clone)]
pub struct StreamExtractor {
    quality: Option<String>,
}

impl StreamExtractor {
    /// `quality` is attached to every candidate as its hint.
    pub fn new(quality: impl Into<String>) -> Self {
        let quality = quality.into();
        Self {
            quality: (!quality.is_empty()).then_some(quality),
        }
    }

    /// Scan every inline script of `page` and emit one candidate per
    /// `(server, url)` pair, in document order.
    ///
    /// # Errors
    ///
    /// `ParseFailed` when no script assigns the server map, or when every
    /// script that does fails isolation or decoding.
    #[instrument(skip_all, fields(bytes = page.len()))]
    pub fn extract(&self, page: &str) -> Result<Vec<CandidateStream>> {
        let document = Html::parse_document(page);
        let script_sel = layout::selector(layout::SCRIPT_BLOCK)?;

        let mut candidates = Vec::new();
        let mut decoded_blocks = 0usize;
        let mut last_error = None;

        for script in document.select(&script_sel) {
            if script.value().attr("src").is_some() {
                continue;
            }

            let content = script.text().collect::<String>();
            let decoded = isolate_expression(&content)
                .and_then(|expression| expression.map(decode_server_map).transpose());
            let servers = match decoded {
                Ok(Some(servers)) => servers,
                Ok(None) => continue,
                Err(e) => {
                    debug!(error = %e, "Matching script block did not decode");
                    last_error = Some(e);
                    continue;
                }
            };

            decoded_blocks += 1;
            for (server, urls) in servers {
                candidates.extend(
                    urls.into_iter()
                        .map(|url| CandidateStream::new(server.clone(), url, self.quality.clone())),
                );
            }
        }

        if decoded_blocks == 0 {
            return Err(last_error.unwrap_or_else(|| {
                ResolutionError::parse_failed("no script block assigns the video server map")
            }));
        }

        debug!(candidates = candidates.len(), "Extracted candidate streams");
        Ok(candidates)
    }
}

impl Default for StreamExtractor {
    fn default() -> Self {
        Self::new("HD")
    }
}
