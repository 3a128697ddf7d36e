//! # Choice Marker Parsing
//!
//! Story replies may end with a marker such as `[CHOICE: Open the door | Run away]`.
//! This module is the only place that knows the marker grammar, so it can be
//! replaced with structured model output without touching callers.

use crate::errors::SparkyError;
use regex::Regex;
use std::sync::LazyLock;

/// The literal marker grammar: `[CHOICE: A | B | ...]`.
const CHOICE_MARKER_PATTERN: &str = r"\[CHOICE:\s*(.*?)\s*\]";

static CHOICE_MARKER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(CHOICE_MARKER_PATTERN));

/// A model reply split into its visible text and the offered choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub answer: String,
    pub choices: Option<Vec<String>>,
}

/// Extracts the first choice marker from a reply.
///
/// When a marker is found, every occurrence of that exact marker text is removed,
/// the rest is trimmed, and the pipe-separated payload becomes the ordered list of
/// choices. A reply without a marker is returned untouched.
pub fn parse_reply(reply: &str) -> Result<ParsedReply, SparkyError> {
    let re = CHOICE_MARKER.as_ref().map_err(|e| SparkyError::Regex(e.clone()))?;

    let Some(caps) = re.captures(reply) else {
        return Ok(ParsedReply {
            answer: reply.to_string(),
            choices: None,
        });
    };

    // Group 0 always exists for a successful capture.
    let marker = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
    let payload = caps.get(1).map(|m| m.as_str()).unwrap_or_default();

    let answer = reply.replace(marker, "").trim().to_string();
    let choices = payload.split('|').map(|c| c.trim().to_string()).collect();

    Ok(ParsedReply {
        answer,
        choices: Some(choices),
    })
}
