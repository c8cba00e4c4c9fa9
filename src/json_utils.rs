//! JSON utilities for timing feed bodies
//!
//! Some providers serve their JSON wrapped in a callback invocation
//! (`jsonCallback({...});`) so the endpoint can be consumed as a script.
//! This module strips that wrapper and decodes the remainder.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

use crate::{LapFeedError, Result};

// Greedy so the match runs to the LAST closing paren, not an inner one.
static CALLBACK_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\((.*)\)").expect("callback pattern is valid"));

/// Strip a callback wrapper and return the JSON text between the first `(`
/// and the last `)`.
pub fn unwrap_callback(text: &str) -> Result<&str> {
    CALLBACK_BODY
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
        .ok_or_else(|| {
            LapFeedError::parse_error("callback unwrapping", "no wrapping parentheses found")
        })
}

/// Decode JSON text into `T`, reporting failures as parse errors.
pub fn decode<T: DeserializeOwned>(context: &str, json: &str) -> Result<T> {
    if json.trim().is_empty() {
        return Err(LapFeedError::parse_error(context, "body is empty"));
    }
    serde_json::from_str(json).map_err(|e| LapFeedError::parse_error(context, e.to_string()))
}
