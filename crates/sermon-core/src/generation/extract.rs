//! Pull a JSON object out of free-form model output
//!
//! Models sometimes wrap the answer in a fenced block or add a sentence
//! around it. Extraction tries, in order:
//!
//! 1. the text as-is
//! 2. the body of the first fenced block
//! 3. the outermost `{ ... }` span

use serde::de::DeserializeOwned;

use super::error::GenerationError;

/// Decode `raw` into `T`, tolerating fences and surrounding prose
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<T, GenerationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::Parse("response was empty".into()));
    }

    let mut last_error = match serde_json::from_str(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    for candidate in [strip_fences(trimmed), outermost_object(trimmed)]
        .into_iter()
        .flatten()
    {
        match serde_json::from_str(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = e,
        }
    }

    Err(GenerationError::Parse(last_error.to_string()))
}

/// Body of the first ``` fenced block, without its info string
pub fn strip_fences(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    // Skip an info string such as `json`
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let close = body.find("```").unwrap_or(body.len());
    let inner = body[..close].trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

/// Span from the first `{` to the last `}`
pub fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
