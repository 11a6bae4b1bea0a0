//! Outline generation
//!
//! ## Architecture
//!
//! - **CompletionBackend**: prompt in, raw model text out
//! - **OutlineGenerator**: builds prompts, extracts JSON from the answer and
//!   validates it into typed outlines
//!
//! A generated outline is normalized before it is handed out, so point numbers
//! always match their position.

pub mod client;
pub mod error;
pub mod extract;
pub mod prompt;

use tracing::{debug, info, warn};

pub use client::{CompletionBackend, GeminiBackend};
pub use error::{GenerationError, GenerationResult};

use crate::config::DEFAULT_MAX_SUPPORTING_CHARS;
use crate::models::{PresentationOutline, SermonOutline};
use extract::extract_json;
use prompt::{outline_prompt, presentation_prompt, truncate_chars};

/// Generation façade over a [`CompletionBackend`]
pub struct OutlineGenerator<B> {
    backend: B,
    max_supporting_chars: usize,
}

impl<B: CompletionBackend> OutlineGenerator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            max_supporting_chars: DEFAULT_MAX_SUPPORTING_CHARS,
        }
    }

    /// Limit on supporting text sent with the outline request
    pub fn with_max_supporting_chars(mut self, max_chars: usize) -> Self {
        self.max_supporting_chars = max_chars;
        self
    }

    /// Generate an outline for `passage`
    pub async fn generate_outline(
        &self,
        passage: &str,
        supporting_text: Option<&str>,
    ) -> GenerationResult<SermonOutline> {
        let supporting = supporting_text.map(|text| {
            let cut = truncate_chars(text, self.max_supporting_chars);
            if cut.len() < text.len() {
                debug!(
                    "Supporting text truncated to {} characters",
                    self.max_supporting_chars
                );
            }
            cut
        });

        info!("Generating outline for {}", passage);
        let raw = self
            .backend
            .complete(&outline_prompt(passage, supporting))
            .await?;
        let outline = validated(extract_json::<SermonOutline>(&raw)?);
        info!(
            "Outline generated with {} development points",
            outline.development.len()
        );
        Ok(outline)
    }

    /// Rewrite `outline` into short lines for presentation mode
    pub async fn generate_presentation(
        &self,
        outline: &SermonOutline,
    ) -> GenerationResult<PresentationOutline> {
        let prompt =
            presentation_prompt(outline).map_err(|e| GenerationError::Parse(e.to_string()))?;
        info!("Generating presentation data for \"{}\"", outline.title);
        let raw = self.backend.complete(&prompt).await?;
        let rewritten = validated(extract_json::<SermonOutline>(&raw)?);
        Ok(PresentationOutline::new(rewritten))
    }
}

fn validated(mut outline: SermonOutline) -> SermonOutline {
    outline.normalize();
    let unbalanced = outline.unbalanced_fields();
    if !unbalanced.is_empty() {
        warn!(
            "Unbalanced emphasis in {} field(s): {}",
            unbalanced.len(),
            unbalanced.join(", ")
        );
    }
    if !(2..=4).contains(&outline.development.len()) {
        warn!(
            "Outline has {} development points, expected 2 to 4",
            outline.development.len()
        );
    }
    outline
}
