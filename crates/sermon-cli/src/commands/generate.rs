//! Generate command handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use sermon_core::{extract_text, Config, Draft};

use super::{open_generator, open_repository, with_hint};
use crate::output::Output;

pub struct GenerateOptions {
    pub supporting: Option<PathBuf>,
    pub save: bool,
    pub prepare: bool,
}

/// Generate an outline, optionally preparing and saving it
pub async fn generate(
    config: &Config,
    passage: String,
    options: GenerateOptions,
    output: &Output,
) -> Result<()> {
    let supporting = options
        .supporting
        .as_deref()
        .map(|path| {
            extract_text(path)
                .with_context(|| format!("Failed to read supporting document {:?}", path))
        })
        .transpose()?;

    let generator = open_generator(config)?;
    // Check the repository before spending a generation call on an unsaveable result
    let mut repo = if options.save {
        Some(open_repository(config).await?)
    } else {
        None
    };

    if !output.is_quiet() && !output.is_json() {
        eprintln!("Generating outline for {}...", passage);
    }
    let outline = generator
        .generate_outline(&passage, supporting.as_deref())
        .await
        .map_err(with_hint)
        .context("Failed to generate outline")?;

    let mut draft = Draft::new(passage, outline);

    if options.prepare {
        if let Some(ticket) = draft.begin_presentation() {
            match generator.generate_presentation(draft.outline()).await {
                Ok(presentation) => {
                    draft.complete_presentation(ticket, presentation);
                }
                Err(e) => {
                    draft.abandon_presentation(ticket);
                    // The outline is still worth saving without presentation data
                    output.message(&format!(
                        "Presentation data not generated: {}. Run `sermon prepare` later.",
                        e
                    ));
                }
            }
        }
    }

    match repo.as_mut() {
        Some(repo) => {
            let saved = draft.to_saved();
            let id = saved.id;
            repo.save_sermon(saved)
                .await
                .map_err(with_hint)
                .context("Failed to save sermon")?;
            info!("Generated and saved sermon {}", id);

            if let Some(saved) = repo.get(id) {
                output.print_sermon(saved, false);
            }
            if !output.is_json() {
                output.success(&format!("Saved sermon {}", id));
            }
        }
        None => output.print_outline(draft.passage(), draft.outline()),
    }

    Ok(())
}
