//! Saved sermon command handlers

use std::time::Instant;

use anyhow::{bail, Context, Result};

use sermon_core::timer::build_sections;
use sermon_core::{Config, Draft, FieldPath, HttpCollection, SavedSermon, SermonRepository};

use super::{open_generator, open_repository, with_hint};
use crate::output::Output;

/// Look up a sermon in the fetched snapshot
fn find(repo: &SermonRepository<HttpCollection>, id: i64) -> Result<SavedSermon> {
    repo.get(id)
        .cloned()
        .with_context(|| format!("Sermon not found: {}. Run `sermon list` to see IDs.", id))
}

/// List saved sermons
pub async fn list(config: &Config, output: &Output) -> Result<()> {
    let repo = open_repository(config).await?;
    output.print_sermons(repo.sermons());
    Ok(())
}

/// Show a single sermon
pub async fn show(config: &Config, id: i64, presentation: bool, output: &Output) -> Result<()> {
    let repo = open_repository(config).await?;
    let sermon = find(&repo, id)?;
    output.print_sermon(&sermon, presentation);
    Ok(())
}

/// Replace one text field
///
/// Presentation data is cleared because it no longer matches the outline.
pub async fn edit(config: &Config, id: i64, path: &str, value: &str, output: &Output) -> Result<()> {
    let mut repo = open_repository(config).await?;
    let mut draft = Draft::from_saved(find(&repo, id)?);

    let field = FieldPath::parse(draft.outline(), path).with_context(|| {
        format!(
            "Invalid field path '{}'. Run `sermon fields {}` to list valid paths.",
            path, id
        )
    })?;
    let previous = field.get(draft.outline()).unwrap_or_default().to_string();
    let had_presentation = draft.presentation().is_some();

    let value = value.replace("\\n", "\n");
    draft.apply_edit(field, value.as_str(), Instant::now())?;

    repo.replace_sermon(draft.to_saved())
        .await
        .map_err(with_hint)
        .context("Failed to save sermon")?;

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "id": id,
                "path": field.to_string(),
                "previous": previous,
                "value": value,
            })
        );
    } else {
        output.message(&format!("  was: {}", previous));
        output.success(&format!("Updated {} on sermon {}", field, id));
        if had_presentation {
            output.message(&format!(
                "Presentation data cleared. Run `sermon prepare {}` to refresh it.",
                id
            ));
        }
    }
    Ok(())
}

/// List editable field paths
pub async fn fields(config: &Config, id: i64, output: &Output) -> Result<()> {
    let repo = open_repository(config).await?;
    let sermon = find(&repo, id)?;
    output.print_fields(&sermon.data);
    Ok(())
}

/// Delete a sermon
pub async fn delete(config: &Config, id: i64, output: &Output) -> Result<()> {
    let mut repo = open_repository(config).await?;
    let sermon = find(&repo, id)?;

    repo.delete_sermon(id)
        .await
        .map_err(with_hint)
        .context("Failed to delete sermon")?;

    output.success(&format!("Deleted: {} ({})", sermon.data.title, sermon.passage));
    Ok(())
}

/// Generate presentation data and store it with the sermon
pub async fn prepare(config: &Config, id: i64, output: &Output) -> Result<()> {
    let mut repo = open_repository(config).await?;
    let generator = open_generator(config)?;
    let mut draft = Draft::from_saved(find(&repo, id)?);

    let Some(ticket) = draft.begin_presentation() else {
        bail!("A generation is already running for sermon {}", id);
    };

    if !output.is_quiet() && !output.is_json() {
        eprintln!("Preparing presentation for {}...", draft.outline().title);
    }
    let presentation = match generator.generate_presentation(draft.outline()).await {
        Ok(presentation) => presentation,
        Err(e) => {
            draft.abandon_presentation(ticket);
            return Err(with_hint(e)).context("Failed to generate presentation data");
        }
    };
    draft.complete_presentation(ticket, presentation);

    repo.replace_sermon(draft.to_saved())
        .await
        .map_err(with_hint)
        .context("Failed to save presentation data")?;

    output.success(&format!("Prepared sermon {}", id));
    Ok(())
}

/// Print the speaking schedule
pub async fn timeline(config: &Config, id: i64, output: &Output) -> Result<()> {
    let repo = open_repository(config).await?;
    let sermon = find(&repo, id)?;
    let sections = build_sections(&sermon.data, &config.timer.budget());
    output.print_timeline(&sections);
    Ok(())
}
