//! Command handlers

pub mod config;
pub mod generate;
pub mod sermon;
pub mod theme;

use anyhow::{Context, Result};

use sermon_core::{Config, GeminiBackend, HttpCollection, OutlineGenerator, SermonRepository};

/// Repository over the configured remote collection, already fetched
pub async fn open_repository(config: &Config) -> Result<SermonRepository<HttpCollection>> {
    let remote = HttpCollection::from_config(&config.repository).map_err(with_hint)?;
    let mut repo = SermonRepository::new(remote);
    repo.fetch_all()
        .await
        .map_err(with_hint)
        .context("Failed to load saved sermons")?;
    Ok(repo)
}

/// Generator over the configured model
pub fn open_generator(config: &Config) -> Result<OutlineGenerator<GeminiBackend>> {
    let backend = GeminiBackend::from_config(&config.generation).map_err(with_hint)?;
    Ok(OutlineGenerator::new(backend)
        .with_max_supporting_chars(config.generation.max_supporting_chars))
}

/// Errors that know how to suggest a fix
pub trait RecoveryHint: std::error::Error + Send + Sync + 'static {
    fn hint(&self) -> Option<&'static str>;
}

impl RecoveryHint for sermon_core::RepositoryError {
    fn hint(&self) -> Option<&'static str> {
        self.recovery_suggestion()
    }
}

impl RecoveryHint for sermon_core::GenerationError {
    fn hint(&self) -> Option<&'static str> {
        self.recovery_suggestion()
    }
}

/// Append the recovery suggestion, if any, to the message
pub fn with_hint<E: RecoveryHint>(err: E) -> anyhow::Error {
    match err.hint() {
        Some(hint) => anyhow::anyhow!("{}\nHint: {}", err, hint),
        None => anyhow::Error::new(err),
    }
}
