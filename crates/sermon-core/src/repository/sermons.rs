//! Saved-sermon list with optimistic updates
//!
//! The repository keeps the last known snapshot of the remote collection.
//! Writes are applied to that snapshot first so the list updates at once,
//! then the whole collection is written back. If the write fails the
//! snapshot is restored to what it was before the action.
//!
//! There is no versioning: the last write to reach the store wins.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::client::RemoteCollection;
use super::error::{RepositoryError, RepositoryResult};
use crate::models::SavedSermon;

/// How long the "saved" indicator stays visible
pub const SAVED_INDICATOR: Duration = Duration::from_secs(2);

/// Local view of the remote sermon collection
pub struct SermonRepository<C> {
    remote: C,
    sermons: Vec<SavedSermon>,
    saved_at: Option<Instant>,
    last_error: Option<String>,
}

impl<C: RemoteCollection> SermonRepository<C> {
    pub fn new(remote: C) -> Self {
        Self {
            remote,
            sermons: Vec::new(),
            saved_at: None,
            last_error: None,
        }
    }

    /// The last known snapshot
    pub fn sermons(&self) -> &[SavedSermon] {
        &self.sermons
    }

    /// Look up a sermon in the snapshot
    pub fn get(&self, id: i64) -> Option<&SavedSermon> {
        self.sermons.iter().find(|s| s.id == id)
    }

    /// Message of the last failed action, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the transient "saved" indicator should be shown at `now`
    pub fn show_saved_indicator(&self, now: Instant) -> bool {
        self.saved_at
            .map(|at| now.saturating_duration_since(at) < SAVED_INDICATOR)
            .unwrap_or(false)
    }

    /// Reload the snapshot from the remote collection
    ///
    /// A missing collection reads as empty.
    pub async fn fetch_all(&mut self) -> RepositoryResult<&[SavedSermon]> {
        match self.remote.fetch_latest().await {
            Ok(sermons) => {
                debug!("Fetched {} sermons", sermons.len());
                self.sermons = sermons;
                self.last_error = None;
            }
            Err(RepositoryError::NotFound) => {
                debug!("Collection not found, starting empty");
                self.sermons.clear();
                self.last_error = None;
            }
            Err(e) => {
                warn!("Failed to fetch sermons: {}", e);
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        }
        Ok(&self.sermons)
    }

    /// Append a sermon and write the collection
    pub async fn save_sermon(&mut self, sermon: SavedSermon) -> RepositoryResult<()> {
        let id = sermon.id;
        self.commit(|sermons| {
            sermons.push(sermon);
            Ok(())
        })
        .await?;
        info!("Saved sermon {}", id);
        Ok(())
    }

    /// Replace a stored sermon with the same ID and write the collection
    pub async fn replace_sermon(&mut self, sermon: SavedSermon) -> RepositoryResult<()> {
        let id = sermon.id;
        self.commit(|sermons| {
            let slot = sermons
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or(RepositoryError::UnknownSermon(id))?;
            *slot = sermon;
            Ok(())
        })
        .await?;
        info!("Updated sermon {}", id);
        Ok(())
    }

    /// Remove a sermon and write the collection
    pub async fn delete_sermon(&mut self, id: i64) -> RepositoryResult<()> {
        self.commit(|sermons| {
            let before = sermons.len();
            sermons.retain(|s| s.id != id);
            if sermons.len() == before {
                return Err(RepositoryError::UnknownSermon(id));
            }
            Ok(())
        })
        .await?;
        info!("Deleted sermon {}", id);
        Ok(())
    }

    /// Apply `change` optimistically, write, and roll back on failure
    async fn commit<F>(&mut self, change: F) -> RepositoryResult<()>
    where
        F: FnOnce(&mut Vec<SavedSermon>) -> RepositoryResult<()>,
    {
        let snapshot = self.sermons.clone();
        if let Err(e) = change(&mut self.sermons) {
            self.sermons = snapshot;
            self.last_error = Some(e.to_string());
            return Err(e);
        }

        match self.remote.overwrite(&self.sermons).await {
            Ok(()) => {
                self.saved_at = Some(Instant::now());
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Write failed, rolling back: {}", e);
                self.sermons = snapshot;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
