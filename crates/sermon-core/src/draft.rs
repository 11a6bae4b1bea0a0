//! Working copy of a sermon being edited
//!
//! A [`Draft`] owns the outline the user is editing together with the cached
//! presentation rewrite. Edits invalidate the cache and (re)arm a debounce
//! window; once the user has been quiet for the window the host asks for a
//! new presentation rewrite.
//!
//! Generation is guarded by a single advisory flag. Requests are never
//! aborted; a result that arrives after the outline changed is discarded.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::document::{apply_edit, FieldPath, InvalidPathError};
use crate::models::{PresentationOutline, SavedSermon, SermonOutline};

/// Quiet period before presentation data is regenerated
pub const REGENERATION_DELAY: Duration = Duration::from_secs(2);

/// Cancel-and-reschedule timer
///
/// Each [`schedule`](Debouncer::schedule) pushes the deadline out; the
/// debouncer fires once when polled at or after the deadline.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm the timer, replacing any pending deadline
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending deadline
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once per armed deadline
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Advisory "generation in progress" flag
#[derive(Debug, Default)]
pub struct GenerationGate {
    busy: bool,
}

impl GenerationGate {
    /// Claim the gate; returns false if a generation is already outstanding
    pub fn try_begin(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub fn finish(&mut self) {
        self.busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

/// Handle for an outstanding presentation rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationTicket {
    revision: u64,
}

/// Host-side editing state for one sermon
#[derive(Debug)]
pub struct Draft {
    id: Option<i64>,
    passage: String,
    outline: SermonOutline,
    presentation: Option<PresentationOutline>,
    revision: u64,
    regeneration: Debouncer,
    gate: GenerationGate,
}

impl Draft {
    /// Start a draft from a freshly generated outline
    pub fn new(passage: impl Into<String>, outline: SermonOutline) -> Self {
        Self {
            id: None,
            passage: passage.into(),
            outline,
            presentation: None,
            revision: 0,
            regeneration: Debouncer::new(REGENERATION_DELAY),
            gate: GenerationGate::default(),
        }
    }

    /// Start a draft from a stored sermon
    pub fn from_saved(saved: SavedSermon) -> Self {
        let mut draft = Self::new(saved.passage, saved.data);
        draft.id = Some(saved.id);
        draft.presentation = saved.presentation_data;
        draft
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn passage(&self) -> &str {
        &self.passage
    }

    pub fn outline(&self) -> &SermonOutline {
        &self.outline
    }

    pub fn presentation(&self) -> Option<&PresentationOutline> {
        self.presentation.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace one text field
    ///
    /// Invalidates cached presentation data and re-arms the regeneration
    /// debounce.
    pub fn apply_edit(
        &mut self,
        path: FieldPath,
        value: impl Into<String>,
        now: Instant,
    ) -> Result<(), InvalidPathError> {
        self.outline = apply_edit(&self.outline, path, value)?;
        self.revision += 1;
        if self.presentation.take().is_some() {
            debug!("Presentation data invalidated by edit to {}", path);
        }
        self.regeneration.schedule(now);
        Ok(())
    }

    /// Replace the whole outline after a successful regeneration
    ///
    /// A failed generation never reaches this method, so the displayed
    /// outline survives errors.
    pub fn replace_outline(&mut self, outline: SermonOutline) {
        self.outline = outline;
        self.revision += 1;
        self.presentation = None;
        self.regeneration.cancel();
    }

    /// Whether the debounce window has elapsed since the last edit
    ///
    /// Stays pending while a generation holds the gate, so the request fires
    /// on the first poll after that generation finishes.
    pub fn regeneration_due(&mut self, now: Instant) -> bool {
        if self.gate.is_busy() {
            return false;
        }
        self.regeneration.poll(now)
    }

    pub fn regeneration_pending(&self) -> bool {
        self.regeneration.is_pending()
    }

    /// Whether any generation is outstanding
    pub fn is_generating(&self) -> bool {
        self.gate.is_busy()
    }

    /// Claim the gate for an outline generation
    pub fn begin_generation(&mut self) -> bool {
        self.gate.try_begin()
    }

    /// Release the gate after an outline generation
    pub fn finish_generation(&mut self) {
        self.gate.finish();
    }

    /// Claim the gate for a presentation rewrite of the current revision
    pub fn begin_presentation(&mut self) -> Option<PresentationTicket> {
        if !self.gate.try_begin() {
            debug!("Presentation generation skipped, another generation is running");
            return None;
        }
        Some(PresentationTicket {
            revision: self.revision,
        })
    }

    /// Accept a presentation rewrite if the outline has not changed since
    /// the ticket was issued; releases the gate either way
    pub fn complete_presentation(
        &mut self,
        ticket: PresentationTicket,
        presentation: PresentationOutline,
    ) -> bool {
        self.gate.finish();
        if ticket.revision != self.revision {
            debug!(
                "Discarding presentation for revision {} (current {})",
                ticket.revision, self.revision
            );
            return false;
        }
        self.presentation = Some(presentation);
        true
    }

    /// Release the gate after a failed presentation rewrite
    pub fn abandon_presentation(&mut self, _ticket: PresentationTicket) {
        self.gate.finish();
    }

    /// Record for the remote collection
    ///
    /// Keeps the original ID when the draft came from a stored sermon.
    pub fn to_saved(&self) -> SavedSermon {
        let mut saved = match self.id {
            Some(id) => SavedSermon::with_id(id, self.passage.clone(), self.outline.clone()),
            None => SavedSermon::new(self.passage.clone(), self.outline.clone()),
        };
        saved.presentation_data = self.presentation.clone();
        saved
    }
}
