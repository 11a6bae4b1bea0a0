//! Sermon Core Library
//!
//! This crate provides the core functionality for `sermon`, a tool that
//! generates, edits and presents structured sermon outlines.
//!
//! # Architecture
//!
//! - **Generation**: a hosted language model drafts outlines and their
//!   presentation rewrite
//! - **Repository**: saved sermons live in one hosted JSON collection,
//!   written whole with optimistic local updates
//! - **Draft**: the host-side working copy with typed field edits and a
//!   debounced presentation refresh
//! - **Timer**: the speaker clock mapped onto outline sections
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let generator = OutlineGenerator::new(GeminiBackend::from_config(&config.generation)?);
//! let outline = generator.generate_outline("João 3:16", None).await?;
//!
//! let mut repo = SermonRepository::new(HttpCollection::from_config(&config.repository)?);
//! repo.fetch_all().await?;
//! repo.save_sermon(SavedSermon::new("João 3:16", outline)).await?;
//! ```
//!
//! # Modules
//!
//! - `models`: Outline, presentation and saved-record types
//! - `markup`: `**emphasis**` codec shared by every renderer
//! - `document`: Typed field paths and copy-on-write edits
//! - `draft`: Editing state, debounce and generation gate
//! - `timer`: Section timing and the speaker clock
//! - `view`: Read-only layout with timer anchors
//! - `generation`: Model prompts, backends and response extraction
//! - `repository`: Remote collection client and optimistic list
//! - `extraction`: Supporting document text
//! - `theme`: Persisted display theme
//! - `config`: Application configuration

pub mod config;
pub mod document;
pub mod draft;
pub mod extraction;
pub mod generation;
pub mod markup;
pub mod models;
pub mod repository;
pub mod theme;
pub mod timer;
pub mod view;

pub use config::Config;
pub use document::{apply_edit, FieldPath, InvalidPathError, PathSegment, RawPath};
pub use draft::{Draft, REGENERATION_DELAY};
pub use extraction::{extract_text, ExtractionError};
pub use generation::{
    CompletionBackend, GeminiBackend, GenerationError, GenerationResult, OutlineGenerator,
};
pub use models::{IconTag, PresentationOutline, SavedSermon, SermonOutline};
pub use repository::{
    HttpCollection, RemoteCollection, RepositoryError, RepositoryResult, SermonRepository,
};
pub use theme::{Theme, ThemeError, ThemeStore};
pub use timer::{SectionTimer, TimeBudget, TimerSection, TimerState};
