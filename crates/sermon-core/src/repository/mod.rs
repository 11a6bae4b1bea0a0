//! Remote sermon repository
//!
//! ## Architecture
//!
//! - **RemoteCollection**: whole-document get/put against the hosted store
//! - **SermonRepository**: local snapshot with optimistic writes and rollback
//!
//! The collection document is the unit of every read and write.

pub mod client;
pub mod error;
pub mod sermons;

pub use client::{HttpCollection, RemoteCollection};
pub use error::{RepositoryError, RepositoryResult};
pub use sermons::{SermonRepository, SAVED_INDICATOR};
