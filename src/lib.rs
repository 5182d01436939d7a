//! Story search service
//!
//! A full-text index over stories, exposed over HTTP. The reusable indexing
//! core lives in [`search`]; [`library`] keeps it consistent with the
//! in-memory record store.

pub mod api;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod search;
pub mod state;

pub use error::{AppError, Result};
pub use library::{StoryLibrary, WriteOutcome};
