//! Storage module for recap
//!
//! Persists transcripts, summaries and share history in SQLite.

mod database;
mod models;
mod store;

pub use database::{Database, DatabaseStats};
pub use models::{ShareRecord, Summary, Transcript};
pub use store::SummaryStore;
