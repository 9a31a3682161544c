//! Record store abstraction injected into the request handlers

use anyhow::Result;

use crate::storage::{ShareRecord, Summary, Transcript};

/// Persistence for transcripts, summaries and share history.
///
/// Implementations must be shareable across request handlers.
pub trait SummaryStore: Send + Sync {
    fn put_transcript(&self, transcript: &Transcript) -> Result<()>;

    fn get_transcript(&self, id: &str) -> Result<Option<Transcript>>;

    fn put_summary(&self, summary: &Summary) -> Result<()>;

    fn get_summary(&self, id: &str) -> Result<Option<Summary>>;

    /// Replace the editable text. Returns `false` when the summary does not exist.
    fn update_summary_text(&self, id: &str, edited_text: &str) -> Result<bool>;

    /// Most recent summaries first
    fn list_summaries(&self, limit: usize) -> Result<Vec<Summary>>;

    fn record_share(&self, share: &ShareRecord) -> Result<i64>;

    /// Share attempts for a summary, oldest first
    fn list_shares(&self, summary_id: &str) -> Result<Vec<ShareRecord>>;
}
