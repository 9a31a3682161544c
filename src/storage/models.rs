//! Data models for storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded meeting transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Unique identifier (UUID)
    pub id: String,

    /// Raw transcript text
    pub text: String,

    /// Upload timestamp
    pub created_at: DateTime<Utc>,
}

impl Transcript {
    /// Create a new transcript with a fresh id
    pub fn new(text: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            created_at: Utc::now(),
        }
    }
}

/// A generated summary and its current edited text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Unique identifier (UUID)
    pub id: String,

    /// Transcript this summary was generated from
    pub transcript_id: String,

    /// Structured sections as returned by the pipeline
    pub structured: serde_json::Value,

    /// Narrative shown to and edited by the user
    pub editable_text: String,

    /// Narrative as originally generated
    pub generated_text: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last edit timestamp
    pub updated_at: DateTime<Utc>,
}

impl Summary {
    /// Create a summary from pipeline output; the generated text starts as the editable text
    pub fn new(transcript_id: String, structured: serde_json::Value, text: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            transcript_id,
            structured,
            editable_text: text.clone(),
            generated_text: text,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the narrative differs from what the pipeline produced
    pub fn is_edited(&self) -> bool {
        self.editable_text != self.generated_text
    }
}

/// One attempt to email a summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRecord {
    /// Row identifier
    pub id: i64,

    /// Summary that was shared
    pub summary_id: String,

    /// Recipient addresses
    pub recipients: Vec<String>,

    /// Whether the mail relay accepted the message
    pub delivered: bool,

    /// Error message for failed attempts
    pub detail: Option<String>,

    /// Attempt timestamp
    pub created_at: DateTime<Utc>,
}

impl ShareRecord {
    pub fn delivered(summary_id: String, recipients: Vec<String>) -> Self {
        Self {
            id: 0, // Will be set by database
            summary_id,
            recipients,
            delivered: true,
            detail: None,
            created_at: Utc::now(),
        }
    }

    pub fn failed(summary_id: String, recipients: Vec<String>, detail: String) -> Self {
        Self {
            delivered: false,
            detail: Some(detail),
            ..Self::delivered(summary_id, recipients)
        }
    }
}
