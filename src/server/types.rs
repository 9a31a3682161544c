//! Request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::Summary;

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub transcript_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub transcript_id: String,
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub transcript_id: String,
    #[serde(default = "default_instruction")]
    pub instruction: String,
}

fn default_instruction() -> String {
    crate::service::DEFAULT_INSTRUCTION.to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary_id: String,
    pub summary_text: String,
    pub structured: Value,
}

impl From<Summary> for SummarizeResponse {
    fn from(summary: Summary) -> Self {
        Self {
            summary_id: summary.id,
            summary_text: summary.editable_text,
            structured: summary.structured,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary_id: String,
    pub transcript_id: String,
    pub summary_text: String,
    pub generated_text: String,
    pub structured: Value,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            summary_id: summary.id,
            transcript_id: summary.transcript_id,
            summary_text: summary.editable_text,
            generated_text: summary.generated_text,
            structured: summary.structured,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub summary_id: String,
    pub edited_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub summary_id: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestAllResponse {
    pub info: String,
    pub transcript_id: String,
    pub summary_id: String,
    pub edited_text: String,
    pub share_status: String,
    pub note: String,
}
