//! Transcript and summary operations shared by the HTTP server and the CLI

use thiserror::Error;

use crate::email::{parse_recipients, MailError, Mailer, OutgoingEmail};
use crate::storage::{ShareRecord, Summary, SummaryStore, Transcript};
use crate::summary::{PipelineError, SummaryPipeline};

/// Instruction used when the caller does not give one
pub const DEFAULT_INSTRUCTION: &str =
    "Summarize the meeting into clear sections with action items.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Transcript not found")]
    TranscriptNotFound,

    #[error("Summary not found")]
    SummaryNotFound,

    #[error(transparent)]
    Generation(#[from] PipelineError),

    #[error("Invalid recipients: {0}")]
    InvalidRecipients(#[source] MailError),

    #[error("Email sending failed: {0}")]
    Email(#[source] MailError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Store a new transcript
pub fn upload_transcript(store: &dyn SummaryStore, text: String) -> ServiceResult<Transcript> {
    let transcript = Transcript::new(text);
    store.put_transcript(&transcript)?;
    tracing::info!(
        "Stored transcript {} ({} bytes)",
        transcript.id,
        transcript.text.len()
    );
    Ok(transcript)
}

/// Run the pipeline over a stored transcript and store the result
pub async fn summarize_transcript(
    store: &dyn SummaryStore,
    pipeline: &SummaryPipeline,
    transcript_id: &str,
    instruction: &str,
) -> ServiceResult<Summary> {
    let transcript = store
        .get_transcript(transcript_id)?
        .ok_or(ServiceError::TranscriptNotFound)?;

    let outcome = pipeline
        .generate_summary(&transcript.text, instruction)
        .await?;

    let summary = Summary::new(transcript.id, outcome.structured, outcome.editable_text);
    store.put_summary(&summary)?;
    tracing::info!("Stored summary {}", summary.id);
    Ok(summary)
}

pub fn get_summary(store: &dyn SummaryStore, summary_id: &str) -> ServiceResult<Summary> {
    store
        .get_summary(summary_id)?
        .ok_or(ServiceError::SummaryNotFound)
}

/// Replace a summary's editable text
pub fn edit_summary(
    store: &dyn SummaryStore,
    summary_id: &str,
    edited_text: &str,
) -> ServiceResult<()> {
    if store.update_summary_text(summary_id, edited_text)? {
        Ok(())
    } else {
        Err(ServiceError::SummaryNotFound)
    }
}

/// Email a summary's current editable text and record the attempt.
///
/// `mailer` is `None` when SMTP is not configured; the attempt is still recorded.
pub async fn share_summary(
    store: &dyn SummaryStore,
    mailer: Option<&dyn Mailer>,
    summary_id: &str,
    recipients: Vec<String>,
) -> ServiceResult<()> {
    let summary = get_summary(store, summary_id)?;
    parse_recipients(&recipients).map_err(ServiceError::InvalidRecipients)?;

    let email = OutgoingEmail::summary(summary.editable_text, recipients);
    let result = match mailer {
        Some(mailer) => mailer.send(&email).await,
        None => Err(MailError::MissingCredentials),
    };

    let record = match &result {
        Ok(()) => ShareRecord::delivered(summary.id, email.recipients),
        Err(e) => ShareRecord::failed(summary.id, email.recipients, e.to_string()),
    };
    if let Err(e) = store.record_share(&record) {
        tracing::warn!("Failed to record share for {}: {:#}", record.summary_id, e);
    }

    result.map_err(ServiceError::Email)
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::email::{MailError, Mailer, OutgoingEmail};

    /// Records every message; fails when `fail` is set.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub fail: bool,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::NoRecipients);
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }
}
