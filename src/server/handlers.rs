//! Route handlers

use axum::extract::{Path, State};
use axum::Json;

use crate::email::MailError;
use crate::server::error::ApiResult;
use crate::server::types::{
    EditRequest, OkResponse, PingResponse, ShareRequest, SummarizeRequest, SummarizeResponse,
    SummaryResponse, TestAllResponse, UploadRequest, UploadResponse,
};
use crate::server::AppState;
use crate::service::{self, ServiceError, DEFAULT_INSTRUCTION};

const SAMPLE_TRANSCRIPT: &str =
    "This is a sample meeting transcript. Discuss project deadlines and assign tasks.";
const SAMPLE_EDIT: &str = "# Updated Meeting Summary\n- Add/modify items as needed";

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok" })
}

pub async fn upload(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> ApiResult<Json<UploadResponse>> {
    let transcript = service::upload_transcript(state.store.as_ref(), req.transcript_text)?;
    Ok(Json(UploadResponse {
        transcript_id: transcript.id,
        note: "Copy this transcript_id for single summarize.".to_string(),
    }))
}

pub async fn summarize(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> ApiResult<Json<SummarizeResponse>> {
    let summary = service::summarize_transcript(
        state.store.as_ref(),
        &state.pipeline,
        &req.transcript_id,
        &req.instruction,
    )
    .await?;
    Ok(Json(summary.into()))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Path(summary_id): Path<String>,
) -> ApiResult<Json<SummaryResponse>> {
    let summary = service::get_summary(state.store.as_ref(), &summary_id)?;
    Ok(Json(summary.into()))
}

pub async fn save_edit(
    State(state): State<AppState>,
    Json(req): Json<EditRequest>,
) -> ApiResult<Json<OkResponse>> {
    service::edit_summary(state.store.as_ref(), &req.summary_id, &req.edited_text)?;
    Ok(Json(OkResponse::ok()))
}

pub async fn share(
    State(state): State<AppState>,
    Json(req): Json<ShareRequest>,
) -> ApiResult<Json<OkResponse>> {
    let message = format!("Email sent successfully to {}", req.recipients.join(", "));
    service::share_summary(
        state.store.as_ref(),
        state.mailer.as_deref(),
        &req.summary_id,
        req.recipients,
    )
    .await?;
    Ok(Json(OkResponse::with_message(message)))
}

/// Upload, summarize, edit and share a sample transcript in one call.
///
/// A failed share is reported in `share_status` instead of failing the request.
pub async fn test_all(State(state): State<AppState>) -> ApiResult<Json<TestAllResponse>> {
    let store = state.store.as_ref();

    let transcript = service::upload_transcript(store, SAMPLE_TRANSCRIPT.to_string())?;
    let summary =
        service::summarize_transcript(store, &state.pipeline, &transcript.id, DEFAULT_INSTRUCTION)
            .await?;
    service::edit_summary(store, &summary.id, SAMPLE_EDIT)?;

    let share_status = match state.demo_recipient.clone() {
        Some(recipient) => match service::share_summary(
            store,
            state.mailer.as_deref(),
            &summary.id,
            vec![recipient.clone()],
        )
        .await
        {
            Ok(()) => format!("Email sent successfully to {recipient}"),
            Err(e) => {
                tracing::warn!("One-click test share failed: {}", e);
                e.to_string()
            }
        },
        None => ServiceError::Email(MailError::MissingCredentials).to_string(),
    };

    Ok(Json(TestAllResponse {
        info: "One-click test completed".to_string(),
        transcript_id: transcript.id,
        summary_id: summary.id,
        edited_text: SAMPLE_EDIT.to_string(),
        share_status,
        note: "To test each step individually, use /upload, /summarize, /summary, and /share endpoints separately."
            .to_string(),
    }))
}
