//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::error::Error as StdError;
use thiserror::Error;

use crate::service::ServiceError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid credentials")]
    Unauthorized,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Service(e) => match e {
                ServiceError::TranscriptNotFound | ServiceError::SummaryNotFound => {
                    StatusCode::NOT_FOUND
                }
                ServiceError::InvalidRecipients(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ServiceError::Generation(_) => StatusCode::BAD_GATEWAY,
                ServiceError::Email(_) | ServiceError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Service(ServiceError::Generation(e)) => {
                format!("Summary generation failed: {}", error_chain(e))
            }
            ApiError::Service(ServiceError::Store(_)) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// "outer: inner: root" for an error and its sources
fn error_chain(err: &dyn StdError) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(e) = source {
        parts.push(e.to_string());
        source = e.source();
    }
    parts.join(": ")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Service(ServiceError::Store(e)) => tracing::error!("Store error: {:#}", e),
            _ if status.is_server_error() => tracing::error!("{}", self.detail()),
            _ => tracing::debug!("Request rejected ({}): {}", status, self),
        }

        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::MailError;
    use crate::summary::PipelineError;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ServiceError::SummaryNotFound.into(), StatusCode::NOT_FOUND),
            (
                ServiceError::InvalidRecipients(MailError::NoRecipients).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::Email(MailError::MissingCredentials).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServiceError::Generation(PipelineError::Fusion(anyhow::anyhow!("boom"))).into(),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn generation_detail_includes_cause() {
        let err: ApiError = ServiceError::Generation(PipelineError::PartialSummary {
            index: 1,
            total: 3,
            source: anyhow::anyhow!("rate limited"),
        })
        .into();

        assert_eq!(
            err.detail(),
            "Summary generation failed: partial summary for transcript part 2 of 3 failed: rate limited"
        );
    }

    #[test]
    fn store_errors_are_not_leaked() {
        let err: ApiError = ServiceError::Store(anyhow::anyhow!("disk I/O error at /secret")).into();
        assert_eq!(err.detail(), "Internal server error");
    }
}
