//! Static credential check on the `x-username` / `x-password` headers

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::Settings;
use crate::server::error::ApiError;
use crate::server::AppState;

pub const USERNAME_HEADER: &str = "x-username";
pub const PASSWORD_HEADER: &str = "x-password";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub username: String,
    pub password: String,
}

impl ApiCredentials {
    /// `None` when no server credentials are configured.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        settings.auth_enabled().then(|| Self {
            username: settings.server.username.clone(),
            password: settings.server.password.clone(),
        })
    }

    fn matches(&self, headers: &HeaderMap) -> bool {
        let (Some(username), Some(password)) = (
            header(headers, USERNAME_HEADER),
            header(headers, PASSWORD_HEADER),
        ) else {
            return false;
        };
        // Both are compared before combining.
        let username_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let password_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        username_ok & password_ok
    }
}

/// Byte comparison whose running time depends only on the lengths
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

pub async fn require_credentials(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(credentials) = &state.credentials {
        if !credentials.matches(request.headers()) {
            return ApiError::Unauthorized.into_response();
        }
    }
    next.run(request).await
}
