//! HTTP server for recap
//!
//! Exposes upload, summarize, edit and share over JSON routes.

mod auth;
mod error;
mod handlers;
mod types;

use anyhow::{Context, Result};
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::email::{MailError, Mailer, SmtpMailer};
use crate::llm::build_provider;
use crate::storage::{Database, SummaryStore};
use crate::summary::SummaryPipeline;

pub use auth::{ApiCredentials, PASSWORD_HEADER, USERNAME_HEADER};
pub use error::{ApiError, ApiResult};
pub use types::*;

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SummaryStore>,
    pub pipeline: Arc<SummaryPipeline>,
    /// `None` when SMTP is not configured; shares then fail with a 500
    pub mailer: Option<Arc<dyn Mailer>>,
    /// `None` disables the header check
    pub credentials: Option<ApiCredentials>,
    /// Recipient used by `/test-all`
    pub demo_recipient: Option<String>,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store: Arc<dyn SummaryStore> = Arc::new(Database::open(settings)?);
        let provider = build_provider(settings)?;
        let pipeline = Arc::new(SummaryPipeline::from_settings(provider, settings));

        let mailer: Option<Arc<dyn Mailer>> = match SmtpMailer::from_settings(settings) {
            Ok(mailer) => Some(Arc::new(mailer)),
            Err(MailError::MissingCredentials) => {
                tracing::warn!("SMTP credentials not configured; sharing is disabled");
                None
            }
            Err(e) => return Err(e).context("Failed to configure SMTP"),
        };

        let credentials = ApiCredentials::from_settings(settings);
        if credentials.is_none() {
            tracing::warn!("Server credentials not configured; authentication is disabled");
        }

        let demo_recipient = Some(settings.smtp.username.trim())
            .filter(|user| !user.is_empty())
            .map(str::to_string);

        Ok(Self {
            store,
            pipeline,
            mailer,
            credentials,
            demo_recipient,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/upload", post(handlers::upload))
        .route("/summarize", post(handlers::summarize))
        .route("/summary", put(handlers::save_edit))
        .route("/summary/:id", get(handlers::get_summary))
        .route("/share", post(handlers::share))
        .route("/test-all", post(handlers::test_all))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_credentials,
        ));

    Router::new()
        .route("/ping", get(handlers::ping))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl+C
pub async fn serve(settings: &Settings, addr: Option<String>) -> Result<()> {
    let state = AppState::from_settings(settings)?;
    let addr = addr.unwrap_or_else(|| settings.server.addr.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(
        "{} {} listening on http://{}",
        crate::APP_NAME,
        crate::VERSION,
        listener.local_addr()?
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
