use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Settings;
use crate::llm::gemini::GeminiClient;
use crate::llm::groq::GroqClient;
use crate::llm::retry::RetryingProvider;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One role-tagged message sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A text-generation capability: messages in, one completion out.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Short provider identifier used in logs.
    fn name(&self) -> &str;
}

/// Build an LLM provider from runtime settings.
///
/// The provider is wrapped with the configured retry policy.
pub fn build_provider(settings: &Settings) -> Result<Arc<dyn LlmProvider>> {
    let inner: Box<dyn LlmProvider> = match settings.llm.provider.to_lowercase().as_str() {
        "groq" => Box::new(GroqClient::from_settings(settings)?),
        "gemini" => Box::new(GeminiClient::from_settings(settings)?),
        other => anyhow::bail!(
            "Unsupported llm.provider '{}'. Supported providers: groq, gemini",
            other
        ),
    };

    Ok(Arc::new(RetryingProvider::from_settings(inner, settings)))
}
