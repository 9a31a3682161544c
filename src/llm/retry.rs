use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::config::Settings;
use crate::llm::client::{ChatMessage, LlmProvider};

/// Retries failed generation calls a bounded number of times.
///
/// Attempt `n` (1-based) sleeps `backoff * n` before re-sending.
pub struct RetryingProvider {
    inner: Box<dyn LlmProvider>,
    max_retries: u32,
    backoff: Duration,
}

impl RetryingProvider {
    pub fn new(inner: Box<dyn LlmProvider>, max_retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            backoff,
        }
    }

    pub fn from_settings(inner: Box<dyn LlmProvider>, settings: &Settings) -> Self {
        Self::new(
            inner,
            settings.llm.max_retries,
            Duration::from_millis(settings.llm.retry_backoff_ms),
        )
    }
}

#[async_trait]
impl LlmProvider for RetryingProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.inner.complete(messages).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "{} call failed (attempt {}/{}): {:#}",
                        self.inner.name(),
                        attempt,
                        self.max_retries + 1,
                        e
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
