//! Chunk, summarize, fuse, validate

use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use thiserror::Error;

use crate::config::Settings;
use crate::llm::prompts::{
    build_fuse_prompt, build_partial_prompt, FUSE_SYSTEM_PROMPT, PARTIAL_SYSTEM_PROMPT,
};
use crate::llm::{ChatMessage, LlmProvider};
use crate::summary::chunker::{smart_chunks, Chunk, DEFAULT_CHUNK_BUDGET};
use crate::summary::validator::{validate_fusion, SummaryOutcome};

/// A generation call failed; nothing from the invocation is kept.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("partial summary for transcript part {} of {total} failed", index + 1)]
    PartialSummary {
        index: usize,
        total: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("fusing partial summaries failed")]
    Fusion(#[source] anyhow::Error),
}

/// Summary generation over one provider.
///
/// Holds no per-invocation state, so one pipeline can serve concurrent callers.
pub struct SummaryPipeline {
    provider: Arc<dyn LlmProvider>,
    chunk_budget: usize,
    max_concurrent_chunks: usize,
}

impl SummaryPipeline {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            chunk_budget: DEFAULT_CHUNK_BUDGET,
            max_concurrent_chunks: 1,
        }
    }

    pub fn from_settings(provider: Arc<dyn LlmProvider>, settings: &Settings) -> Self {
        Self::new(provider)
            .with_chunk_budget(settings.pipeline.chunk_budget)
            .with_max_concurrent_chunks(settings.pipeline.max_concurrent_chunks)
    }

    pub fn with_chunk_budget(mut self, chunk_budget: usize) -> Self {
        self.chunk_budget = chunk_budget;
        self
    }

    /// Values below 1 are treated as 1 (sequential).
    pub fn with_max_concurrent_chunks(mut self, max_concurrent_chunks: usize) -> Self {
        self.max_concurrent_chunks = max_concurrent_chunks.max(1);
        self
    }

    /// Produce the structured summary and editable narrative for a transcript.
    pub async fn generate_summary(
        &self,
        transcript: &str,
        instruction: &str,
    ) -> Result<SummaryOutcome, PipelineError> {
        let chunks = smart_chunks(transcript, self.chunk_budget);
        tracing::info!(
            "Summarizing transcript ({} bytes) in {} chunk(s) via {}",
            transcript.len(),
            chunks.len(),
            self.provider.name()
        );

        let partials = self.summarize_chunks(&chunks, instruction).await?;
        let fused = self.fuse(&partials, instruction).await?;

        let outcome = validate_fusion(&fused);
        tracing::info!(
            "Summary ready ({} bytes of editable text)",
            outcome.editable_text.len()
        );
        Ok(outcome)
    }

    /// One partial summary per chunk, returned in chunk order.
    pub async fn summarize_chunks(
        &self,
        chunks: &[Chunk],
        instruction: &str,
    ) -> Result<Vec<String>, PipelineError> {
        let calls: Vec<_> = chunks
            .iter()
            .map(|chunk| self.summarize_chunk(chunk, instruction))
            .collect();

        stream::iter(calls)
            .buffered(self.max_concurrent_chunks)
            .try_collect()
            .await
    }

    async fn summarize_chunk(
        &self,
        chunk: &Chunk,
        instruction: &str,
    ) -> Result<String, PipelineError> {
        tracing::debug!("Summarizing part {}/{}", chunk.index + 1, chunk.total);

        let messages = [
            ChatMessage::system(PARTIAL_SYSTEM_PROMPT),
            ChatMessage::user(build_partial_prompt(
                instruction,
                chunk.index,
                chunk.total,
                &chunk.text,
            )),
        ];

        self.provider
            .complete(&messages)
            .await
            .map_err(|source| PipelineError::PartialSummary {
                index: chunk.index,
                total: chunk.total,
                source,
            })
    }

    /// Single fusion call; the reply is returned unvalidated.
    pub async fn fuse(
        &self,
        partials: &[String],
        instruction: &str,
    ) -> Result<String, PipelineError> {
        tracing::debug!("Fusing {} partial summaries", partials.len());

        let messages = [
            ChatMessage::system(FUSE_SYSTEM_PROMPT),
            ChatMessage::user(build_fuse_prompt(instruction, partials)),
        ];

        let reply = self
            .provider
            .complete(&messages)
            .await
            .map_err(PipelineError::Fusion)?;

        if reply.trim().is_empty() {
            return Err(PipelineError::Fusion(anyhow::anyhow!("fusion reply was empty")));
        }

        Ok(reply)
    }
}
