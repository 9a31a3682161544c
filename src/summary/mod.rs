//! Summary generation pipeline
//!
//! Chunker -> per-chunk partial summaries -> fusion call -> output validation.

mod chunker;
mod pipeline;
mod structured;
#[cfg(test)]
pub(crate) mod testing;
mod validator;

pub use chunker::{estimate_tokens, smart_chunks, Chunk, DEFAULT_CHUNK_BUDGET, SENTENCE_DELIMITER};
pub use pipeline::{PipelineError, SummaryPipeline};
pub use structured::StructuredSummary;
pub use validator::{fallback_structured, validate_fusion, SummaryOutcome};
