//! LLM module for recap
//!
//! Chat-style text generation used by the summary pipeline (Groq, Gemini).

mod client;
mod gemini;
mod groq;
pub mod prompts;
mod retry;

pub use client::{build_provider, ChatMessage, LlmProvider, Role};
pub use gemini::GeminiClient;
pub use groq::GroqClient;
pub use retry::RetryingProvider;
