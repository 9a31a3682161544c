//! recap - Meeting transcript summaries you can edit and email
//!
//! A transcript is split into bounded chunks, each chunk is summarized by an
//! LLM, and the partial summaries are fused into a structured summary plus an
//! editable markdown narrative.

pub mod cli;
pub mod config;
pub mod email;
pub mod llm;
pub mod server;
pub mod service;
pub mod storage;
pub mod summary;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "recap";
