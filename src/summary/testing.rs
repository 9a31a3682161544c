//! Scripted provider shared by pipeline and server tests

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::llm::prompts::FUSE_SYSTEM_PROMPT;
use crate::llm::{ChatMessage, LlmProvider};

type Responder = Box<dyn Fn(&[ChatMessage]) -> Result<String> + Send + Sync>;

pub struct ScriptedProvider {
    respond: Responder,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
    reverse_delays: bool,
}

impl ScriptedProvider {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&[ChatMessage]) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
            reverse_delays: false,
        }
    }

    /// Partial calls answer "part N"; the fusion call answers "fused".
    pub fn echo_part_numbers() -> Self {
        Self::new(|messages| {
            if messages[0].content == FUSE_SYSTEM_PROMPT {
                return Ok("fused".to_string());
            }
            let (part, _) = part_position(&messages[1].content)
                .ok_or_else(|| anyhow::anyhow!("no part position in prompt"))?;
            Ok(format!("part {part}"))
        })
    }

    /// Later parts answer sooner, to shake out ordering bugs.
    pub fn with_reverse_delays(mut self) -> Self {
        self.reverse_delays = true;
        self
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());

        if self.reverse_delays {
            if let Some((part, total)) = messages.get(1).and_then(|m| part_position(&m.content)) {
                let delay = (total + 1 - part) as u64 * 15;
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        (self.respond)(messages)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Extract `(N, M)` from "Transcript part N of M:".
pub fn part_position(prompt: &str) -> Option<(usize, usize)> {
    let rest = prompt.split("Transcript part ").nth(1)?;
    let header = rest.split(':').next()?;
    let (part, total) = header.split_once(" of ")?;
    Some((part.trim().parse().ok()?, total.trim().parse().ok()?))
}
