/// Section keys the fuser is asked to fill.
pub const SECTION_KEYS: [&str; 7] = [
    "agenda",
    "decisions",
    "action_items",
    "owners",
    "deadlines",
    "risks",
    "open_questions",
];

/// System instruction for per-chunk summaries.
pub const PARTIAL_SYSTEM_PROMPT: &str =
    "You are a meticulous meeting summarizer. Output should be concise, faithful, and useful.";

/// System instruction for the fusion call.
pub const FUSE_SYSTEM_PROMPT: &str = "You are a coordinator that merges multiple partial meeting summaries.\n\
Return valid JSON with keys:\n\
structured  editable_text\n\
The structured object should include sections agenda decisions action_items owners deadlines risks open_questions.\n\
The editable_text is a clean markdown narrative ready to be emailed.\n\
Keep names and dates accurate. Remove duplicates. If items conflict, keep the version that has explicit evidence.";

/// Build the user message for one transcript chunk.
///
/// `index` is 0-based; the prompt shows the 1-based position.
pub fn build_partial_prompt(instruction: &str, index: usize, total: usize, chunk: &str) -> String {
    format!(
        "Custom instruction:\n{instruction}\n\nTranscript part {} of {total}:\n{chunk}",
        index + 1
    )
}

/// Build the user message that fuses all partial summaries.
pub fn build_fuse_prompt(instruction: &str, partials: &[String]) -> String {
    format!(
        "Custom instruction:\n{instruction}\n\n\
Combine partial summaries into structured JSON with sections: {} \
and also produce a clean editable prose version.\n\n\
Partials:\n{}",
        SECTION_KEYS.join(", "),
        partials.join("\n\n")
    )
}
