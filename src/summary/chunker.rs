//! Sentence-boundary transcript chunking

/// Default approximate token budget per chunk
pub const DEFAULT_CHUNK_BUDGET: usize = 1200;

/// Sentence boundary used both to split and to rejoin segments
pub const SENTENCE_DELIMITER: &str = ". ";

/// A bounded slice of a transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based position in the transcript
    pub index: usize,
    /// Number of chunks the transcript was split into
    pub total: usize,
    pub text: String,
}

/// Rough token estimate: one token per four characters, at least one.
pub fn estimate_tokens(segment: &str) -> usize {
    (segment.chars().count() / 4).max(1)
}

/// Split a transcript into chunks whose estimated size stays within `budget`.
///
/// Segments are never split, so a single segment larger than the budget
/// gets a chunk of its own. An empty transcript yields one empty chunk.
pub fn smart_chunks(text: &str, budget: usize) -> Vec<Chunk> {
    let normalized = text.replace('\r', " ");

    let mut texts: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for segment in normalized.split(SENTENCE_DELIMITER) {
        let len = estimate_tokens(segment);
        if current_len + len > budget && !current.is_empty() {
            texts.push(current.join(SENTENCE_DELIMITER));
            current.clear();
            current_len = 0;
        }
        current.push(segment);
        current_len += len;
    }

    if !current.is_empty() {
        texts.push(current.join(SENTENCE_DELIMITER));
    }

    let total = texts.len();
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk { index, total, text })
        .collect()
}
