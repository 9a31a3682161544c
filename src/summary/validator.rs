//! Validation of the fuser's raw output

use serde_json::{json, Map, Value};

/// Pipeline result: structured sections plus the editable narrative.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutcome {
    pub structured: Value,
    pub editable_text: String,
}

/// Shape returned when the fuser output carries no usable `structured` object.
///
/// This is the historical two-key shape, not the seven section keys the
/// fuser is prompted for; stored summaries rely on it.
pub fn fallback_structured() -> Value {
    json!({"sections": [], "action_items": []})
}

/// Parse the fuser's reply, degrading to defaults instead of failing.
///
/// - top-level JSON object: `structured` is taken when it is an object and
///   `editable_text` when it is a non-blank string, each defaulting otherwise
/// - anything else: fallback structure, raw text as the narrative
pub fn validate_fusion(raw: &str) -> SummaryOutcome {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(mut fields)) => SummaryOutcome {
            structured: take_structured(&mut fields),
            editable_text: take_editable_text(&mut fields).unwrap_or_else(|| raw.to_string()),
        },
        Ok(other) => {
            tracing::warn!(
                "Fusion output is JSON but not an object ({}), using raw text",
                json_kind(&other)
            );
            fallback(raw)
        }
        Err(e) => {
            tracing::warn!("Fusion output is not valid JSON ({}), using raw text", e);
            fallback(raw)
        }
    }
}

fn fallback(raw: &str) -> SummaryOutcome {
    SummaryOutcome {
        structured: fallback_structured(),
        editable_text: raw.to_string(),
    }
}

fn take_structured(fields: &mut Map<String, Value>) -> Value {
    match fields.remove("structured") {
        Some(value @ Value::Object(_)) => value,
        _ => fallback_structured(),
    }
}

fn take_editable_text(fields: &mut Map<String, Value>) -> Option<String> {
    match fields.remove("editable_text") {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
