//! Typed view over the structured summary JSON

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::prompts::SECTION_KEYS;

/// The seven summary sections, each a list of items.
///
/// Built leniently from whatever the fuser returned: absent keys are empty,
/// non-string items are kept as compact JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSummary {
    pub agenda: Vec<String>,
    pub decisions: Vec<String>,
    pub action_items: Vec<String>,
    pub owners: Vec<String>,
    pub deadlines: Vec<String>,
    pub risks: Vec<String>,
    pub open_questions: Vec<String>,
}

impl StructuredSummary {
    pub fn from_value(value: &Value) -> Self {
        let section = |key: &str| value.get(key).map(items).unwrap_or_default();

        Self {
            agenda: section("agenda"),
            decisions: section("decisions"),
            action_items: section("action_items"),
            owners: section("owners"),
            deadlines: section("deadlines"),
            risks: section("risks"),
            open_questions: section("open_questions"),
        }
    }

    /// Sections in prompt order, paired with their keys
    pub fn sections(&self) -> [(&'static str, &[String]); 7] {
        [
            (SECTION_KEYS[0], self.agenda.as_slice()),
            (SECTION_KEYS[1], self.decisions.as_slice()),
            (SECTION_KEYS[2], self.action_items.as_slice()),
            (SECTION_KEYS[3], self.owners.as_slice()),
            (SECTION_KEYS[4], self.deadlines.as_slice()),
            (SECTION_KEYS[5], self.risks.as_slice()),
            (SECTION_KEYS[6], self.open_questions.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.sections().iter().all(|(_, items)| items.is_empty())
    }
}

fn items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(values) => values.iter().filter_map(item_text).collect(),
        Value::Null => Vec::new(),
        single => item_text(single).into_iter().collect(),
    }
}

fn item_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_sections_default_to_empty() {
        let summary = StructuredSummary::from_value(&json!({"agenda": ["x"]}));
        assert_eq!(summary.agenda, vec!["x".to_string()]);
        assert!(summary.decisions.is_empty());
        assert!(!summary.is_empty());
    }

    #[test]
    fn fallback_shape_reads_as_empty() {
        let summary =
            StructuredSummary::from_value(&json!({"sections": [], "action_items": []}));
        assert!(summary.is_empty());
    }

    #[test]
    fn non_string_items_are_rendered_as_json() {
        let summary = StructuredSummary::from_value(&json!({
            "action_items": [{"task": "book room"}, null, 3],
            "risks": "single risk"
        }));
        assert_eq!(
            summary.action_items,
            vec![r#"{"task":"book room"}"#.to_string(), "3".to_string()]
        );
        assert_eq!(summary.risks, vec!["single risk".to_string()]);
    }

    #[test]
    fn sections_follow_prompt_order() {
        let keys: Vec<&str> = StructuredSummary::default()
            .sections()
            .iter()
            .map(|(k, _)| *k)
            .collect();
        assert_eq!(keys, SECTION_KEYS.to_vec());
    }
}
