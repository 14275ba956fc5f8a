//! Normalized retrieval hit

use super::parser::get_field;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Keys that may hold a candidate's free-text content, highest priority first
pub const CONTENT_KEYS: &[&str] = &["content_with_weight", "content", "text_content"];

const METADATA_KEYS: &[&str] = &["metadata", "meta_fields"];

/// One search hit from the knowledge base.
///
/// Every backend response is adapted into this shape at the retrieval
/// boundary: scalar top-level values land in `fields`, a nested metadata
/// object lands in `metadata`, both stringified.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Candidate {
    pub fields: BTreeMap<String, String>,
    pub metadata: BTreeMap<String, String>,
}

impl Candidate {
    /// Candidate holding only a content string
    pub fn from_content(content: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("content".to_string(), content.into());
        Self {
            fields,
            metadata: BTreeMap::new(),
        }
    }

    /// Adapt a raw backend record (e.g. a RAGFlow chunk)
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut candidate = Candidate::default();

        let serde_json::Value::Object(object) = value else {
            if let Some(text) = scalar_to_string(value) {
                candidate.fields.insert("content".to_string(), text);
            }
            return candidate;
        };

        for (key, val) in object {
            if METADATA_KEYS.contains(&key.as_str()) {
                if let serde_json::Value::Object(meta) = val {
                    for (meta_key, meta_val) in meta {
                        if let Some(text) = scalar_to_string(meta_val) {
                            candidate.metadata.insert(meta_key.clone(), text);
                        }
                    }
                    continue;
                }
            }
            if let Some(text) = scalar_to_string(val) {
                candidate.fields.insert(key.clone(), text);
            }
        }

        candidate
    }

    /// Look up a field by aliases: top-level fields first, then metadata
    pub fn field(&self, aliases: &[&str]) -> Option<&str> {
        get_field(&self.fields, aliases).or_else(|| get_field(&self.metadata, aliases))
    }

    /// The candidate's free-text content, if any
    pub fn content(&self) -> Option<&str> {
        self.field(CONTENT_KEYS)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_ragflow_chunk() {
        let chunk = json!({
            "id": "c1",
            "content": "name,unit:Widget,pcs",
            "document_keyword": "items.csv",
            "similarity": 0.91,
            "important_keywords": ["widget"],
            "metadata": {"source": "catalog", "rows": 3, "nested": {"x": 1}}
        });

        let candidate = Candidate::from_json(&chunk);
        assert_eq!(candidate.fields["id"], "c1");
        assert_eq!(candidate.fields["similarity"], "0.91");
        assert!(!candidate.fields.contains_key("important_keywords"));
        assert_eq!(candidate.metadata["source"], "catalog");
        assert_eq!(candidate.metadata["rows"], "3");
        assert!(!candidate.metadata.contains_key("nested"));
        assert_eq!(candidate.content(), Some("name,unit:Widget,pcs"));
    }

    #[test]
    fn test_content_priority_and_metadata_fallback() {
        let candidate = Candidate::from_json(&json!({
            "content": "plain",
            "content_with_weight": "weighted"
        }));
        assert_eq!(candidate.content(), Some("weighted"));

        let candidate = Candidate::from_json(&json!({
            "id": "c2",
            "meta_fields": {"Text Content": "from metadata"}
        }));
        assert_eq!(candidate.content(), Some("from metadata"));
    }

    #[test]
    fn test_from_json_bare_string() {
        let candidate = Candidate::from_json(&json!("Widget"));
        assert_eq!(candidate.content(), Some("Widget"));
    }

    #[test]
    fn test_display_renders_whole_candidate() {
        let candidate = Candidate::from_json(&json!({"id": "c3", "score": 1}));
        assert_eq!(candidate.content(), None);
        assert_eq!(
            candidate.to_string(),
            r#"{"fields":{"id":"c3","score":"1"},"metadata":{}}"#
        );
    }
}
