//! Picks the best-matching candidate for an item with one chat completion

use super::{ChatMessage, LLMClient};
use crate::retrieval::{parse_candidate_text, Candidate};
use std::sync::Arc;

/// Literal reply meaning no candidate is acceptable
pub const NO_MATCH_SENTINEL: &str = "none";

/// Outcome of one selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Canonical item name as returned by the backend
    Matched(String),
    NoMatch,
}

impl Selection {
    pub fn matched_name(&self) -> Option<&str> {
        match self {
            Selection::Matched(name) => Some(name),
            Selection::NoMatch => None,
        }
    }

    pub fn into_matched(self) -> Option<String> {
        match self {
            Selection::Matched(name) => Some(name),
            Selection::NoMatch => None,
        }
    }

    /// Interpret a raw selection reply
    pub fn from_reply(reply: &str) -> Self {
        let reply = reply.trim();
        if reply.is_empty() || reply.eq_ignore_ascii_case(NO_MATCH_SENTINEL) {
            Selection::NoMatch
        } else {
            Selection::Matched(reply.to_string())
        }
    }
}

/// LLM-backed candidate selector
pub struct CandidateSelector {
    client: Arc<dyn LLMClient>,
    instruction: String,
}

impl CandidateSelector {
    pub fn new(client: Arc<dyn LLMClient>, instruction: impl Into<String>) -> Self {
        Self {
            client,
            instruction: instruction.into(),
        }
    }

    /// Select one candidate for `item`.
    ///
    /// No candidates means no backend call. Backend failures count as no match.
    pub async fn select(&self, item: &str, candidates: &[Candidate]) -> Selection {
        if candidates.is_empty() {
            tracing::debug!(item, "no candidates, skipping selection");
            return Selection::NoMatch;
        }

        let messages = vec![
            ChatMessage::system(self.instruction.clone()),
            ChatMessage::user(selection_prompt(item, candidates)),
        ];

        match self.client.chat_completion(messages).await {
            Ok(reply) => {
                let selection = Selection::from_reply(&reply);
                tracing::debug!(item, candidates = candidates.len(), ?selection, "selected");
                selection
            }
            Err(e) => {
                tracing::warn!(item, "Selection failed, treating as no match: {}", e);
                Selection::NoMatch
            }
        }
    }
}

/// Text shown to the selection backend for one candidate
pub fn render_candidate(candidate: &Candidate) -> String {
    match candidate.content() {
        Some(content) => {
            let parsed = parse_candidate_text(content);
            if parsed.is_empty() {
                content.to_string()
            } else {
                parsed.to_json()
            }
        }
        None => candidate.to_string(),
    }
}

/// User turn listing the item and its bulleted candidates
pub fn selection_prompt(item: &str, candidates: &[Candidate]) -> String {
    let list = candidates
        .iter()
        .map(|c| format!("- {}", render_candidate(c)))
        .collect::<Vec<_>>()
        .join("\n");
    format!("User Input Item: {}\n\nCandidate Items:\n{}", item, list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ForecastAgentError, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedClient {
        reply: std::result::Result<String, String>,
        calls: AtomicUsize,
        last_user_turn: Mutex<Option<String>>,
    }

    impl ScriptedClient {
        fn new(reply: std::result::Result<&str, &str>) -> Self {
            Self {
                reply: reply.map(String::from).map_err(String::from),
                calls: AtomicUsize::new(0),
                last_user_turn: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedClient {
        async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_user_turn.lock().unwrap() =
                messages.last().map(|m| m.content.clone());
            self.reply
                .clone()
                .map_err(ForecastAgentError::ExternalError)
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_make_no_call() {
        let client = Arc::new(ScriptedClient::new(Ok("Widget")));
        let selector = CandidateSelector::new(client.clone(), "pick one");

        assert_eq!(selector.select("widget", &[]).await, Selection::NoMatch);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_call_and_trimmed_reply() {
        let client = Arc::new(ScriptedClient::new(Ok("  Widget\n")));
        let selector = CandidateSelector::new(client.clone(), "pick one");
        let candidates = vec![
            Candidate::from_content("name:Widget"),
            Candidate::from_content("Gadget"),
        ];

        let selection = selector.select("widgit", &candidates).await;
        assert_eq!(selection, Selection::Matched("Widget".to_string()));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);

        let turn = client.last_user_turn.lock().unwrap().clone().unwrap();
        assert_eq!(
            turn,
            "User Input Item: widgit\n\nCandidate Items:\n- {\"name\":\"Widget\"}\n- Gadget"
        );
    }

    #[tokio::test]
    async fn test_none_reply_is_no_match() {
        for reply in ["none", "None", " NONE ", ""] {
            let client = Arc::new(ScriptedClient::new(Ok(reply)));
            let selector = CandidateSelector::new(client.clone(), "pick one");
            let selection = selector
                .select("x", &[Candidate::from_content("y")])
                .await;
            assert_eq!(selection, Selection::NoMatch, "reply {:?}", reply);
            assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_backend_error_is_no_match() {
        let client = Arc::new(ScriptedClient::new(Err("rate limited")));
        let selector = CandidateSelector::new(client.clone(), "pick one");

        let selection = selector.select("x", &[Candidate::from_content("y")]).await;
        assert_eq!(selection, Selection::NoMatch);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_render_candidate_fallbacks() {
        let structured = Candidate::from_content("a,b:1,2");
        assert_eq!(render_candidate(&structured), r#"{"a":"1","b":"2"}"#);

        let plain = Candidate::from_content("flap box large");
        assert_eq!(render_candidate(&plain), "flap box large");

        let opaque = Candidate::from_json(&json!({"id": "c9"}));
        assert_eq!(
            render_candidate(&opaque),
            r#"{"fields":{"id":"c9"},"metadata":{}}"#
        );
    }

    #[test]
    fn test_selection_helpers() {
        let matched = Selection::Matched("Widget".to_string());
        assert_eq!(matched.matched_name(), Some("Widget"));
        assert_eq!(Selection::NoMatch.into_matched(), None);
    }
}
