//! Bounded candidate retrieval with timeout and empty-result fallback

use super::Candidate;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Default hard limit around a single retrieval call
pub const DEFAULT_RETRIEVAL_TIMEOUT: Duration = Duration::from_secs(45);

/// External knowledge-base search backend
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Search the preconfigured datasets for `question`, at most `top_k` hits
    async fn search(&self, question: &str, top_k: usize) -> Result<Vec<Candidate>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Outcome of one retrieval attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    /// At least one candidate came back
    Found(Vec<Candidate>),
    /// The backend answered with no hits
    Empty,
    /// The backend did not answer within the timeout
    TimedOut,
    /// The backend failed; the reason is kept for diagnostics only
    Unavailable(String),
}

impl Retrieval {
    /// Candidates to select from; every degraded outcome is an empty pool
    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            Retrieval::Found(candidates) => candidates,
            Retrieval::Empty | Retrieval::TimedOut | Retrieval::Unavailable(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Retrieval::Found(candidates) => candidates.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wraps a [`KnowledgeBase`] so a slow or failing backend degrades to no candidates
pub struct CandidateRetriever {
    backend: Arc<dyn KnowledgeBase>,
    timeout: Duration,
}

impl CandidateRetriever {
    pub fn new(backend: Arc<dyn KnowledgeBase>) -> Self {
        Self {
            backend,
            timeout: DEFAULT_RETRIEVAL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retrieve candidates for one item. Never fails.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Retrieval {
        match tokio::time::timeout(self.timeout, self.backend.search(question, top_k)).await {
            Ok(Ok(candidates)) if candidates.is_empty() => Retrieval::Empty,
            Ok(Ok(mut candidates)) => {
                candidates.truncate(top_k);
                Retrieval::Found(candidates)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    question,
                    "Retrieval failed, continuing without candidates: {}",
                    e
                );
                Retrieval::Unavailable(e.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    question,
                    top_k,
                    timeout_secs = self.timeout.as_secs(),
                    "Retrieval timed out, continuing without candidates"
                );
                Retrieval::TimedOut
            }
        }
    }
}
