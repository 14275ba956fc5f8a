//! Candidate retrieval from the external knowledge base

mod candidate;
mod export;
mod parser;
mod ragflow;
mod retriever;

pub use candidate::{Candidate, CONTENT_KEYS};
pub use export::{convert_csv_to_markdown, document_name};
pub use parser::{get_field, normalize_key, parse_candidate_text, FieldSource, ParsedCandidateRecord};
pub use ragflow::{parse_retrieval_response, RagFlowClient};
pub use retriever::{CandidateRetriever, KnowledgeBase, Retrieval, DEFAULT_RETRIEVAL_TIMEOUT};
