//! LLM integration: client, prompts and the three completion stages

mod candidate_selector;
mod client;
mod item_extractor;
mod prompts;
mod response_synthesizer;

pub use candidate_selector::{
    render_candidate, selection_prompt, CandidateSelector, Selection, NO_MATCH_SENTINEL,
};
pub use client::{ChatMessage, LLMClient, OpenAiClient, ResponseSchema};
pub use item_extractor::{extracted_items_schema, ExtractedItems, ItemExtractor};
pub use prompts::Prompts;
pub use response_synthesizer::{render_context, ResponseSynthesizer};
