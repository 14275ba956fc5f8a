//! Item-resolution pipeline
//!
//! A run turns its input into item names (directly or through LLM
//! extraction), then resolves every item through retrieval, candidate
//! selection and forecast lookup, and finally renders one answer. Items are
//! isolated from each other: a missing match degrades that item's result,
//! while a store failure fails the run.

mod format;
mod normalize;

pub use format::{forecast_value, format_forecast, format_summary};
pub use normalize::{normalize_input, PipelineInput};

use crate::config::{Config, PipelineMode};
use crate::error::{ForecastAgentError, Result};
use crate::llm::{
    CandidateSelector, ItemExtractor, LLMClient, OpenAiClient, Prompts, ResponseSynthesizer,
    Selection,
};
use crate::retrieval::{CandidateRetriever, KnowledgeBase, RagFlowClient, DEFAULT_RETRIEVAL_TIMEOUT};
use crate::store::{open_store, ForecastRecord, ForecastStore};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-item message when selection found nothing
pub const NO_MATCH_MESSAGE: &str = "Could not find a matching item in the retrieval candidates.";

/// Outcome for one item; produced for every item that was processed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResult {
    pub input_item: String,
    pub selected_item: Option<String>,
    pub demand_forecast: Option<ForecastRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ItemResult {
    pub fn resolved(
        input_item: impl Into<String>,
        selected_item: impl Into<String>,
        demand_forecast: Option<ForecastRecord>,
    ) -> Self {
        Self {
            input_item: input_item.into(),
            selected_item: Some(selected_item.into()),
            demand_forecast,
            message: None,
        }
    }

    pub fn unmatched(input_item: impl Into<String>) -> Self {
        Self {
            input_item: input_item.into(),
            selected_item: None,
            demand_forecast: None,
            message: Some(NO_MATCH_MESSAGE.to_string()),
        }
    }
}

/// Terminal output of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    /// One entry per item, in input order
    pub results: Vec<ItemResult>,
    /// Answer text
    pub demand_forecast: String,
}

/// External collaborators of the pipeline
pub struct PipelineComponents {
    pub llm: Arc<dyn LLMClient>,
    pub knowledge_base: Arc<dyn KnowledgeBase>,
    pub store: Arc<dyn ForecastStore>,
}

/// Tunables for a pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub mode: PipelineMode,
    pub top_k: usize,
    pub concurrency: usize,
    pub retrieval_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            mode: PipelineMode::Direct,
            top_k: 5,
            concurrency: 1,
            retrieval_timeout: DEFAULT_RETRIEVAL_TIMEOUT,
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.pipeline.mode,
            top_k: config.retrieval.top_k.max(1),
            concurrency: config.pipeline.concurrency.max(1),
            retrieval_timeout: Duration::from_secs(config.retrieval.timeout_secs),
        }
    }
}

/// Pipeline orchestrator; build once and share behind an `Arc`
pub struct Pipeline {
    extractor: ItemExtractor,
    retriever: CandidateRetriever,
    selector: CandidateSelector,
    synthesizer: ResponseSynthesizer,
    store: Arc<dyn ForecastStore>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(components: PipelineComponents, prompts: Prompts, options: PipelineOptions) -> Self {
        let PipelineComponents {
            llm,
            knowledge_base,
            store,
        } = components;

        Self {
            extractor: ItemExtractor::new(llm.clone(), prompts.extract_item),
            retriever: CandidateRetriever::new(knowledge_base)
                .with_timeout(options.retrieval_timeout),
            selector: CandidateSelector::new(llm.clone(), prompts.select_item),
            synthesizer: ResponseSynthesizer::new(llm, prompts.synthesize_response),
            store,
            options,
        }
    }

    /// Wire the OpenAI-compatible client, RAGFlow and the configured store
    pub fn from_config(config: &Config) -> Result<Self> {
        let prompts = Prompts::load(config.pipeline.prompts_dir.as_deref())?;
        let llm: Arc<dyn LLMClient> = Arc::new(OpenAiClient::new(config.llm.clone())?);
        let knowledge_base: Arc<dyn KnowledgeBase> =
            Arc::new(RagFlowClient::new(config.retrieval.clone())?);
        let store = open_store(&config.store)?;

        tracing::info!(
            mode = ?config.pipeline.mode,
            model = llm.model_name(),
            retrieval = knowledge_base.name(),
            store = store.name(),
            "pipeline ready"
        );

        Ok(Self::new(
            PipelineComponents {
                llm,
                knowledge_base,
                store,
            },
            prompts,
            PipelineOptions::from_config(config),
        ))
    }

    pub fn mode(&self) -> PipelineMode {
        self.options.mode
    }

    /// Same pipeline, different operating mode
    pub fn with_mode(mut self, mode: PipelineMode) -> Self {
        self.options.mode = mode;
        self
    }

    /// Run the full pipeline for one input
    pub async fn run(&self, input: &PipelineInput) -> Result<PipelineResult> {
        let start = Instant::now();
        tracing::info!(mode = ?self.options.mode, input = %input, "pipeline run started");

        let items = self.items_for(input).await?;
        let results = self.resolve_all(&items).await?;

        let answer = match self.options.mode {
            PipelineMode::Direct => format_summary(&results),
            PipelineMode::Assisted => {
                self.synthesizer
                    .synthesize(&input.to_string(), &results)
                    .await?
            }
        };

        tracing::info!(
            items = results.len(),
            matched = results.iter().filter(|r| r.selected_item.is_some()).count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pipeline run finished"
        );

        Ok(PipelineResult {
            results,
            demand_forecast: answer,
        })
    }

    /// Item names a run would process for `input` under the current mode
    pub async fn items_for(&self, input: &PipelineInput) -> Result<Vec<String>> {
        let items = match (self.options.mode, input) {
            (PipelineMode::Assisted, PipelineInput::Text(query)) => {
                let items = self.extractor.extract(query).await?;
                if items.is_empty() {
                    return Err(ForecastAgentError::NoItemsExtracted(query.clone()));
                }
                items
            }
            _ => normalize_input(input),
        };

        if items.is_empty() {
            return Err(ForecastAgentError::InvalidInput(
                "No item names given".to_string(),
            ));
        }
        Ok(items)
    }

    /// Retrieval plus selection for one item
    pub async fn match_item(&self, item: &str) -> Selection {
        let retrieval = self.retriever.retrieve(item, self.options.top_k).await;
        tracing::debug!(item, candidates = retrieval.len(), "retrieved");
        self.selector
            .select(item, &retrieval.into_candidates())
            .await
    }

    /// Latest forecast for an exact canonical name
    pub async fn forecast(&self, item: &str) -> Result<Option<ForecastRecord>> {
        self.store.latest_forecast(item).await
    }

    /// Resolve one item end to end. Only a store failure is an error.
    pub async fn resolve_item(&self, item: &str) -> Result<ItemResult> {
        let Some(selected) = self.match_item(item).await.into_matched() else {
            tracing::info!(item, "no matching candidate");
            return Ok(ItemResult::unmatched(item));
        };

        let forecast = self.forecast(&selected).await?;
        tracing::debug!(item, selected = %selected, found = forecast.is_some(), "looked up");
        Ok(ItemResult::resolved(item, selected, forecast))
    }

    async fn resolve_all(&self, items: &[String]) -> Result<Vec<ItemResult>> {
        if self.options.concurrency <= 1 || items.len() <= 1 {
            let mut results = Vec::with_capacity(items.len());
            for item in items {
                results.push(self.resolve_item(item).await?);
            }
            return Ok(results);
        }

        tracing::debug!(
            items = items.len(),
            concurrency = self.options.concurrency,
            "resolving items concurrently"
        );

        // Owned items: the run future must stay Send
        let mut indexed: Vec<_> = stream::iter(items.iter().cloned().enumerate())
            .map(|(idx, item)| async move { (idx, self.resolve_item(&item).await) })
            .buffer_unordered(self.options.concurrency)
            .collect()
            .await;

        indexed.sort_by_key(|(idx, _)| *idx);
        indexed.into_iter().map(|(_, result)| result).collect()
    }
}
