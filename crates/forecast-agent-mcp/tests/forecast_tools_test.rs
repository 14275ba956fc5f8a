//! Integration test for the MCP tool server
//!
//! Drives the JSON-RPC loop over in-memory buffers with fake backends.

use async_trait::async_trait;
use forecast_agent_core::error::{ForecastAgentError, Result};
use forecast_agent_core::{
    Candidate, ChatMessage, ForecastRecord, ForecastStore, KnowledgeBase, LLMClient, Pipeline,
    PipelineComponents, PipelineOptions, Prompts,
};
use forecast_agent_mcp::tools::*;
use forecast_agent_mcp::McpServer;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Selects the first candidate's `name` field verbatim
struct EchoSelector;

#[async_trait]
impl LLMClient for EchoSelector {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let user = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
        let name = user
            .split("\"name\":\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap_or("none");
        Ok(name.to_string())
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

/// Every item has one catalog hit named after its uppercase form
struct CatalogKnowledgeBase;

#[async_trait]
impl KnowledgeBase for CatalogKnowledgeBase {
    async fn search(&self, question: &str, _top_k: usize) -> Result<Vec<Candidate>> {
        if question == "unknown" {
            return Ok(Vec::new());
        }
        Ok(vec![Candidate::from_content(format!(
            "name:{}",
            question.to_uppercase()
        ))])
    }

    fn name(&self) -> &str {
        "catalog"
    }
}

#[derive(Default)]
struct FixedStore {
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl ForecastStore for FixedStore {
    async fn latest_forecast(&self, item: &str) -> Result<Option<ForecastRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ForecastAgentError::ExternalError("db down".into()));
        }
        let record = serde_json::from_value(json!({
            "forecast_date": "2024-11-01",
            "category_key": item,
            "demand_forecast": 10.0
        }))?;
        Ok(Some(record))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

fn pipeline(store: Arc<FixedStore>) -> Pipeline {
    Pipeline::new(
        PipelineComponents {
            llm: Arc::new(EchoSelector),
            knowledge_base: Arc::new(CatalogKnowledgeBase),
            store,
        },
        Prompts::default(),
        PipelineOptions::default(),
    )
}

async fn exchange(pipeline: &Pipeline, lines: &[Value]) -> Vec<Value> {
    let mut input = String::new();
    for line in lines {
        input.push_str(&line.to_string());
        input.push('\n');
    }
    exchange_raw(pipeline, &input).await
}

async fn exchange_raw(pipeline: &Pipeline, input: &str) -> Vec<Value> {
    let mut output = Vec::new();
    McpServer::new(pipeline)
        .serve(input.as_bytes(), &mut output)
        .await
        .unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn call(id: u64, tool: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": tool, "arguments": arguments }
    })
}

#[tokio::test]
async fn test_initialize_and_list_tools() {
    let pipeline = pipeline(Arc::new(FixedStore::default()));
    let responses = exchange(
        &pipeline,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "method": "ping"}),
            json!({"jsonrpc": "2.0", "method": "tools/call", "params": {"name": "get_demand_forecast", "arguments": {"item_names": "widget"}}}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        ],
    )
    .await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "Demand Forecast Agent");

    let names: Vec<&str> = responses[1]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["get_demand_forecast", "get_multiple_forecasts"]);
}

#[tokio::test]
async fn test_get_demand_forecast_string_and_list() {
    let pipeline = pipeline(Arc::new(FixedStore::default()));
    let responses = exchange(
        &pipeline,
        &[
            call(1, "get_demand_forecast", json!({"item_names": "widget"})),
            call(2, "get_demand_forecast", json!({"item_names": "widget, unknown"})),
            call(3, "get_multiple_forecasts", json!({"items": ["gadget"]})),
        ],
    )
    .await;

    assert_eq!(
        responses[0]["result"]["content"][0]["text"],
        "### Item: WIDGET\nForecast: 10"
    );
    assert_eq!(responses[0]["result"].get("isError"), None);
    assert_eq!(
        responses[0]["result"]["structuredContent"]["results"][0]["selected_item"],
        "WIDGET"
    );

    assert_eq!(
        responses[1]["result"]["content"][0]["text"],
        "### Item: WIDGET\nForecast: 10\n\n### Item: None\nNo forecast data found."
    );
    assert_eq!(
        responses[2]["result"]["content"][0]["text"],
        "### Item: GADGET\nForecast: 10"
    );
}

#[tokio::test]
async fn test_failures_are_in_band_tool_errors() {
    let store = Arc::new(FixedStore {
        fail: true,
        ..FixedStore::default()
    });
    let pipeline = pipeline(store.clone());
    let responses = exchange(
        &pipeline,
        &[
            call(1, "get_demand_forecast", json!({"item_names": "widget"})),
            call(2, "get_demand_forecast", json!({"item_names": 42})),
            call(3, "get_multiple_forecasts", json!({"items": "widget"})),
            call(4, "get_demand_forecast", json!({})),
            call(5, "no_such_tool", json!({})),
        ],
    )
    .await;

    assert_eq!(responses.len(), 5);
    for response in &responses {
        assert!(response.get("error").is_none(), "{}", response);
        assert_eq!(response["result"]["isError"], true);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error: "), "{}", text);
    }
    assert!(responses[0]["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("db down"));
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_protocol_errors() {
    let pipeline = pipeline(Arc::new(FixedStore::default()));
    let responses = exchange_raw(
        &pipeline,
        "{not json\n\n{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"bogus\"}\n",
    )
    .await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[1]["error"]["code"], -32601);
    assert_eq!(responses[1]["id"], 7);
}

#[tokio::test]
async fn test_tool_handlers_directly() {
    let pipeline = pipeline(Arc::new(FixedStore::default()));

    let result = handle_get_multiple_forecasts(&pipeline, json!({"items": ["a", "b"]}))
        .await
        .unwrap();
    assert_eq!(
        result.text(),
        Some("### Item: A\nForecast: 10\n\n### Item: B\nForecast: 10")
    );

    assert!(handle_get_demand_forecast(&pipeline, json!({"item_names": null}))
        .await
        .is_err());
}
