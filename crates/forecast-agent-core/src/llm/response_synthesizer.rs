//! Natural-language answer from per-item results

use super::{ChatMessage, LLMClient};
use crate::error::Result;
use crate::pipeline::ItemResult;
use std::sync::Arc;

/// LLM-backed response synthesizer
pub struct ResponseSynthesizer {
    client: Arc<dyn LLMClient>,
    instruction: String,
}

impl ResponseSynthesizer {
    pub fn new(client: Arc<dyn LLMClient>, instruction: impl Into<String>) -> Self {
        Self {
            client,
            instruction: instruction.into(),
        }
    }

    /// Answer `query` from `results`. The reply is returned as-is; errors propagate.
    pub async fn synthesize(&self, query: &str, results: &[ItemResult]) -> Result<String> {
        let messages = vec![
            ChatMessage::system(self.instruction.clone()),
            ChatMessage::user(format!("Query: {}\n\n{}", query, render_context(results))),
        ];
        self.client.chat_completion(messages).await
    }
}

/// One `Item / Selected Item / Data` block per result, blank-line separated
pub fn render_context(results: &[ItemResult]) -> String {
    results
        .iter()
        .map(|result| {
            let selected = result.selected_item.as_deref().unwrap_or("None");
            let data = match &result.demand_forecast {
                Some(record) => serde_json::to_string(record).unwrap_or_default(),
                None => "No data found".to_string(),
            };
            format!(
                "Item: {}\nSelected Item: {}\nData: {}",
                result.input_item, selected, data
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ForecastRecord;
    use chrono::NaiveDate;

    #[test]
    fn test_render_context_blocks() {
        let results = vec![
            ItemResult::resolved(
                "flapbox",
                "Flap_Box_Type_1",
                Some(ForecastRecord {
                    forecast_date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
                    category_key: "Flap_Box_Type_1".to_string(),
                    demand_forecast: Some(500.0),
                }),
            ),
            ItemResult::unmatched("ตู้"),
        ];

        assert_eq!(
            render_context(&results),
            "Item: flapbox\nSelected Item: Flap_Box_Type_1\n\
             Data: {\"forecast_date\":\"2024-10-01\",\"category_key\":\"Flap_Box_Type_1\",\"demand_forecast\":500.0}\n\n\
             Item: ตู้\nSelected Item: None\nData: No data found"
        );
    }
}
