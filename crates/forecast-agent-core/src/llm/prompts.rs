//! Instruction templates for the three LLM stages

use crate::error::Result;
use std::path::Path;

const EXTRACT_ITEM_FILE: &str = "extract_item.txt";
const SELECT_ITEM_FILE: &str = "select_item.txt";
const SYNTHESIZE_RESPONSE_FILE: &str = "synthesize_response.txt";

const DEFAULT_EXTRACT_ITEM: &str = "\
You extract inventory item names from user requests about demand forecasts.
Return every distinct item the user mentions, in the order they appear, using the
wording the user used (do not translate, pluralize or invent items).
Ignore quantities, dates, percentages and other non-item words.
If the request names no item, return an empty list.
Respond with JSON of the form {\"items\": [\"<item>\", ...]} and nothing else.";

const DEFAULT_SELECT_ITEM: &str = "\
You match a user's item name to one entry from a list of candidate catalog records.
Each candidate is either a JSON object of catalog fields or a line of text.
Pick the single candidate that refers to the same real-world item, tolerating
spelling differences, spacing, abbreviations and language differences.
Answer with the candidate's canonical item name exactly as written in the candidate
and nothing else. If no candidate is an acceptable match, answer with: none";

const DEFAULT_SYNTHESIZE_RESPONSE: &str = "\
You answer questions about inventory demand forecasts.
You receive the user's query and, for every item, the extracted item, the catalog item
it was matched to (or None) and the latest forecast data (or \"No data found\").
Answer the query directly and concisely in the user's language, quoting forecast
values and dates exactly as given. When an item has no match or no data, say so
plainly. Never invent numbers.";

/// Prompt set used by the extractor, selector and synthesizer
#[derive(Debug, Clone)]
pub struct Prompts {
    pub extract_item: String,
    pub select_item: String,
    pub synthesize_response: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            extract_item: DEFAULT_EXTRACT_ITEM.to_string(),
            select_item: DEFAULT_SELECT_ITEM.to_string(),
            synthesize_response: DEFAULT_SYNTHESIZE_RESPONSE.to_string(),
        }
    }
}

impl Prompts {
    /// Built-in prompts, overridden by any files present in `dir`
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut prompts = Self::default();
        let Some(dir) = dir else {
            return Ok(prompts);
        };

        if let Some(text) = read_override(dir, EXTRACT_ITEM_FILE)? {
            prompts.extract_item = text;
        }
        if let Some(text) = read_override(dir, SELECT_ITEM_FILE)? {
            prompts.select_item = text;
        }
        if let Some(text) = read_override(dir, SYNTHESIZE_RESPONSE_FILE)? {
            prompts.synthesize_response = text;
        }
        Ok(prompts)
    }
}

fn read_override(dir: &Path, file: &str) -> Result<Option<String>> {
    let path = dir.join(file);
    if !path.is_file() {
        tracing::debug!("No prompt override at {}, using built-in", path.display());
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    tracing::info!("Loaded prompt override {}", path.display());
    Ok(Some(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_dir_uses_builtins() {
        let prompts = Prompts::load(None).unwrap();
        assert!(prompts.select_item.contains("none"));
        assert!(prompts.extract_item.contains("\"items\""));
    }

    #[test]
    fn test_load_overrides_present_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SELECT_ITEM_FILE), "  custom selector\n").unwrap();
        std::fs::write(dir.path().join(SYNTHESIZE_RESPONSE_FILE), "   \n").unwrap();

        let prompts = Prompts::load(Some(dir.path())).unwrap();
        assert_eq!(prompts.select_item, "custom selector");
        assert_eq!(prompts.extract_item, DEFAULT_EXTRACT_ITEM);
        assert_eq!(prompts.synthesize_response, DEFAULT_SYNTHESIZE_RESPONSE);
    }
}
