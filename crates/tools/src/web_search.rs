//! Web search tool backed by the Tavily search API.
//!
//! Requires an API key. When the key is absent the tool stays registered
//! and returns an explicit "unavailable" message instead of failing, so
//! the model can tell the user why it cannot search.

use async_trait::async_trait;
use infoagent_core::error::ToolError;
use infoagent_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use tracing::debug;

const SEARCH_URL: &str = "https://api.tavily.com/search";
const MAX_RESULTS: usize = 3;

pub struct WebSearchTool {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self { api_key, client }
    }

    async fn search(&self, api_key: &str, query: &str) -> Result<SearchResponse, reqwest::Error> {
        debug!(query, "Sending search request");
        let body = serde_json::json!({
            "api_key": api_key,
            "query": query,
            "max_results": MAX_RESULTS,
        });

        let response = self
            .client
            .post(SEARCH_URL)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        response.json().await
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for recent news, facts, or any information. Returns up to three \
         results with title, summary, and URL."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(ToolResult::error(
                "Search unavailable: TAVILY_API_KEY not set.",
            ));
        };

        let response = match self.search(api_key, query).await {
            Ok(response) => response,
            Err(e) => return Ok(ToolResult::error(format!("Search error: {e}"))),
        };

        if response.results.is_empty() {
            return Ok(ToolResult::error(format!(
                "No results found for: '{query}'"
            )));
        }

        match format_results(&response.results) {
            Some(text) => Ok(ToolResult::ok(text)),
            None => Ok(ToolResult::error(format!(
                "No usable results for: '{query}'"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    url: String,
}

/// Render up to [`MAX_RESULTS`] entries as a numbered plain-text list.
/// Returns `None` when no entry has any usable field.
fn format_results(results: &[SearchResult]) -> Option<String> {
    let mut formatted = Vec::new();

    for (i, result) in results.iter().take(MAX_RESULTS).enumerate() {
        let title = result.title.trim();
        let content = if result.content.trim().is_empty() {
            result.snippet.trim()
        } else {
            result.content.trim()
        };
        let url = result.url.trim();

        let parts: Vec<&str> = [title, content, url]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        if !parts.is_empty() {
            formatted.push(format!("[{}] {}", i + 1, parts.join("\n    ")));
        }
    }

    if formatted.is_empty() {
        None
    } else {
        Some(formatted.join("\n\n"))
    }
}
