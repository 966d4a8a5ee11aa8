//! Web Search Tool
//!
//! Looks up grammar rules, usage examples and reading material through the
//! Tavily search API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use agent_core::{
    AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Upper bound on one search call, body included
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_MAX_RESULTS: u64 = 3;
const MAX_RESULTS_LIMIT: u64 = 10;

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// One search result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

pub struct WebSearchTool {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl WebSearchTool {
    pub const NAME: &'static str = "web_search";

    pub fn new(api_key: impl Into<String>) -> CoreResult<Self> {
        Self::with_timeout(api_key, DEFAULT_SEARCH_TIMEOUT)
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("search HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: TAVILY_SEARCH_URL.into(),
            timeout,
        })
    }

    /// Point the tool at another search endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn search(&self, query: &str, max_results: u64) -> Result<Vec<SearchHit>, String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SearchRequest {
                api_key: &self.api_key,
                query,
                max_results,
            })
            .send()
            .await
            .map_err(|e| format!("Search request failed: {}", self.describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Search API returned {status}"));
        }

        response
            .json::<SearchResponse>()
            .await
            .map(|body| body.results)
            .map_err(|e| format!("Unreadable search response: {}", self.describe(&e)))
    }

    fn describe(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("timed out after {}ms", self.timeout.as_millis())
        } else {
            err.to_string()
        }
    }
}

fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results for '{query}'.");
    }

    let mut output = format!("Results for '{query}':\n");
    for (i, hit) in hits.iter().enumerate() {
        output.push_str(&format!(
            "\n{}. {}\n   {}\n   {}\n",
            i + 1,
            hit.title,
            hit.url,
            hit.content.trim()
        ));
    }
    output
}

#[async_trait]
impl Tool for WebSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.into(),
            description: "Search the web for grammar explanations, example sentences or reading material. Returns titles, links and snippets.".into(),
            parameters: vec![
                ParameterSchema::required("query", "string", "What to search for"),
                ParameterSchema::optional(
                    "max_results",
                    "number",
                    "Number of results to return (default: 3, max: 10)",
                ),
            ],
            category: Some("research".into()),
            has_side_effects: true,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.str_arg("query").map(str::trim).unwrap_or_default();
        if query.is_empty() {
            return Ok(ToolResult::failure(Self::NAME, "Query must not be empty"));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_results = call
            .f64_arg("max_results")
            .filter(|n| n.is_finite() && *n >= 1.0)
            .map_or(DEFAULT_MAX_RESULTS, |n| n as u64)
            .min(MAX_RESULTS_LIMIT);

        match self.search(query, max_results).await {
            Ok(hits) => {
                tracing::debug!(query, hits = hits.len(), "Web search complete");
                Ok(ToolResult::success(Self::NAME, format_hits(query, &hits))
                    .with_data(serde_json::json!({ "results": hits })))
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Web search failed");
                Ok(ToolResult::failure(Self::NAME, e))
            }
        }
    }
}
