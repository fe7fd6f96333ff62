//! Exa search request and result types exposed by the HTTP API

use serde::{Deserialize, Serialize};

use crate::error::{WebsetError, WebsetResult};

/// Upper bound for `num_results`
pub const MAX_NUM_RESULTS: u32 = 100;

/// Search request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_num_results")]
    pub num_results: u32,
    #[serde(default = "default_use_autoprompt")]
    pub use_autoprompt: bool,
    #[serde(default)]
    pub include_domains: Option<Vec<String>>,
    #[serde(default)]
    pub exclude_domains: Option<Vec<String>>,
    /// ISO 8601 date
    #[serde(default)]
    pub start_published_date: Option<String>,
    /// ISO 8601 date
    #[serde(default)]
    pub end_published_date: Option<String>,
}

fn default_num_results() -> u32 {
    3
}

fn default_use_autoprompt() -> bool {
    true
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, num_results: u32) -> Self {
        Self {
            query: query.into(),
            num_results,
            use_autoprompt: true,
            include_domains: None,
            exclude_domains: None,
            start_published_date: None,
            end_published_date: None,
        }
    }

    pub fn validate(&self) -> WebsetResult<()> {
        if self.query.trim().is_empty() {
            return Err(WebsetError::validation("query must not be empty"));
        }
        if self.num_results == 0 || self.num_results > MAX_NUM_RESULTS {
            return Err(WebsetError::validation(format!(
                "num_results must be between 1 and {}, got {}",
                MAX_NUM_RESULTS, self.num_results
            )));
        }
        Ok(())
    }
}

/// Metadata extracted from one search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultMetadata {
    pub title: String,
    pub url: String,
    pub published_date: Option<String>,
    pub author: Option<String>,
    pub source: Option<String>,
    pub score: Option<f64>,
    pub text: String,
    pub id: Option<String>,
}

/// Search response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResultMetadata>,
    pub total_results: usize,
}

impl SearchResponse {
    pub fn new(query: impl Into<String>, results: Vec<SearchResultMetadata>) -> Self {
        Self {
            query: query.into(),
            total_results: results.len(),
            results,
        }
    }
}
