//! Webset (asynchronous search + enrichment job) data structures

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{WebsetError, WebsetResult};

/// Upper bound Exa accepts for a webset search count
pub const MAX_SEARCH_COUNT: u32 = 100;

/// Status of a webset as reported by Exa.
///
/// Exa only guarantees `idle` as the ready state. The other known values are
/// kept distinct so callers can tell a job that is still working apart from
/// one that will never become idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WebsetState {
    Idle,
    Pending,
    Running,
    Paused,
    Canceled,
    Failed,
    Unknown(String),
}

impl WebsetState {
    pub fn as_str(&self) -> &str {
        match self {
            WebsetState::Idle => "idle",
            WebsetState::Pending => "pending",
            WebsetState::Running => "running",
            WebsetState::Paused => "paused",
            WebsetState::Canceled => "canceled",
            WebsetState::Failed => "failed",
            WebsetState::Unknown(raw) => raw.as_str(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, WebsetState::Idle)
    }

    /// Terminal states that will never reach `idle` on their own
    pub fn is_failure(&self) -> bool {
        matches!(self, WebsetState::Canceled | WebsetState::Failed)
    }
}

impl From<String> for WebsetState {
    fn from(raw: String) -> Self {
        match raw.to_lowercase().as_str() {
            "idle" => WebsetState::Idle,
            "pending" => WebsetState::Pending,
            "running" | "processing" => WebsetState::Running,
            "paused" => WebsetState::Paused,
            "canceled" | "cancelled" => WebsetState::Canceled,
            "failed" | "error" => WebsetState::Failed,
            _ => WebsetState::Unknown(raw),
        }
    }
}

impl From<WebsetState> for String {
    fn from(state: WebsetState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for WebsetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format requested for an enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentFormat {
    #[default]
    Text,
    Date,
    Number,
    Options,
    Email,
    Phone,
    Url,
}

impl EnrichmentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentFormat::Text => "text",
            EnrichmentFormat::Date => "date",
            EnrichmentFormat::Number => "number",
            EnrichmentFormat::Options => "options",
            EnrichmentFormat::Email => "email",
            EnrichmentFormat::Phone => "phone",
            EnrichmentFormat::Url => "url",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentOption {
    pub label: String,
}

/// A structured extraction requested at webset creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRequest {
    /// Detailed description of what to extract
    pub description: String,
    #[serde(default)]
    pub format: EnrichmentFormat,
    /// Choices for the `options` format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<EnrichmentOption>>,
}

impl EnrichmentRequest {
    pub fn new(description: impl Into<String>, format: EnrichmentFormat) -> Self {
        Self {
            description: description.into(),
            format,
            options: None,
        }
    }
}

/// Search parameters of a webset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameters {
    pub query: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    3
}

/// Body for creating a webset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWebsetRequest {
    pub search: SearchParameters,
    pub enrichments: Vec<EnrichmentRequest>,
}

impl CreateWebsetRequest {
    pub fn validate(&self) -> WebsetResult<()> {
        if self.search.query.trim().is_empty() {
            return Err(WebsetError::validation("search query must not be empty"));
        }
        if self.search.count == 0 || self.search.count > MAX_SEARCH_COUNT {
            return Err(WebsetError::validation(format!(
                "search count must be between 1 and {}, got {}",
                MAX_SEARCH_COUNT, self.search.count
            )));
        }
        if let Some(pos) = self
            .enrichments
            .iter()
            .position(|e| e.description.trim().is_empty())
        {
            return Err(WebsetError::validation(format!(
                "enrichment {} has an empty description",
                pos
            )));
        }
        Ok(())
    }
}

/// A search attached to a webset, as reported by Exa
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsetSearch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub query: String,
    #[serde(default)]
    pub count: Option<u32>,
}

/// An enrichment definition attached to a webset, as reported by Exa
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsetEnrichment {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

/// A webset as returned by the Exa Websets API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webset {
    pub id: String,
    pub status: WebsetState,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub searches: Vec<WebsetSearch>,
    #[serde(default)]
    pub enrichments: Vec<WebsetEnrichment>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Webset {
    /// Search parameters of the first search, if Exa reported one
    pub fn search_parameters(&self) -> Option<SearchParameters> {
        self.searches.first().map(|s| SearchParameters {
            query: s.query.clone(),
            count: s.count.unwrap_or_else(default_count),
        })
    }
}

/// Webset status summary returned by the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsetStatus {
    pub id: String,
    pub status: WebsetState,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub search: Option<SearchParameters>,
}

impl From<&Webset> for WebsetStatus {
    fn from(webset: &Webset) -> Self {
        Self {
            id: webset.id.clone(),
            status: webset.status.clone(),
            created_at: webset.created_at,
            updated_at: webset.updated_at,
            search: webset.search_parameters(),
        }
    }
}

/// Registered webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parsing() {
        let state: WebsetState = serde_json::from_str("\"idle\"").unwrap();
        assert!(state.is_idle());

        let state: WebsetState = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(state, WebsetState::Running);
        assert!(!state.is_failure());

        let state: WebsetState = serde_json::from_str("\"cancelled\"").unwrap();
        assert!(state.is_failure());

        let state: WebsetState = serde_json::from_str("\"enriching\"").unwrap();
        assert_eq!(state, WebsetState::Unknown("enriching".to_string()));
        assert_eq!(serde_json::to_string(&state).unwrap(), "\"enriching\"");
    }

    #[test]
    fn test_webset_from_exa_payload() {
        let payload = serde_json::json!({
            "id": "webset_cmaqrbpy900b5mk0ialbn5z07",
            "object": "webset",
            "status": "running",
            "externalId": null,
            "searches": [{
                "id": "ws_search_1",
                "status": "running",
                "query": "entrepreneurs in the usa",
                "count": 3
            }],
            "enrichments": [{
                "id": "wenrich_1",
                "status": "pending",
                "description": "Extract the email address of the entrepreneur",
                "format": "email"
            }],
            "createdAt": "2025-05-16T13:04:05.123Z",
            "updatedAt": "2025-05-16T13:05:00Z"
        });

        let webset: Webset = serde_json::from_value(payload).unwrap();
        assert_eq!(webset.status, WebsetState::Running);
        assert_eq!(webset.enrichments[0].format.as_deref(), Some("email"));

        let status = WebsetStatus::from(&webset);
        let search = status.search.unwrap();
        assert_eq!(search.query, "entrepreneurs in the usa");
        assert_eq!(search.count, 3);
        assert!(status.created_at.is_some());
    }

    #[test]
    fn test_create_request_validation() {
        let mut request: CreateWebsetRequest = serde_json::from_value(serde_json::json!({
            "search": {"query": "founders in texas"},
            "enrichments": [{"description": "Email address", "format": "email"}]
        }))
        .unwrap();
        assert_eq!(request.search.count, 3);
        assert_eq!(request.enrichments[0].format, EnrichmentFormat::Email);
        assert!(request.validate().is_ok());

        request.search.count = 101;
        assert!(matches!(
            request.validate(),
            Err(WebsetError::Validation(_))
        ));

        request.search.count = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_enrichment_format_defaults_to_text() {
        let request: EnrichmentRequest =
            serde_json::from_value(serde_json::json!({"description": "Company founding year"}))
                .unwrap();
        assert_eq!(request.format, EnrichmentFormat::Text);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["format"], "text");
        assert!(json.get("options").is_none());
    }
}
