use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;
use webset_core::{
    CreateWebsetRequest, ItemsPage, SearchRequest, SearchResultMetadata, Webhook, Webset,
    WebsetError, WebsetItem, WebsetResult,
};

use crate::api::WebsetApi;

pub const EXA_API_BASE: &str = "https://api.exa.ai";

/// Items requested per page from the list endpoint
const ITEMS_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct ExaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchRequest<'a> {
    query: &'a str,
    num_results: u32,
    use_autoprompt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_domains: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude_domains: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_published_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_published_date: Option<&'a str>,
    contents: ExaContentsOptions,
}

#[derive(Debug, Serialize)]
struct ExaContentsOptions {
    text: bool,
}

impl<'a> From<&'a SearchRequest> for ExaSearchRequest<'a> {
    fn from(request: &'a SearchRequest) -> Self {
        Self {
            query: &request.query,
            num_results: request.num_results,
            use_autoprompt: request.use_autoprompt,
            include_domains: request.include_domains.as_deref(),
            exclude_domains: request.exclude_domains.as_deref(),
            start_published_date: request.start_published_date.as_deref(),
            end_published_date: request.end_published_date.as_deref(),
            contents: ExaContentsOptions { text: true },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchResponse {
    #[serde(default)]
    results: Vec<ExaSearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchResult {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    text: Option<String>,
}

impl From<ExaSearchResult> for SearchResultMetadata {
    fn from(result: ExaSearchResult) -> Self {
        let source = Url::parse(&result.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()));

        Self {
            title: result.title.unwrap_or_else(|| "Unknown Title".to_string()),
            source,
            url: result.url,
            published_date: result.published_date,
            author: result.author,
            score: result.score,
            text: result.text.unwrap_or_default(),
            id: result.id,
        }
    }
}

/// Item page as sent by Exa, before per-item validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItemsPage {
    #[serde(default)]
    data: Vec<serde_json::Value>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateWebhookRequest<'a> {
    events: &'a [String],
    url: &'a str,
}

impl ExaClient {
    pub fn new(api_key: impl Into<String>) -> WebsetResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| WebsetError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: EXA_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn websets_url(&self, path: &str) -> String {
        format!("{}/websets/v0{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> WebsetResult<T> {
        let response = request
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| WebsetError::network(format!("Exa API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WebsetError::api(format!(
                "request failed with {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| WebsetError::parse(format!("Failed to parse Exa response: {}", e)))
    }
}

/// Validate each raw item on its own; a malformed item is logged and
/// dropped instead of failing the page.
fn parse_items_page(raw: RawItemsPage) -> ItemsPage {
    let data = raw
        .data
        .into_iter()
        .filter_map(|value| {
            let id = value
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("<unknown>")
                .to_string();
            match serde_json::from_value::<WebsetItem>(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Skipping malformed webset item {}: {}", id, e);
                    None
                }
            }
        })
        .collect();

    ItemsPage {
        data,
        has_more: raw.has_more,
        next_cursor: raw.next_cursor,
    }
}

#[async_trait]
impl WebsetApi for ExaClient {
    #[instrument(skip(self, request), fields(query = %request.query))]
    async fn search(&self, request: &SearchRequest) -> WebsetResult<Vec<SearchResultMetadata>> {
        let url = format!("{}/search", self.base_url);
        let body = ExaSearchRequest::from(request);

        let response: ExaSearchResponse = self.send(self.client.post(&url).json(&body)).await?;
        debug!("Exa search returned {} results", response.results.len());

        Ok(response.results.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, request), fields(query = %request.search.query))]
    async fn create_webset(&self, request: &CreateWebsetRequest) -> WebsetResult<Webset> {
        let url = self.websets_url("/websets");
        self.send(self.client.post(&url).json(request)).await
    }

    #[instrument(skip(self))]
    async fn get_webset(&self, webset_id: &str) -> WebsetResult<Webset> {
        let url = self.websets_url(&format!("/websets/{}", webset_id));
        self.send(self.client.get(&url)).await
    }

    #[instrument(skip(self))]
    async fn list_items(&self, webset_id: &str, cursor: Option<&str>) -> WebsetResult<ItemsPage> {
        let url = self.websets_url(&format!("/websets/{}/items", webset_id));

        let mut query = vec![("limit", ITEMS_PAGE_SIZE.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let raw: RawItemsPage = self.send(self.client.get(&url).query(&query)).await?;
        Ok(parse_items_page(raw))
    }

    #[instrument(skip(self))]
    async fn create_webhook(&self, url: &str, events: &[String]) -> WebsetResult<Webhook> {
        let endpoint = self.websets_url("/webhooks");
        let body = CreateWebhookRequest { events, url };
        self.send(self.client.post(&endpoint).json(&body)).await
    }
}
