//! Webset orchestration
//!
//! Ties the Exa client to the poller, classifier and flattener. Holds no
//! mutable state, so one instance is shared across requests.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};
use webset_core::{
    CreateWebsetRequest, FlatRecord, SearchRequest, SearchResponse, Webhook, Webset, WebsetItem,
    WebsetResult, WebsetStatus,
};
use webset_exa::WebsetApi;

use crate::classifier::FieldClassifier;
use crate::flattener::{ItemFlattener, UnmatchedPolicy};
use crate::id_map::EnrichmentIdMap;
use crate::poller::{CompletionPoller, PollOutcome, DEFAULT_POLL_INTERVAL};

/// Event Exa sends when a webset finishes processing
pub const WEBSET_IDLE_EVENT: &str = "webset.idle";

/// Flattened records of a webset together with the number of raw items fetched
#[derive(Debug, Clone)]
pub struct FormattedItems {
    pub records: Vec<FlatRecord>,
    pub item_count: usize,
}

pub struct WebsetService {
    api: Arc<dyn WebsetApi>,
    id_map: EnrichmentIdMap,
    policy: UnmatchedPolicy,
    poll_interval: Duration,
}

impl WebsetService {
    pub fn new(api: Arc<dyn WebsetApi>, id_map: EnrichmentIdMap, policy: UnmatchedPolicy) -> Self {
        Self {
            api,
            id_map,
            policy,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[instrument(skip(self, request), fields(query = %request.query))]
    pub async fn search(&self, request: &SearchRequest) -> WebsetResult<SearchResponse> {
        request.validate()?;
        let results = self.api.search(request).await?;
        info!("Found {} search results", results.len());
        Ok(SearchResponse::new(&request.query, results))
    }

    #[instrument(skip(self, request), fields(query = %request.search.query))]
    pub async fn create_webset(&self, request: &CreateWebsetRequest) -> WebsetResult<WebsetStatus> {
        request.validate()?;
        let webset = self.api.create_webset(request).await?;
        info!(
            "Webset created with ID: {} ({} enrichments)",
            webset.id,
            request.enrichments.len()
        );

        let mut status = WebsetStatus::from(&webset);
        if status.search.is_none() {
            status.search = Some(request.search.clone());
        }
        Ok(status)
    }

    pub async fn get_webset(&self, webset_id: &str) -> WebsetResult<Webset> {
        self.api.get_webset(webset_id).await
    }

    pub async fn get_status(&self, webset_id: &str) -> WebsetResult<WebsetStatus> {
        let webset = self.api.get_webset(webset_id).await?;
        Ok(WebsetStatus::from(&webset))
    }

    pub async fn wait(&self, webset_id: &str, timeout: Duration) -> WebsetResult<PollOutcome> {
        CompletionPoller::new(self.api.clone())
            .with_interval(self.poll_interval)
            .await_completion(webset_id, timeout)
            .await
    }

    #[instrument(skip(self))]
    pub async fn items(&self, webset_id: &str) -> WebsetResult<Vec<WebsetItem>> {
        let items = self.api.list_all_items(webset_id).await?;
        info!("Found {} items in the webset", items.len());
        Ok(items)
    }

    /// Fetch a webset's items and flatten them into records
    #[instrument(skip(self, known_fields))]
    pub async fn formatted(
        &self,
        webset_id: &str,
        known_fields: &[String],
    ) -> WebsetResult<FormattedItems> {
        let webset = self.api.get_webset(webset_id).await?;
        let items = self.items(webset_id).await?;
        Ok(FormattedItems {
            records: self.format_items(&webset, &items, known_fields),
            item_count: items.len(),
        })
    }

    /// Flatten items of `webset`. The configured ID map takes precedence
    /// over entries derived from the webset's enrichment definitions.
    pub fn format_items(
        &self,
        webset: &Webset,
        items: &[WebsetItem],
        known_fields: &[String],
    ) -> Vec<FlatRecord> {
        let mut id_map = self.id_map.clone();
        id_map.merge_missing(EnrichmentIdMap::from_webset(webset, known_fields));

        let flattener = ItemFlattener::new(
            FieldClassifier::new(id_map, known_fields.to_vec()),
            self.policy,
        );
        let records = flattener.flatten_all(items);
        info!("Formatted {} of {} items", records.len(), items.len());
        records
    }

    /// Ask Exa to call `url` when the webset becomes idle
    #[instrument(skip(self))]
    pub async fn register_idle_webhook(&self, url: &str) -> WebsetResult<Webhook> {
        let webhook = self
            .api
            .create_webhook(url, &[WEBSET_IDLE_EVENT.to_string()])
            .await?;
        info!("Registered webhook {} for {}", webhook.id, url);
        Ok(webhook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webset_core::{
        EnrichmentFormat, EnrichmentRequest, SearchParameters, SearchResultMetadata,
        WebsetEnrichment, WebsetError, WebsetState,
    };
    use webset_exa::testing::FakeWebsetApi;

    fn item(id: &str, enrichments: serde_json::Value) -> WebsetItem {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "source": "search",
            "websetId": "webset_1",
            "properties": {"type": "person", "url": format!("https://linkedin.com/in/{}", id),
                           "person": {"name": "Jan McCarthy"}},
            "enrichments": enrichments
        }))
        .unwrap()
    }

    fn service(api: FakeWebsetApi) -> (Arc<FakeWebsetApi>, WebsetService) {
        let api = Arc::new(api);
        let service = WebsetService::new(api.clone(), EnrichmentIdMap::new(), UnmatchedPolicy::Drop)
            .with_poll_interval(Duration::from_secs(1));
        (api, service)
    }

    #[tokio::test]
    async fn test_create_validates_before_calling_exa() {
        let (api, service) = service(FakeWebsetApi::new("webset_1"));
        let request = CreateWebsetRequest {
            search: SearchParameters {
                query: "founders".to_string(),
                count: 500,
            },
            enrichments: Vec::new(),
        };

        let err = service.create_webset(&request).await.unwrap_err();
        assert!(matches!(err, WebsetError::Validation(_)));
        assert!(api.created().is_empty());
    }

    #[tokio::test]
    async fn test_create_reports_search_parameters() {
        let (api, service) = service(FakeWebsetApi::new("webset_1"));
        let request = CreateWebsetRequest {
            search: SearchParameters {
                query: "founders in texas".to_string(),
                count: 3,
            },
            enrichments: vec![EnrichmentRequest::new("Email address", EnrichmentFormat::Email)],
        };

        let status = service.create_webset(&request).await.unwrap();
        assert_eq!(status.id, "webset_1");
        assert_eq!(status.status, WebsetState::Running);
        assert_eq!(status.search.unwrap().query, "founders in texas");
        assert_eq!(api.created().len(), 1);
    }

    #[tokio::test]
    async fn test_formatted_uses_webset_definitions() {
        let items = vec![
            item(
                "w1",
                serde_json::json!([
                    {"enrichmentId": "e_company", "format": "text", "result": ["Jan Studio"]},
                    {"enrichmentId": "e_other", "format": "email", "result": ["jan@studio.com"]}
                ]),
            ),
            item("w2", serde_json::json!([])),
        ];
        let api = FakeWebsetApi::new("webset_1")
            .with_items(items, 1)
            .with_enrichments(vec![WebsetEnrichment {
                id: "e_company".to_string(),
                status: None,
                title: None,
                description: Some(
                    "Extract the name of the company or business founded by the entrepreneur"
                        .to_string(),
                ),
                format: Some("text".to_string()),
            }]);
        let (_, service) = service(api);

        let formatted = service.formatted("webset_1", &[]).await.unwrap();
        assert_eq!(formatted.item_count, 2);
        let records = formatted.records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("Jan McCarthy"));
        // "Jan Studio" would look like a person's name by content alone
        assert_eq!(records[0].enrichments["Company Name"], "Jan Studio");
        assert_eq!(records[0].enrichments["Email"], "jan@studio.com");
        assert!(records[1].enrichments.is_empty());
    }

    #[tokio::test]
    async fn test_search_wraps_results() {
        let result = SearchResultMetadata {
            title: "Lab".to_string(),
            url: "https://lab.ai".to_string(),
            published_date: None,
            author: None,
            source: None,
            score: None,
            text: String::new(),
            id: None,
        };
        let (_, service) = service(
            FakeWebsetApi::new("webset_1").with_search_results(vec![result.clone(), result]),
        );

        let response = service.search(&SearchRequest::new("labs", 1)).await.unwrap();
        assert_eq!(response.total_results, 1);
        assert_eq!(response.query, "labs");

        let err = service.search(&SearchRequest::new(" ", 3)).await.unwrap_err();
        assert!(matches!(err, WebsetError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_idle_webhook() {
        let (api, service) = service(FakeWebsetApi::new("webset_1"));
        let webhook = service
            .register_idle_webhook("https://hooks.example.com/exa")
            .await
            .unwrap();

        assert_eq!(webhook.events, ["webset.idle"]);
        assert_eq!(
            api.webhooks(),
            [(
                "https://hooks.example.com/exa".to_string(),
                vec!["webset.idle".to_string()]
            )]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_uses_configured_interval() {
        let (api, service) = service(
            FakeWebsetApi::new("webset_1").with_statuses([WebsetState::Running, WebsetState::Idle]),
        );

        let start = tokio::time::Instant::now();
        let outcome = service
            .wait("webset_1", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(outcome.is_idle());
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert_eq!(api.status_calls(), 2);
    }
}
