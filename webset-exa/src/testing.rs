//! In-memory [`WebsetApi`] for tests
//!
//! Scripts the status sequence a webset goes through and the item pages it
//! returns, and records what callers sent.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use webset_core::{
    CreateWebsetRequest, ItemsPage, SearchRequest, SearchResultMetadata, Webhook, Webset,
    WebsetEnrichment, WebsetError, WebsetItem, WebsetResult, WebsetSearch, WebsetState,
};

use crate::api::WebsetApi;

#[derive(Default)]
struct FakeState {
    statuses: VecDeque<WebsetState>,
    status_calls: usize,
    created: Vec<CreateWebsetRequest>,
    webhooks: Vec<(String, Vec<String>)>,
}

pub struct FakeWebsetApi {
    webset_id: String,
    enrichments: Vec<WebsetEnrichment>,
    pages: Vec<ItemsPage>,
    search_results: Vec<SearchResultMetadata>,
    error: Option<String>,
    state: Mutex<FakeState>,
}

impl FakeWebsetApi {
    pub fn new(webset_id: impl Into<String>) -> Self {
        Self {
            webset_id: webset_id.into(),
            enrichments: Vec::new(),
            pages: Vec::new(),
            search_results: Vec::new(),
            error: None,
            state: Mutex::new(FakeState {
                statuses: VecDeque::from([WebsetState::Idle]),
                ..FakeState::default()
            }),
        }
    }

    /// Statuses returned by successive `get_webset` calls; the last one
    /// repeats forever.
    pub fn with_statuses(self, statuses: impl IntoIterator<Item = WebsetState>) -> Self {
        self.state.lock().statuses = statuses.into_iter().collect();
        self
    }

    /// Serve `items` as pages of `page_size`, linked by `page-N` cursors
    pub fn with_items(mut self, items: Vec<WebsetItem>, page_size: usize) -> Self {
        let chunks: Vec<Vec<WebsetItem>> = items
            .chunks(page_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        let count = chunks.len();

        self.pages = chunks
            .into_iter()
            .enumerate()
            .map(|(i, data)| ItemsPage {
                data,
                has_more: i + 1 < count,
                next_cursor: (i + 1 < count).then(|| format!("page-{}", i + 1)),
            })
            .collect();
        self
    }

    pub fn with_enrichments(mut self, enrichments: Vec<WebsetEnrichment>) -> Self {
        self.enrichments = enrichments;
        self
    }

    pub fn with_search_results(mut self, results: Vec<SearchResultMetadata>) -> Self {
        self.search_results = results;
        self
    }

    /// Fail every call with an API error carrying `message`
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub fn status_calls(&self) -> usize {
        self.state.lock().status_calls
    }

    pub fn created(&self) -> Vec<CreateWebsetRequest> {
        self.state.lock().created.clone()
    }

    pub fn webhooks(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().webhooks.clone()
    }

    fn check_error(&self) -> WebsetResult<()> {
        match &self.error {
            Some(message) => Err(WebsetError::api(message.clone())),
            None => Ok(()),
        }
    }

    fn webset(&self, status: WebsetState, search: Option<WebsetSearch>) -> Webset {
        Webset {
            id: self.webset_id.clone(),
            status,
            external_id: None,
            searches: search.into_iter().collect(),
            enrichments: self.enrichments.clone(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[async_trait]
impl WebsetApi for FakeWebsetApi {
    async fn search(&self, request: &SearchRequest) -> WebsetResult<Vec<SearchResultMetadata>> {
        self.check_error()?;
        Ok(self
            .search_results
            .iter()
            .take(request.num_results as usize)
            .cloned()
            .collect())
    }

    async fn create_webset(&self, request: &CreateWebsetRequest) -> WebsetResult<Webset> {
        self.check_error()?;
        self.state.lock().created.push(request.clone());

        let search = WebsetSearch {
            id: None,
            status: Some("created".to_string()),
            query: request.search.query.clone(),
            count: Some(request.search.count),
        };
        Ok(self.webset(WebsetState::Running, Some(search)))
    }

    async fn get_webset(&self, webset_id: &str) -> WebsetResult<Webset> {
        self.check_error()?;
        if webset_id != self.webset_id {
            return Err(WebsetError::api(format!(
                "request failed with 404 Not Found: webset {} not found",
                webset_id
            )));
        }

        let status = {
            let mut state = self.state.lock();
            state.status_calls += 1;
            if state.statuses.len() > 1 {
                state.statuses.pop_front()
            } else {
                state.statuses.front().cloned()
            }
        };

        Ok(self.webset(status.unwrap_or(WebsetState::Idle), None))
    }

    async fn list_items(&self, webset_id: &str, cursor: Option<&str>) -> WebsetResult<ItemsPage> {
        self.check_error()?;
        if webset_id != self.webset_id {
            return Err(WebsetError::api(format!(
                "request failed with 404 Not Found: webset {} not found",
                webset_id
            )));
        }

        let index = match cursor {
            None => 0,
            Some(cursor) => cursor
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| WebsetError::api(format!("invalid cursor {}", cursor)))?,
        };

        Ok(self.pages.get(index).cloned().unwrap_or(ItemsPage {
            data: Vec::new(),
            has_more: false,
            next_cursor: None,
        }))
    }

    async fn create_webhook(&self, url: &str, events: &[String]) -> WebsetResult<Webhook> {
        self.check_error()?;
        let mut state = self.state.lock();
        state.webhooks.push((url.to_string(), events.to_vec()));

        Ok(Webhook {
            id: format!("webhook_{}", state.webhooks.len()),
            url: url.to_string(),
            events: events.to_vec(),
            status: Some("active".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> WebsetItem {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "source": "search",
            "websetId": "webset_1"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_all_items_follows_cursor() {
        let items = (1..=5).map(|i| item(&format!("witem_{}", i))).collect();
        let api = FakeWebsetApi::new("webset_1").with_items(items, 2);

        let all = api.list_all_items("webset_1").await.unwrap();
        let ids: Vec<_> = all.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["witem_1", "witem_2", "witem_3", "witem_4", "witem_5"]);
    }

    #[tokio::test]
    async fn test_scripted_statuses_repeat_last() {
        let api = FakeWebsetApi::new("webset_1")
            .with_statuses([WebsetState::Running, WebsetState::Idle]);

        assert_eq!(
            api.get_webset("webset_1").await.unwrap().status,
            WebsetState::Running
        );
        assert!(api.get_webset("webset_1").await.unwrap().status.is_idle());
        assert!(api.get_webset("webset_1").await.unwrap().status.is_idle());
        assert_eq!(api.status_calls(), 3);
    }

    #[tokio::test]
    async fn test_unknown_webset_is_not_found() {
        let api = FakeWebsetApi::new("webset_1");
        let err = api.get_webset("webset_2").await.unwrap_err();
        assert_eq!(err.http_class().status_code(), 404);
    }
}
