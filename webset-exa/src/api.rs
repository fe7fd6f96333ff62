//! Remote API seam

use async_trait::async_trait;
use tracing::{debug, warn};
use webset_core::{
    CreateWebsetRequest, ItemsPage, SearchRequest, SearchResultMetadata, Webhook, Webset,
    WebsetItem, WebsetResult,
};

/// Operations this system needs from Exa.
///
/// `ExaClient` is the production implementation; tests use
/// [`crate::testing::FakeWebsetApi`].
#[async_trait]
pub trait WebsetApi: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> WebsetResult<Vec<SearchResultMetadata>>;

    async fn create_webset(&self, request: &CreateWebsetRequest) -> WebsetResult<Webset>;

    async fn get_webset(&self, webset_id: &str) -> WebsetResult<Webset>;

    /// Fetch one page of items; `cursor` is `None` for the first page
    async fn list_items(&self, webset_id: &str, cursor: Option<&str>) -> WebsetResult<ItemsPage>;

    async fn create_webhook(&self, url: &str, events: &[String]) -> WebsetResult<Webhook>;

    /// Fetch every item by following `next_cursor` until Exa reports no more pages
    async fn list_all_items(&self, webset_id: &str) -> WebsetResult<Vec<WebsetItem>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.list_items(webset_id, cursor.as_deref()).await?;
            debug!(
                "Fetched page of {} items for {} (has_more={})",
                page.data.len(),
                webset_id,
                page.has_more
            );
            items.extend(page.data);

            match page.next_cursor {
                Some(next) if page.has_more => {
                    if cursor.as_deref() == Some(next.as_str()) {
                        warn!("Exa repeated cursor {} for {}, stopping", next, webset_id);
                        break;
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(items)
    }
}
