//! Create, wait for and export a webset.

use std::path::Path;
use std::time::Duration;

use anyhow::bail;
use tracing::{info, warn};
use webset_services::export::{write_results_json, write_results_xlsx};
use webset_services::{JobConfig, PollOutcome, WebsetService};

use crate::output::print_summary;

/// Run a webset job end to end
pub async fn cmd_run(
    service: &WebsetService,
    config_path: &Path,
    output: &Path,
    webset_id: Option<&str>,
    webhook_url: Option<&str>,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let config = JobConfig::load_or_default(config_path);
    let field_names = config.field_names();

    let webset_id = match webset_id {
        Some(id) => {
            info!("Using existing webset with ID: {}", id);
            id.to_string()
        }
        None => {
            info!("Creating webset with query: {}", config.search.query);
            info!("Enrichments: {}", field_names.join(", "));
            let status = service.create_webset(&config.to_create_request()).await?;
            info!("Webset created with ID: {}", status.id);
            status.id
        }
    };

    if let Some(url) = webhook_url {
        // Notification only; polling still decides when the webset is done
        if let Err(e) = service.register_idle_webhook(url).await {
            warn!("Failed to register webhook {}: {}", url, e);
        }
    }

    let outcome = service
        .wait(&webset_id, Duration::from_secs(timeout_secs))
        .await?;
    let webset = match outcome {
        PollOutcome::Idle(webset) => webset,
        PollOutcome::TimedOut(webset) => {
            warn!(
                "Timeout reached after {} seconds. Current status: {}",
                timeout_secs, webset.status
            );
            webset
        }
        PollOutcome::Failed(webset) => {
            bail!("Webset {} stopped with status {}", webset.id, webset.status)
        }
    };

    let items = service.items(&webset_id).await?;
    let records = service.format_items(&webset, &items, &field_names);

    print_summary(&records);

    write_results_json(output, &records)?;
    if let Some(xlsx) = write_results_xlsx(output, &records)? {
        println!("\nResults saved to {} and {}", output.display(), xlsx.display());
    } else {
        println!("\nResults saved to {}", output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use webset_core::{WebsetItem, WebsetState};
    use webset_exa::testing::FakeWebsetApi;
    use webset_services::{EnrichmentIdMap, UnmatchedPolicy};

    fn items() -> Vec<WebsetItem> {
        serde_json::from_value(serde_json::json!([
            {
                "id": "w1",
                "source": "search",
                "websetId": "webset_1",
                "properties": {"url": "https://ada.dev", "person": {"name": "Ada Lovelace"}},
                "enrichments": [
                    {"enrichmentId": "e1", "format": "email", "result": ["ada@example.com"]}
                ]
            }
        ]))
        .unwrap()
    }

    fn service(api: FakeWebsetApi) -> (Arc<FakeWebsetApi>, WebsetService) {
        let api = Arc::new(api);
        let service = WebsetService::new(api.clone(), EnrichmentIdMap::new(), UnmatchedPolicy::Drop);
        (api, service)
    }

    #[tokio::test]
    async fn test_run_creates_webset_and_writes_results() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out/results.json");
        let (api, service) = service(FakeWebsetApi::new("webset_1").with_items(items(), 10));

        cmd_run(
            &service,
            &dir.path().join("missing.json"),
            &output,
            None,
            Some("https://hooks.example.com/exa"),
            300,
        )
        .await
        .unwrap();

        let created = api.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].search.count, 3);
        assert_eq!(created[0].enrichments.len(), 6);
        assert_eq!(
            api.webhooks(),
            vec![(
                "https://hooks.example.com/exa".to_string(),
                vec!["webset.idle".to_string()]
            )]
        );

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["results"][0]["name"], "Ada Lovelace");
        assert_eq!(written["results"][0]["enrichments"]["Email"], "ada@example.com");
        assert!(dir.path().join("out/results.xlsx").exists());
    }

    #[tokio::test]
    async fn test_run_with_existing_webset_skips_creation() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("results.json");
        let (api, service) = service(FakeWebsetApi::new("webset_1"));

        cmd_run(&service, &dir.path().join("missing.json"), &output, Some("webset_1"), None, 300)
            .await
            .unwrap();

        assert!(api.created().is_empty());
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["results"], serde_json::json!([]));
        assert!(!dir.path().join("results.xlsx").exists());
    }

    #[tokio::test]
    async fn test_run_fails_on_failed_webset() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("results.json");
        let (_, service) =
            service(FakeWebsetApi::new("webset_1").with_statuses([WebsetState::Failed]));

        let result = cmd_run(
            &service,
            &dir.path().join("missing.json"),
            &output,
            Some("webset_1"),
            None,
            300,
        )
        .await;

        assert!(result.is_err());
        assert!(!output.exists());
    }
}
