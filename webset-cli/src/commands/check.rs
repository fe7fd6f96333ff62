//! Export the results of an existing webset.

use std::path::Path;

use tracing::info;
use webset_services::export::{write_raw_items, write_results_json, write_results_xlsx};
use webset_services::{JobConfig, WebsetService};

use crate::output::print_summary;

/// Check a webset's status and, when it is idle, save its formatted items
pub async fn cmd_check(
    service: &WebsetService,
    webset_id: &str,
    config_path: &Path,
    output: &Path,
    raw: bool,
) -> anyhow::Result<()> {
    let config = JobConfig::load_or_default(config_path);

    let webset = service.get_webset(webset_id).await?;
    info!("Webset {} status: {}", webset.id, webset.status);

    if !webset.status.is_idle() {
        println!(
            "Webset is not idle (current status: {}). Please check again later.",
            webset.status
        );
        return Ok(());
    }

    let items = service.items(webset_id).await?;

    if raw {
        let path = write_raw_items(output, &items)?;
        println!("Raw data saved to {}", path.display());
    }

    let records = service.format_items(&webset, &items, &config.field_names());
    print_summary(&records);

    write_results_json(output, &records)?;
    write_results_xlsx(output, &records)?;
    println!("\nResults saved to {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use webset_core::{WebsetItem, WebsetState};
    use webset_exa::testing::FakeWebsetApi;
    use webset_services::{EnrichmentIdMap, UnmatchedPolicy};

    fn service(api: FakeWebsetApi) -> WebsetService {
        WebsetService::new(Arc::new(api), EnrichmentIdMap::new(), UnmatchedPolicy::Drop)
    }

    fn items() -> Vec<WebsetItem> {
        serde_json::from_value(serde_json::json!([
            {
                "id": "w1",
                "source": "search",
                "websetId": "webset_1",
                "properties": {"name": "Grace Hopper"},
                "enrichments": [
                    {"enrichmentId": "e1", "format": "phone", "result": ["5551234567"]}
                ]
            }
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_check_idle_webset_writes_raw_and_formatted() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("check.json");
        let service = service(FakeWebsetApi::new("webset_1").with_items(items(), 1));

        cmd_check(&service, "webset_1", &dir.path().join("missing.json"), &output, true)
            .await
            .unwrap();

        let raw: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("raw_check.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(raw[0]["id"], "w1");

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["results"][0]["name"], "Grace Hopper");
        assert_eq!(written["results"][0]["enrichments"]["Phone"], "5551234567");
        assert!(dir.path().join("check.xlsx").exists());
    }

    #[tokio::test]
    async fn test_check_running_webset_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("check.json");
        let service = service(
            FakeWebsetApi::new("webset_1")
                .with_statuses([WebsetState::Running])
                .with_items(items(), 1),
        );

        cmd_check(&service, "webset_1", &dir.path().join("missing.json"), &output, true)
            .await
            .unwrap();

        assert!(!output.exists());
        assert!(!dir.path().join("raw_check.json").exists());
    }

    #[tokio::test]
    async fn test_check_unknown_webset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(FakeWebsetApi::new("webset_1"));

        let result = cmd_check(
            &service,
            "webset_2",
            &dir.path().join("missing.json"),
            &dir.path().join("check.json"),
            false,
        )
        .await;

        assert!(result.is_err());
    }
}
