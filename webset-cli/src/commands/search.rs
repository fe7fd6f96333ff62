//! One-off web search with a text report and spreadsheet.

use std::path::Path;

use anyhow::Context;
use webset_core::SearchRequest;
use webset_services::export::{
    companion_xlsx_path, render_search_report, search_sheet_name, Sheet,
};
use webset_services::WebsetService;

pub async fn cmd_search(
    service: &WebsetService,
    query: &str,
    output: &Path,
    limit: u32,
) -> anyhow::Result<()> {
    let response = service.search(&SearchRequest::new(query, limit)).await?;

    let report = render_search_report(query, &response.results);
    println!("{}", report);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(output, &report)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("\nResults saved to {}", output.display());

    let sheet = Sheet::from_search_results(&response.results);
    if !sheet.is_empty() {
        let xlsx = companion_xlsx_path(output);
        sheet.write_xlsx(&xlsx, &search_sheet_name(query))?;
        println!("Results also saved to Excel file: {}", xlsx.display());
    }

    Ok(())
}
