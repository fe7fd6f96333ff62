//! Convert a saved results file into a spreadsheet.

use std::path::{Path, PathBuf};

use anyhow::Context;
use webset_services::export::companion_xlsx_path;
use webset_services::Sheet;

/// Write the records in a `{"results": [...]}` file to a spreadsheet.
/// Defaults to the input path with an `.xlsx` extension.
pub fn cmd_export(input: &Path, output: Option<&Path>) -> anyhow::Result<PathBuf> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let document: serde_json::Value = serde_json::from_str(&json)
        .with_context(|| format!("Invalid JSON in {}", input.display()))?;

    let sheet = Sheet::from_results_json(&document)?;
    if sheet.is_empty() {
        anyhow::bail!("No results found in {}", input.display());
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| companion_xlsx_path(input));
    sheet.write_xlsx(&output, "Results")?;
    println!("Excel file created: {}", output.display());

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_defaults_to_companion_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("webset_results.json");
        std::fs::write(
            &input,
            serde_json::json!({
                "results": [
                    {"id": "w1", "source": "search", "webset_id": "ws",
                     "enrichments": {"Email": "a@b.com"}},
                    {"id": "w2", "source": "search", "webset_id": "ws",
                     "enrichments": {"Location": "Austin, Texas"}}
                ]
            })
            .to_string(),
        )
        .unwrap();

        let written = cmd_export(&input, None).unwrap();
        assert_eq!(written, dir.path().join("webset_results.xlsx"));
        assert!(written.exists());
    }

    #[test]
    fn test_export_rejects_empty_results() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.json");
        std::fs::write(&input, r#"{"results": []}"#).unwrap();

        assert!(cmd_export(&input, None).is_err());
        assert!(!dir.path().join("empty.xlsx").exists());
    }
}
