//! Console output

use webset_core::FlatRecord;

/// Console summary of formatted records
pub fn render_summary(records: &[FlatRecord]) -> String {
    let rule = "=".repeat(80);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        format!("FORMATTED RESULTS ({} items)", records.len()),
        rule,
    ];

    for (i, record) in records.iter().enumerate() {
        lines.push(format!("\nRESULT {}:", i + 1));
        if let Some(name) = &record.name {
            lines.push(format!("Name: {}", name));
        }
        if let Some(url) = &record.url {
            lines.push(format!("URL: {}", url));
        }
        if !record.enrichments.is_empty() {
            lines.push("\nEnrichments:".to_string());
            for (field, value) in &record.enrichments {
                lines.push(format!("  {}: {}", field, value));
            }
        }
        lines.push("-".repeat(80));
    }

    lines.join("\n")
}

pub fn print_summary(records: &[FlatRecord]) {
    println!("{}", render_summary(records));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_summary() {
        let record: FlatRecord = serde_json::from_value(serde_json::json!({
            "id": "w1",
            "source": "search",
            "webset_id": "ws",
            "name": "Ada Lovelace",
            "enrichments": {"Email": "ada@example.com", "Location": "London"}
        }))
        .unwrap();

        let summary = render_summary(&[record]);
        assert!(summary.contains("FORMATTED RESULTS (1 items)"));
        assert!(summary.contains("RESULT 1:\nName: Ada Lovelace"));
        assert!(!summary.contains("URL:"));
        assert!(summary.contains("  Email: ada@example.com\n  Location: London"));
    }

    #[test]
    fn test_render_empty_summary() {
        let summary = render_summary(&[]);
        assert!(summary.contains("FORMATTED RESULTS (0 items)"));
        assert!(!summary.contains("RESULT 1"));
    }
}
