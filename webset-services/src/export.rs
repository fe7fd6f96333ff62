//! Export adapters: JSON documents, spreadsheets and text reports

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use webset_core::{FlatRecord, SearchResultMetadata, WebsetError, WebsetItem, WebsetResult};

/// Columns every results sheet starts with
pub const BASE_COLUMNS: [&str; 5] = ["id", "source", "webset_id", "name", "url"];

/// Columns of a search results sheet
pub const SEARCH_COLUMNS: [&str; 7] = [
    "title",
    "url",
    "published_date",
    "author",
    "source",
    "score",
    "text",
];

/// Excerpt length used in search reports and sheets
pub const EXCERPT_CHARS: usize = 300;

/// Excel's limit on worksheet names
const MAX_SHEET_NAME_CHARS: usize = 31;

/// Columns kept as plain text even when the value looks numeric
const TEXT_COLUMNS: [&str; 2] = ["Phone", "Email"];

/// Top-level shape of the JSON results file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsDocument {
    pub results: Vec<FlatRecord>,
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> WebsetResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            WebsetError::export(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| WebsetError::export(format!("Failed to serialize results: {}", e)))?;
    fs::write(path, json)
        .map_err(|e| WebsetError::export(format!("Failed to write {}: {}", path.display(), e)))
}

/// Write `{"results": [...]}` to `path`
pub fn write_results_json(path: &Path, records: &[FlatRecord]) -> WebsetResult<()> {
    write_json(
        path,
        &ResultsDocument {
            results: records.to_vec(),
        },
    )?;
    info!("Results saved to {}", path.display());
    Ok(())
}

/// Write raw items as `raw_<file name>` next to `output`. Returns the path
/// written.
pub fn write_raw_items(output: &Path, items: &[WebsetItem]) -> WebsetResult<PathBuf> {
    let path = raw_items_path(output);
    write_json(&path, items)?;
    info!("Raw data saved to {}", path.display());
    Ok(path)
}

pub fn raw_items_path(output: &Path) -> PathBuf {
    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results.json".to_string());
    output.with_file_name(format!("raw_{}", file_name))
}

/// Spreadsheet path stored next to a JSON or text output
pub fn companion_xlsx_path(output: &Path) -> PathBuf {
    output.with_extension("xlsx")
}

/// Worksheet name for a search query, with characters Excel rejects
/// replaced. Excel also rejects a name ending in an apostrophe.
pub fn search_sheet_name(query: &str) -> String {
    let safe: String = query
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | '?' | '*' => '-',
            '[' => '(',
            ']' => ')',
            other => other,
        })
        .collect();
    truncate_chars(&format!("Search {}", safe), MAX_SHEET_NAME_CHARS)
        .trim_end_matches('\'')
        .to_string()
}

/// Sheet column for an enrichment field. Fields named like a base column
/// get an `enrichment_` prefix so both values survive.
pub fn enrichment_column(field: &str) -> String {
    if BASE_COLUMNS.contains(&field) {
        format!("enrichment_{}", field)
    } else {
        field.to_string()
    }
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// A rectangular table of text cells
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// One row per record. Enrichment columns are the union of every
    /// record's fields in first-seen order; missing cells are blank.
    pub fn from_records(records: &[FlatRecord]) -> Self {
        let mut fields: IndexSet<&str> = IndexSet::new();
        for record in records {
            fields.extend(record.enrichments.keys().map(String::as_str));
        }

        let mut headers: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        headers.extend(fields.iter().map(|f| enrichment_column(f)));

        let rows = records
            .iter()
            .map(|record| {
                let base = [
                    Some(record.id.as_str()),
                    Some(record.source.as_str()),
                    Some(record.webset_id.as_str()),
                    record.name.as_deref(),
                    record.url.as_deref(),
                ];
                let enriched = fields
                    .iter()
                    .map(|f| record.enrichments.get(*f).map(String::as_str));

                base.into_iter()
                    .chain(enriched)
                    .zip(&headers)
                    .map(|(value, header)| cell_text(header, value.unwrap_or_default()))
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    /// Build a sheet from a results document that may have been edited or
    /// produced elsewhere: enrichment values can be lists (first element
    /// kept), numbers or null.
    pub fn from_results_json(document: &Value) -> WebsetResult<Self> {
        let results = document
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| WebsetError::export("Results document has no \"results\" array"))?;

        let mut headers: IndexSet<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut flattened = Vec::with_capacity(results.len());

        for result in results {
            let mut cells: Vec<(String, String)> = BASE_COLUMNS
                .iter()
                .map(|c| (c.to_string(), value_text(result.get(*c))))
                .collect();

            if let Some(enrichments) = result.get("enrichments").and_then(Value::as_object) {
                for (field, value) in enrichments {
                    let column = enrichment_column(field);
                    headers.insert(column.clone());
                    cells.push((column, value_text(Some(value))));
                }
            }
            flattened.push(cells);
        }

        let headers: Vec<String> = headers.into_iter().collect();
        let rows = flattened
            .into_iter()
            .map(|cells| {
                headers
                    .iter()
                    .map(|header| {
                        let value = cells
                            .iter()
                            .rev()
                            .find(|(field, _)| field == header)
                            .map(|(_, v)| v.as_str())
                            .unwrap_or_default();
                        cell_text(header, value)
                    })
                    .collect()
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn from_search_results(results: &[SearchResultMetadata]) -> Self {
        let headers = SEARCH_COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = results
            .iter()
            .map(|r| {
                vec![
                    r.title.clone(),
                    r.url.clone(),
                    r.published_date.clone().unwrap_or_default(),
                    r.author.clone().unwrap_or_default(),
                    r.source.clone().unwrap_or_default(),
                    r.score.map(|s| s.to_string()).unwrap_or_default(),
                    truncate_chars(&r.text, EXCERPT_CHARS),
                ]
            })
            .collect();

        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell under `header` in row `row`
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Save as a single-sheet workbook. Every cell is written as a string
    /// so spreadsheet apps don't reinterpret phone numbers.
    pub fn write_xlsx(&self, path: &Path, sheet_name: &str) -> WebsetResult<()> {
        let xlsx_err = |e: rust_xlsxwriter::XlsxError| {
            WebsetError::export(format!("Failed to write {}: {}", path.display(), e))
        };

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet_name).map_err(xlsx_err)?;

            for (col, header) in self.headers.iter().enumerate() {
                worksheet
                    .write_string_with_format(0, col as u16, header, &header_format)
                    .map_err(xlsx_err)?;
            }
            for (row, cells) in self.rows.iter().enumerate() {
                for (col, cell) in cells.iter().enumerate() {
                    if cell.is_empty() {
                        continue;
                    }
                    worksheet
                        .write_string(row as u32 + 1, col as u16, cell)
                        .map_err(xlsx_err)?;
                }
            }
        }

        workbook.save(path).map_err(xlsx_err)?;
        info!("Results also saved to Excel file: {}", path.display());
        Ok(())
    }
}

/// Write the records' companion spreadsheet next to `json_output`. Nothing
/// is written for an empty batch.
pub fn write_results_xlsx(
    json_output: &Path,
    records: &[FlatRecord],
) -> WebsetResult<Option<PathBuf>> {
    if records.is_empty() {
        return Ok(None);
    }
    let path = companion_xlsx_path(json_output);
    Sheet::from_records(records).write_xlsx(&path, "Results")?;
    Ok(Some(path))
}

/// Plain-text report of search results
pub fn render_search_report(query: &str, results: &[SearchResultMetadata]) -> String {
    let rule = "=".repeat(80);
    let divider = "-".repeat(80);
    let mut lines = vec![
        rule.clone(),
        format!("DISPLAYING TOP {} RESULTS FOR: {}", results.len(), query),
        rule,
    ];

    for (i, result) in results.iter().enumerate() {
        lines.push(format!("\nRESULT {}:", i + 1));
        lines.push(format!("Title: {}", result.title));
        lines.push(format!("URL: {}", result.url));
        if let Some(published) = result.published_date.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("Published: {}", published));
        }
        if let Some(author) = result.author.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("Author: {}", author));
        }
        if let Some(source) = result.source.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("Source: {}", source));
        }
        if let Some(score) = result.score {
            lines.push(format!("Relevance Score: {}", score));
        }
        if !result.text.is_empty() {
            let mut excerpt = truncate_chars(&result.text, EXCERPT_CHARS);
            if result.text.chars().count() > EXCERPT_CHARS {
                excerpt.push_str("...");
            }
            lines.push(format!("\nExcerpt: {}", excerpt));
        }
        lines.push(divider.clone());
    }

    lines.join("\n")
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(values)) => value_text(values.first()),
        Some(other) => other.to_string(),
    }
}

/// Phone and email cells are kept verbatim apart from a float rendering of
/// an integer (`5551234567.0`), which loses its `.0`.
fn cell_text(header: &str, value: &str) -> String {
    if TEXT_COLUMNS.contains(&header) {
        if let Some(digits) = value.strip_suffix(".0") {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return digits.to_string();
            }
        }
    }
    value.to_string()
}
