//! Job configuration files
//!
//! A job config names the search and the fields to extract:
//!
//! ```json
//! {
//!   "search": {"query": "...", "count": 3},
//!   "enrichments": ["Name", "Email", {"field": "Industry", "description": "...", "format": "text"}]
//! }
//! ```
//!
//! Plain strings are field names and expand into descriptive prompts;
//! objects are passed through as enrichment requests.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use webset_core::{
    CanonicalField, CreateWebsetRequest, EnrichmentFormat, EnrichmentOption, EnrichmentRequest,
    SearchParameters, WebsetError, WebsetResult,
};

pub const DEFAULT_QUERY: &str =
    "entrepreneur (founder, co-founder, or owner of a business) currently resides in the usa";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub query: String,
    #[serde(default = "default_count", alias = "limit")]
    pub count: u32,
}

fn default_count() -> u32 {
    3
}

/// Structured enrichment entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentSpec {
    /// Output field name for values of this enrichment
    #[serde(default, alias = "name")]
    pub field: Option<String>,
    pub description: String,
    #[serde(default)]
    pub format: EnrichmentFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<EnrichmentOption>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnrichmentEntry {
    Field(String),
    Spec(EnrichmentSpec),
}

impl EnrichmentEntry {
    pub fn field_name(&self) -> Option<&str> {
        match self {
            EnrichmentEntry::Field(name) => Some(name.as_str()),
            EnrichmentEntry::Spec(spec) => spec.field.as_deref(),
        }
    }

    pub fn to_request(&self) -> EnrichmentRequest {
        match self {
            EnrichmentEntry::Field(name) => expand_field(name),
            EnrichmentEntry::Spec(spec) => EnrichmentRequest {
                description: spec.description.clone(),
                format: spec.format,
                options: spec.options.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub search: SearchConfig,
    #[serde(default)]
    pub enrichments: Vec<EnrichmentEntry>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                query: DEFAULT_QUERY.to_string(),
                count: default_count(),
            },
            enrichments: CanonicalField::ALL
                .iter()
                .map(|f| EnrichmentEntry::Field(f.as_str().to_string()))
                .collect(),
        }
    }
}

impl JobConfig {
    pub fn from_json(json: &str) -> WebsetResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| WebsetError::config(format!("Invalid job configuration: {}", e)))
    }

    pub fn load(path: impl AsRef<Path>) -> WebsetResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            WebsetError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Load `path`, falling back to the built-in default when the file is
    /// missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("Configuration loaded from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Error loading configuration: {}. Using default configuration", e);
                Self::default()
            }
        }
    }

    /// Configured field names, in order
    pub fn field_names(&self) -> Vec<String> {
        self.enrichments
            .iter()
            .filter_map(EnrichmentEntry::field_name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }

    pub fn to_create_request(&self) -> CreateWebsetRequest {
        CreateWebsetRequest {
            search: SearchParameters {
                query: self.search.query.clone(),
                count: self.search.count,
            },
            enrichments: self.enrichments.iter().map(EnrichmentEntry::to_request).collect(),
        }
    }
}

/// Expand a bare field name into a descriptive enrichment prompt
pub fn expand_field(name: &str) -> EnrichmentRequest {
    let Some(field) = CanonicalField::from_name(name) else {
        return EnrichmentRequest::new(
            format!("Extract the {} of the entrepreneur", name.trim()),
            EnrichmentFormat::Text,
        );
    };

    let (description, format) = match field {
        CanonicalField::Name => (
            "Extract the full name of the entrepreneur (founder, co-founder, or business owner)",
            EnrichmentFormat::Text,
        ),
        CanonicalField::Email => (
            "Extract the email address of the entrepreneur for contact purposes",
            EnrichmentFormat::Email,
        ),
        CanonicalField::Phone => (
            "Extract the phone number of the entrepreneur or their business",
            EnrichmentFormat::Phone,
        ),
        CanonicalField::Location => (
            "Extract the location (city, state) where the entrepreneur currently resides",
            EnrichmentFormat::Text,
        ),
        CanonicalField::CompanyName => (
            "Extract the name of the company or business founded by the entrepreneur",
            EnrichmentFormat::Text,
        ),
        CanonicalField::CompanyWebsite => (
            "Extract the website URL of the entrepreneur's company or business",
            EnrichmentFormat::Text,
        ),
    };
    EnrichmentRequest::new(description, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_shipped_file() {
        let shipped = JobConfig::from_json(include_str!("../../config/config.json")).unwrap();
        assert_eq!(shipped, JobConfig::default());
        assert_eq!(
            shipped.field_names(),
            ["Name", "Email", "Phone", "Location", "Company Name", "Company Website"]
        );
    }

    #[test]
    fn test_limit_alias_and_mixed_entries() {
        let config = JobConfig::from_json(
            r#"{
                "search": {"query": "founders in texas", "limit": 5},
                "enrichments": [
                    "email",
                    "Industry",
                    {"field": "Revenue", "description": "Annual revenue in USD", "format": "number"},
                    {"description": "LinkedIn profile", "format": "url"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.search.count, 5);
        assert_eq!(config.field_names(), ["email", "Industry", "Revenue"]);

        let request = config.to_create_request();
        assert!(request.validate().is_ok());
        assert_eq!(request.enrichments.len(), 4);
        assert_eq!(request.enrichments[0].format, EnrichmentFormat::Email);
        assert_eq!(
            request.enrichments[1].description,
            "Extract the Industry of the entrepreneur"
        );
        assert_eq!(request.enrichments[2].format, EnrichmentFormat::Number);
        assert_eq!(request.enrichments[3].format, EnrichmentFormat::Url);
    }

    #[test]
    fn test_missing_count_defaults() {
        let config = JobConfig::from_json(r#"{"search": {"query": "q"}}"#).unwrap();
        assert_eq!(config.search.count, 3);
        assert!(config.enrichments.is_empty());
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let config = JobConfig::load_or_default("/nonexistent/config.json");
        assert_eq!(config, JobConfig::default());
    }

    #[test]
    fn test_expand_canonical_fields() {
        let phone = expand_field("Phone");
        assert_eq!(phone.format, EnrichmentFormat::Phone);
        assert!(phone.description.contains("phone number"));

        let website = expand_field("company_website");
        assert_eq!(website.format, EnrichmentFormat::Text);
        assert!(website.description.contains("website URL"));
    }
}
