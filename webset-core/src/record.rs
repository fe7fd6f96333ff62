//! Flat output records and the field names they are keyed by

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The fixed semantic output fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Name,
    Email,
    Phone,
    Location,
    CompanyName,
    CompanyWebsite,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Name,
        CanonicalField::Email,
        CanonicalField::Phone,
        CanonicalField::Location,
        CanonicalField::CompanyName,
        CanonicalField::CompanyWebsite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Name => "Name",
            CanonicalField::Email => "Email",
            CanonicalField::Phone => "Phone",
            CanonicalField::Location => "Location",
            CanonicalField::CompanyName => "Company Name",
            CanonicalField::CompanyWebsite => "Company Website",
        }
    }

    /// Parse a field name, ignoring case and treating `_` as a space
    /// (`Company_Name` was used by older exports).
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().replace('_', " ").to_lowercase();
        CanonicalField::ALL
            .into_iter()
            .find(|field| field.as_str().to_lowercase() == normalized)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a flat record's enrichment mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldName {
    Canonical(CanonicalField),
    /// A field name taken from the job configuration
    Configured(String),
    /// Bucket for values no rule could place
    Unmatched,
}

impl FieldName {
    pub const UNMATCHED: &'static str = "Unmatched";

    pub fn from_name(name: &str) -> Self {
        match CanonicalField::from_name(name) {
            Some(field) => FieldName::Canonical(field),
            None => FieldName::Configured(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldName::Canonical(field) => field.as_str(),
            FieldName::Configured(name) => name.as_str(),
            FieldName::Unmatched => Self::UNMATCHED,
        }
    }
}

impl From<CanonicalField> for FieldName {
    fn from(field: CanonicalField) -> Self {
        FieldName::Canonical(field)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flattened webset item ready for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub id: String,
    pub source: String,
    pub webset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Field name → value, in first-insertion order
    #[serde(default)]
    pub enrichments: IndexMap<String, String>,
}

impl FlatRecord {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        webset_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            webset_id: webset_id.into(),
            name: None,
            url: None,
            enrichments: IndexMap::new(),
        }
    }

    /// Set a field value; a later write to the same field replaces the
    /// earlier one. Returns the replaced value.
    pub fn set(&mut self, field: &FieldName, value: impl Into<String>) -> Option<String> {
        self.enrichments.insert(field.as_str().to_string(), value.into())
    }

    pub fn get(&self, field: &FieldName) -> Option<&str> {
        self.enrichments.get(field.as_str()).map(String::as_str)
    }
}
