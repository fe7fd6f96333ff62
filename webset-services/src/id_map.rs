//! Enrichment ID → field name lookup
//!
//! Enrichment IDs are opaque and minted per webset, so the table is data:
//! a versioned JSON file supplied by the operator, optionally merged with
//! entries derived from the webset's own enrichment definitions.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use webset_core::{CanonicalField, FieldName, Webset, WebsetError, WebsetResult};

/// Schema version of the ID map file
pub const ID_MAP_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct IdMapFile {
    version: u32,
    fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct EnrichmentIdMap {
    fields: HashMap<String, FieldName>,
}

impl EnrichmentIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> WebsetResult<Self> {
        let file: IdMapFile = serde_json::from_str(json)
            .map_err(|e| WebsetError::config(format!("Invalid enrichment ID map: {}", e)))?;

        if file.version != ID_MAP_VERSION {
            return Err(WebsetError::config(format!(
                "Unsupported enrichment ID map version {} (expected {})",
                file.version, ID_MAP_VERSION
            )));
        }

        Ok(file
            .fields
            .into_iter()
            .map(|(id, name)| (id, FieldName::from_name(&name)))
            .collect())
    }

    pub fn load(path: impl AsRef<Path>) -> WebsetResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            WebsetError::config(format!(
                "Failed to read enrichment ID map {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    /// Derive entries from a webset's enrichment definitions by reading
    /// their descriptions. Definitions that match nothing are left out.
    pub fn from_webset(webset: &Webset, known_fields: &[String]) -> Self {
        let mut map = Self::new();
        for enrichment in &webset.enrichments {
            let text = enrichment
                .description
                .as_deref()
                .or(enrichment.title.as_deref())
                .unwrap_or_default();

            match field_for_definition(text, enrichment.format.as_deref(), known_fields) {
                Some(field) => {
                    debug!("Derived {} for enrichment {}", field, enrichment.id);
                    map.insert(enrichment.id.clone(), field);
                }
                None => debug!(
                    "No field derivable for enrichment {} ({:?})",
                    enrichment.id, text
                ),
            }
        }
        map
    }

    pub fn insert(&mut self, enrichment_id: impl Into<String>, field: FieldName) {
        self.fields.insert(enrichment_id.into(), field);
    }

    pub fn get(&self, enrichment_id: &str) -> Option<&FieldName> {
        self.fields.get(enrichment_id)
    }

    /// Add `other`'s entries for IDs this map does not already know
    pub fn merge_missing(&mut self, other: EnrichmentIdMap) {
        for (id, field) in other.fields {
            self.fields.entry(id).or_insert(field);
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldName)> for EnrichmentIdMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldName)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

fn field_for_definition(
    description: &str,
    format: Option<&str>,
    known_fields: &[String],
) -> Option<FieldName> {
    match format {
        Some("email") => return Some(CanonicalField::Email.into()),
        Some("phone") => return Some(CanonicalField::Phone.into()),
        _ => {}
    }

    let text = description.to_lowercase();
    if text.is_empty() {
        return None;
    }

    // Configured custom fields first: "Extract the Industry of the company"
    // must not be claimed by the company keyword below.
    let custom = known_fields
        .iter()
        .filter(|f| CanonicalField::from_name(f).is_none())
        .find(|f| text.contains(&f.to_lowercase()));
    if let Some(field) = custom {
        return Some(FieldName::Configured(field.trim().to_string()));
    }

    let field = if text.contains("email") {
        CanonicalField::Email
    } else if text.contains("phone") {
        CanonicalField::Phone
    } else if text.contains("website") || text.contains("url") {
        CanonicalField::CompanyWebsite
    } else if text.contains("location") || text.contains("resides") {
        CanonicalField::Location
    } else if text.contains("full name") || text.contains("name of the entrepreneur") {
        CanonicalField::Name
    } else if text.contains("company") || text.contains("business") {
        CanonicalField::CompanyName
    } else if text.contains("name") {
        CanonicalField::Name
    } else {
        return None;
    };
    Some(field.into())
}
