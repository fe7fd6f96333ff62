//! Enrichment field classification
//!
//! Exa returns enrichment results keyed by opaque IDs, so the semantic field
//! a value belongs to has to be recovered. Rules are tried in tiers and the
//! first match wins:
//!
//! 1. exact enrichment ID in the [`EnrichmentIdMap`]
//! 2. declared format (`email`, `phone`)
//! 3. keywords in the enrichment's reasoning text
//! 4. patterns in the value itself
//!
//! A value no tier places is returned as `None`; what happens to it is the
//! flattener's unmatched policy.

use std::fmt;

use tracing::debug;
use webset_core::{CanonicalField, EnrichmentResult, FieldName};

use crate::id_map::EnrichmentIdMap;

/// Lower-cased substrings treated as a US location
const US_REGIONS: &[&str] = &[
    "alabama",
    "alaska",
    "arizona",
    "california",
    "colorado",
    "florida",
    "georgia",
    "illinois",
    "new york",
    "texas",
    "washington",
    "united states",
    "usa",
    "los angeles",
    "san francisco",
];

/// Words that mark a company name
const BUSINESS_SUFFIXES: &[&str] = &["inc", "llc", "corp", "company", "technologies", "solutions"];

/// Rule tier that produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationTier {
    KnownId,
    DeclaredFormat,
    Reasoning,
    Content,
}

impl fmt::Display for ClassificationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassificationTier::KnownId => "known id",
            ClassificationTier::DeclaredFormat => "declared format",
            ClassificationTier::Reasoning => "reasoning",
            ClassificationTier::Content => "content",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub field: FieldName,
    pub tier: ClassificationTier,
}

impl Classification {
    fn new(field: impl Into<FieldName>, tier: ClassificationTier) -> Self {
        Self {
            field: field.into(),
            tier,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldClassifier {
    id_map: EnrichmentIdMap,
    /// Field names from the job configuration, in configured order
    known_fields: Vec<String>,
}

impl FieldClassifier {
    pub fn new(id_map: EnrichmentIdMap, known_fields: Vec<String>) -> Self {
        Self {
            id_map,
            known_fields,
        }
    }

    /// Classify an enrichment result. Results without a usable value are
    /// never classified.
    pub fn classify(&self, enrichment: &EnrichmentResult) -> Option<Classification> {
        let value = enrichment.value()?;
        self.classify_value(
            &enrichment.enrichment_id,
            enrichment.declared_format(),
            value,
            enrichment.reasoning.as_deref(),
        )
    }

    pub fn classify_value(
        &self,
        enrichment_id: &str,
        declared_format: &str,
        value: &str,
        reasoning: Option<&str>,
    ) -> Option<Classification> {
        if let Some(field) = self.id_map.get(enrichment_id) {
            return Some(Classification::new(field.clone(), ClassificationTier::KnownId));
        }

        match declared_format {
            "email" => {
                return Some(Classification::new(
                    CanonicalField::Email,
                    ClassificationTier::DeclaredFormat,
                ))
            }
            "phone" => {
                return Some(Classification::new(
                    CanonicalField::Phone,
                    ClassificationTier::DeclaredFormat,
                ))
            }
            _ => {}
        }

        let fallback = reasoning
            .and_then(|r| self.from_reasoning(r))
            .map(|field| Classification::new(field, ClassificationTier::Reasoning))
            .or_else(|| {
                field_from_content(value)
                    .map(|field| Classification::new(field, ClassificationTier::Content))
            });

        match &fallback {
            Some(c) => debug!(
                "Enrichment {} ({}) not in ID map, classified as {} by {}",
                enrichment_id, declared_format, c.field, c.tier
            ),
            None => debug!(
                "Enrichment {} ({}) matched no classification rule",
                enrichment_id, declared_format
            ),
        }
        fallback
    }

    fn from_reasoning(&self, reasoning: &str) -> Option<FieldName> {
        let text = reasoning.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }

        let canonical = if text.contains("name") && text.contains("entrepreneur") {
            Some(CanonicalField::Name)
        } else if text.contains("location") || text.contains("resides") {
            Some(CanonicalField::Location)
        } else if text.contains("company") || text.contains("business") || text.contains("owner")
        {
            Some(CanonicalField::CompanyName)
        } else if text.contains("website") || text.contains("url") {
            Some(CanonicalField::CompanyWebsite)
        } else {
            None
        };

        canonical.map(FieldName::from).or_else(|| {
            self.known_fields
                .iter()
                .find(|field| !field.trim().is_empty() && text.contains(&field.to_lowercase()))
                .map(|field| FieldName::from_name(field))
        })
    }
}

fn field_from_content(value: &str) -> Option<CanonicalField> {
    let lower = value.to_lowercase();

    if lower.contains('@') && lower.contains('.') {
        return Some(CanonicalField::Email);
    }
    if lower.contains("http") || lower.contains(".com") || lower.contains(".org") {
        return Some(CanonicalField::CompanyWebsite);
    }
    if US_REGIONS.iter().any(|region| lower.contains(region)) {
        return Some(CanonicalField::Location);
    }
    if lower.chars().any(|c| c.is_ascii_digit()) && lower.contains(['-', '(', ')']) {
        return Some(CanonicalField::Phone);
    }

    // Whole-word check so names like "Vince Carter" are not read as "inc"
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let has_suffix = tokens.iter().any(|t| is_business_suffix(t));

    if !tokens.is_empty()
        && !has_suffix
        && tokens
            .iter()
            .all(|t| t.chars().next().is_some_and(char::is_uppercase))
    {
        return Some(CanonicalField::Name);
    }
    if BUSINESS_SUFFIXES.iter().any(|suffix| lower.contains(suffix)) {
        return Some(CanonicalField::CompanyName);
    }
    None
}

fn is_business_suffix(token: &str) -> bool {
    let word = token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    BUSINESS_SUFFIXES.contains(&word.as_str())
}
