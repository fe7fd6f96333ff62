//! Webset items and their enrichment results
//!
//! Items are deserialized once at the client boundary into these types. Exa
//! sends camelCase keys; the HTTP API re-emits snake_case, so the wire names
//! are accepted as aliases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of entity an item describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Company,
    Article,
    ResearchPaper,
    Custom,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub picture_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employees: Option<u64>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Article or research paper metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Borrowed view of the entity sub-object of an item
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity<'a> {
    Person(&'a Person),
    Company(&'a Company),
    Article(&'a Article),
}

/// Structured properties of an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProperties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<Article>,
    #[serde(
        default,
        alias = "research_paper",
        skip_serializing_if = "Option::is_none"
    )]
    pub research_paper: Option<Article>,
}

impl ItemProperties {
    /// The entity sub-object matching the declared kind, or the first one
    /// present when the kind is missing or inconsistent.
    pub fn entity(&self) -> Option<Entity<'_>> {
        let declared = match self.kind {
            Some(EntityKind::Person) => self.person.as_ref().map(Entity::Person),
            Some(EntityKind::Company) => self.company.as_ref().map(Entity::Company),
            Some(EntityKind::Article) => self.article.as_ref().map(Entity::Article),
            Some(EntityKind::ResearchPaper) => self.research_paper.as_ref().map(Entity::Article),
            _ => None,
        };

        declared
            .or_else(|| self.person.as_ref().map(Entity::Person))
            .or_else(|| self.company.as_ref().map(Entity::Company))
            .or_else(|| self.article.as_ref().map(Entity::Article))
            .or_else(|| self.research_paper.as_ref().map(Entity::Article))
    }

    /// Display name: an explicit `name`, else the entity's name or title
    pub fn display_name(&self) -> Option<&str> {
        if let Some(name) = self.name.as_deref() {
            return Some(name);
        }
        match self.entity()? {
            Entity::Person(p) => p.name.as_deref(),
            Entity::Company(c) => c.name.as_deref(),
            Entity::Article(a) => a.title.as_deref(),
        }
    }
}

/// Source reference attached to an enrichment or evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Enrichment result payload: Exa returns a list, older payloads a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnrichmentValue {
    Text(String),
    List(Vec<String>),
}

impl EnrichmentValue {
    /// The single value kept downstream.
    ///
    /// Lists keep only their first element. Empty strings, empty lists and
    /// lists whose first element is empty yield `None`.
    pub fn first(&self) -> Option<&str> {
        let value = match self {
            EnrichmentValue::Text(text) => text.as_str(),
            EnrichmentValue::List(values) => values.first()?.as_str(),
        };
        (!value.is_empty()).then_some(value)
    }
}

/// One enrichment result on an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    #[serde(default, alias = "enrichmentId")]
    pub enrichment_id: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub result: Option<EnrichmentValue>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub references: Option<Vec<Reference>>,
}

impl EnrichmentResult {
    /// Declared format, `text` when Exa omitted it
    pub fn declared_format(&self) -> &str {
        self.format.as_deref().unwrap_or("text")
    }

    pub fn value(&self) -> Option<&str> {
        self.result.as_ref().and_then(EnrichmentValue::first)
    }
}

/// Criterion evaluation of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub criterion: String,
    #[serde(default)]
    pub satisfied: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

/// A raw webset item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsetItem {
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, alias = "websetId")]
    pub webset_id: String,
    #[serde(default)]
    pub properties: Option<ItemProperties>,
    #[serde(default)]
    pub enrichments: Option<Vec<EnrichmentResult>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evaluations: Vec<Evaluation>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of items from the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsPage {
    pub data: Vec<WebsetItem>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}
