//! Core types for Exa websets
//!
//! This crate defines the shared data structures used across the workspace:
//! websets and their status, raw webset items as returned by Exa, search
//! results, and the flat records produced for export.

pub mod error;
pub mod item;
pub mod record;
pub mod search;
pub mod webset;

pub use error::{HttpClass, WebsetError, WebsetResult};
pub use item::{
    Article, Company, EnrichmentResult, EnrichmentValue, Entity, EntityKind, Evaluation,
    ItemProperties, ItemsPage, Person, Reference, WebsetItem,
};
pub use record::{CanonicalField, FieldName, FlatRecord};
pub use search::{SearchRequest, SearchResponse, SearchResultMetadata};
pub use webset::{
    CreateWebsetRequest, EnrichmentFormat, EnrichmentOption, EnrichmentRequest, SearchParameters,
    Webhook, Webset, WebsetEnrichment, WebsetSearch, WebsetState, WebsetStatus,
};
