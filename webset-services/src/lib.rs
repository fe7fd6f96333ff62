//! Services for Exa websets
//!
//! This crate turns raw webset items into flat records: it waits for a
//! webset to finish, classifies enrichment values into semantic fields and
//! exports the result as JSON and spreadsheets.

pub mod classifier;
pub mod export;
pub mod flattener;
pub mod id_map;
pub mod job_config;
pub mod poller;
pub mod settings;
pub mod webset_service;

pub use classifier::{Classification, ClassificationTier, FieldClassifier};
pub use export::{ResultsDocument, Sheet};
pub use flattener::{ItemFlattener, UnmatchedPolicy};
pub use id_map::{EnrichmentIdMap, ID_MAP_VERSION};
pub use job_config::{EnrichmentEntry, EnrichmentSpec, JobConfig, SearchConfig};
pub use poller::{CompletionPoller, PollOutcome, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT};
pub use settings::Settings;
pub use webset_service::{FormattedItems, WebsetService, WEBSET_IDLE_EVENT};
