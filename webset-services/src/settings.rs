//! Environment-driven settings shared by the server and the CLI

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};
use webset_core::{WebsetError, WebsetResult};
use webset_exa::{ExaClient, EXA_API_BASE};

use crate::flattener::UnmatchedPolicy;
use crate::id_map::EnrichmentIdMap;
use crate::poller::DEFAULT_POLL_INTERVAL;

pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// ID map used when `ENRICHMENT_ID_MAP` is not set
pub const DEFAULT_ID_MAP_PATH: &str = "config/enrichment_ids.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub server_port: u16,
    pub id_map_path: Option<PathBuf>,
    pub unmatched_policy: UnmatchedPolicy,
    pub poll_interval: Duration,
}

impl Settings {
    pub fn from_env() -> WebsetResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key → value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> WebsetResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("EXA_API_KEY")
            .or_else(|| get("exa_api_key"))
            .ok_or_else(|| WebsetError::config("EXA_API_KEY environment variable not set"))?;

        let server_port = match get("SERVER_PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| WebsetError::config(format!("Invalid SERVER_PORT: {}", port)))?,
            None => DEFAULT_SERVER_PORT,
        };

        let unmatched_policy = match get("UNMATCHED_POLICY") {
            Some(policy) => policy.parse()?,
            None => UnmatchedPolicy::default(),
        };

        let poll_interval = match get("WEBSET_POLL_INTERVAL_SECS") {
            Some(secs) => match secs.trim().parse::<u64>() {
                Ok(n) if n > 0 => Duration::from_secs(n),
                _ => {
                    return Err(WebsetError::config(format!(
                        "Invalid WEBSET_POLL_INTERVAL_SECS: {} (must be a positive number of seconds)",
                        secs
                    )))
                }
            },
            None => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            api_key,
            base_url: get("EXA_BASE_URL").unwrap_or_else(|| EXA_API_BASE.to_string()),
            server_port,
            id_map_path: get("ENRICHMENT_ID_MAP").map(PathBuf::from),
            unmatched_policy,
            poll_interval,
        })
    }

    pub fn exa_client(&self) -> WebsetResult<ExaClient> {
        Ok(ExaClient::new(&self.api_key)?.with_base_url(&self.base_url))
    }

    /// Load the configured ID map. Without `ENRICHMENT_ID_MAP` the default
    /// path is tried and an empty map is used if it does not exist.
    pub fn load_id_map(&self) -> WebsetResult<EnrichmentIdMap> {
        if let Some(path) = &self.id_map_path {
            let map = EnrichmentIdMap::load(path)?;
            info!("Loaded {} enrichment IDs from {}", map.len(), path.display());
            return Ok(map);
        }

        let default_path = Path::new(DEFAULT_ID_MAP_PATH);
        if default_path.exists() {
            let map = EnrichmentIdMap::load(default_path)?;
            info!("Loaded {} enrichment IDs from {}", map.len(), DEFAULT_ID_MAP_PATH);
            Ok(map)
        } else {
            warn!("No enrichment ID map found, classifying by format and content only");
            Ok(EnrichmentIdMap::new())
        }
    }
}
