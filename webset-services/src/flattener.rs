//! Flattening of raw webset items into [`FlatRecord`]s

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use webset_core::{FieldName, FlatRecord, WebsetError, WebsetItem, WebsetResult};

use crate::classifier::FieldClassifier;

/// What to do with an enrichment value no classification rule placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Discard the value with a warning
    #[default]
    Drop,
    /// Keep it under the `Unmatched` field
    Bucket,
    /// Treat the whole item as unformattable
    Fail,
}

impl FromStr for UnmatchedPolicy {
    type Err = WebsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(UnmatchedPolicy::Drop),
            "bucket" => Ok(UnmatchedPolicy::Bucket),
            "fail" => Ok(UnmatchedPolicy::Fail),
            other => Err(WebsetError::config(format!(
                "Unknown unmatched policy '{}' (expected drop, bucket or fail)",
                other
            ))),
        }
    }
}

impl fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnmatchedPolicy::Drop => "drop",
            UnmatchedPolicy::Bucket => "bucket",
            UnmatchedPolicy::Fail => "fail",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ItemFlattener {
    classifier: FieldClassifier,
    policy: UnmatchedPolicy,
}

impl ItemFlattener {
    pub fn new(classifier: FieldClassifier, policy: UnmatchedPolicy) -> Self {
        Self { classifier, policy }
    }

    pub fn policy(&self) -> UnmatchedPolicy {
        self.policy
    }

    /// Flatten one item. Enrichments are applied in source order, so a later
    /// value for the same field replaces an earlier one.
    pub fn flatten(&self, item: &WebsetItem) -> WebsetResult<FlatRecord> {
        if item.id.trim().is_empty() {
            return Err(WebsetError::format("<missing>", "item has no id"));
        }

        let mut record = FlatRecord::new(&item.id, &item.source, &item.webset_id);

        if let Some(properties) = &item.properties {
            record.name = properties.display_name().map(str::to_string);
            record.url = properties.url.clone();
        }

        for enrichment in item.enrichments.iter().flatten() {
            let Some(value) = enrichment.value() else {
                debug!(
                    "Item {}: enrichment {} has no result, skipping",
                    item.id, enrichment.enrichment_id
                );
                continue;
            };

            let field = match self.classifier.classify(enrichment) {
                Some(classification) => classification.field,
                None => match self.policy {
                    UnmatchedPolicy::Drop => {
                        warn!(
                            "Item {}: dropping unmatched value from enrichment {}",
                            item.id, enrichment.enrichment_id
                        );
                        continue;
                    }
                    UnmatchedPolicy::Bucket => FieldName::Unmatched,
                    UnmatchedPolicy::Fail => {
                        return Err(WebsetError::format(
                            &item.id,
                            format!(
                                "enrichment {} could not be assigned to a field",
                                enrichment.enrichment_id
                            ),
                        ));
                    }
                },
            };

            if let Some(previous) = record.set(&field, value) {
                debug!(
                    "Item {}: {} overwritten ({:?} -> {:?})",
                    item.id, field, previous, value
                );
            }
        }

        Ok(record)
    }

    /// Flatten a batch. Items that fail are logged and left out; the rest
    /// keep their input order.
    pub fn flatten_all(&self, items: &[WebsetItem]) -> Vec<FlatRecord> {
        items
            .iter()
            .filter_map(|item| match self.flatten(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Error formatting item {}: {}", item.id, e);
                    None
                }
            })
            .collect()
    }
}
