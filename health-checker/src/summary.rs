use crate::models::{HealthCheckResult, HealthStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    /// Only statuses that occur are present.
    pub status_counts: BTreeMap<HealthStatus, u64>,
    pub last_updated: DateTime<Utc>,
}

impl HealthSummary {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a HealthCheckResult>) -> Self {
        let mut status_counts = BTreeMap::new();
        for result in results {
            *status_counts.entry(result.status).or_insert(0) += 1;
        }

        Self {
            status_counts,
            last_updated: Utc::now(),
        }
    }

    pub fn count(&self, status: HealthStatus) -> u64 {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }
}
