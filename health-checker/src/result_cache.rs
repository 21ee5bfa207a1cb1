use crate::models::HealthCheckResult;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Latest result per target. Stored results never carry cache metadata; it is
/// stamped onto the copy handed out by [`ResultCache::get`].
#[derive(Debug)]
pub struct ResultCache {
    results: DashMap<Uuid, HealthCheckResult>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            results: DashMap::new(),
            ttl,
        }
    }

    /// `None` means the caller has to probe: forced, never probed, or stale.
    pub fn get(&self, target_id: Uuid, force: bool) -> Option<HealthCheckResult> {
        self.get_at(target_id, force, Utc::now())
    }

    pub fn get_at(
        &self,
        target_id: Uuid,
        force: bool,
        now: DateTime<Utc>,
    ) -> Option<HealthCheckResult> {
        if force {
            return None;
        }

        let stored = self.results.get(&target_id)?;
        if !self.is_fresh(stored.timestamp, now) {
            return None;
        }

        Some(HealthCheckResult {
            from_cache: true,
            cached_at: Some(stored.timestamp),
            ..stored.clone()
        })
    }

    fn is_fresh(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        // A clock that went backwards yields a negative age, which counts as fresh.
        match (now - stored_at).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        }
    }

    pub fn store(&self, result: HealthCheckResult) {
        let result = HealthCheckResult {
            from_cache: false,
            cached_at: None,
            ..result
        };
        self.results.insert(result.target_id, result);
    }

    pub fn last(&self, target_id: Uuid) -> Option<HealthCheckResult> {
        self.results.get(&target_id).map(|entry| entry.clone())
    }

    pub fn snapshot(&self) -> HashMap<Uuid, HealthCheckResult> {
        self.results
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorCategory, HealthStatus};

    fn result_at(target_id: Uuid, timestamp: DateTime<Utc>) -> HealthCheckResult {
        HealthCheckResult {
            status: HealthStatus::Up,
            error_category: ErrorCategory::None,
            http_status: Some(200),
            attempts: 1,
            timestamp,
            ..HealthCheckResult::new(target_id)
        }
    }

    #[test]
    fn test_miss_when_nothing_stored() {
        let cache = ResultCache::new(Duration::from_secs(30));
        assert!(cache.get(Uuid::new_v4(), false).is_none());
    }

    #[test]
    fn test_fresh_hit_carries_cache_metadata() {
        let cache = ResultCache::new(Duration::from_secs(30));
        let id = Uuid::new_v4();
        let stored_at = Utc::now();
        cache.store(result_at(id, stored_at));

        let hit = cache
            .get_at(id, false, stored_at + chrono::Duration::seconds(5))
            .unwrap();
        assert!(hit.from_cache);
        assert_eq!(hit.cached_at, Some(stored_at));
        assert_eq!(hit.timestamp, stored_at);
        assert_eq!(hit.status, HealthStatus::Up);
        assert_eq!(hit.error_category, ErrorCategory::None);
    }

    #[test]
    fn test_force_always_misses() {
        let cache = ResultCache::new(Duration::from_secs(30));
        let id = Uuid::new_v4();
        let now = Utc::now();
        cache.store(result_at(id, now));

        assert!(cache.get_at(id, true, now).is_none());
    }

    #[test]
    fn test_ttl_upper_bound_is_exclusive() {
        let cache = ResultCache::new(Duration::from_secs(30));
        let id = Uuid::new_v4();
        let stored_at = Utc::now();
        cache.store(result_at(id, stored_at));

        let just_before = stored_at + chrono::Duration::milliseconds(29_999);
        let exactly = stored_at + chrono::Duration::seconds(30);
        assert!(cache.get_at(id, false, just_before).is_some());
        assert!(cache.get_at(id, false, exactly).is_none());
    }

    #[test]
    fn test_zero_ttl_never_serves() {
        let cache = ResultCache::new(Duration::ZERO);
        let id = Uuid::new_v4();
        let now = Utc::now();
        cache.store(result_at(id, now));

        assert!(cache.get_at(id, false, now).is_none());
    }

    #[test]
    fn test_stored_original_is_not_marked() {
        let cache = ResultCache::new(Duration::from_secs(30));
        let id = Uuid::new_v4();
        let now = Utc::now();
        cache.store(result_at(id, now));

        let mut hit = cache.get_at(id, false, now).unwrap();
        hit.cached_at = None;
        hit.status = HealthStatus::Down;

        let original = cache.last(id).unwrap();
        assert!(!original.from_cache);
        assert!(original.cached_at.is_none());
        assert_eq!(original.status, HealthStatus::Up);
    }

    #[test]
    fn test_store_strips_cache_metadata() {
        let cache = ResultCache::new(Duration::from_secs(30));
        let id = Uuid::new_v4();
        let now = Utc::now();
        let marked = HealthCheckResult {
            from_cache: true,
            cached_at: Some(now),
            ..result_at(id, now)
        };
        cache.store(marked);

        let stored = cache.last(id).unwrap();
        assert!(!stored.from_cache);
        assert!(stored.cached_at.is_none());
    }

    #[test]
    fn test_store_replaces_previous_result() {
        let cache = ResultCache::new(Duration::from_secs(30));
        let id = Uuid::new_v4();
        let now = Utc::now();
        cache.store(result_at(id, now));
        cache.store(HealthCheckResult {
            status: HealthStatus::Down,
            ..result_at(id, now)
        });

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.snapshot()[&id].status, HealthStatus::Down);
    }
}
