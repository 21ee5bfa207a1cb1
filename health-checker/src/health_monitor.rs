use crate::circuit_breaker::{CircuitBreakerRegistry, CircuitBreakerState};
use crate::classifier::{classify, truncate_body};
use crate::config::HealthCheckerConfig;
use crate::error::HealthCheckError;
use crate::models::{CreateTargetRequest, HealthCheckResult, Target, UpdateTargetRequest};
use crate::result_cache::ResultCache;
use crate::retry::RetryPolicy;
use crate::summary::HealthSummary;
use crate::target_store::TargetStore;
use crate::transport::Transport;
use chrono::Utc;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct HealthMonitor {
    store: Box<dyn TargetStore>,
    transport: Box<dyn Transport>,
    cache: ResultCache,
    breakers: CircuitBreakerRegistry,
    retry: RetryPolicy,
    config: HealthCheckerConfig,
}

impl HealthMonitor {
    pub fn new(
        store: Box<dyn TargetStore>,
        transport: Box<dyn Transport>,
        config: HealthCheckerConfig,
    ) -> Self {
        Self {
            store,
            transport,
            cache: ResultCache::new(config.cache_ttl),
            breakers: CircuitBreakerRegistry::new(
                config.circuit_failure_threshold,
                config.circuit_open_duration,
            ),
            retry: RetryPolicy::new(config.retry_base_backoff),
            config,
        }
    }

    pub fn get_cycle_interval(&self) -> Duration {
        self.config.scheduler_interval
    }

    pub async fn create_target(
        &self,
        request: CreateTargetRequest,
    ) -> Result<Target, HealthCheckError> {
        let target = Target::from_request(Uuid::new_v4(), request);
        target.validate()?;

        self.store.put(target.clone()).await;
        info!(
            target_id = %target.id,
            name = %target.name,
            method = %target.method,
            url = %target.url,
            "target created"
        );
        Ok(target)
    }

    pub async fn get_target(&self, id: Uuid) -> Result<Target, HealthCheckError> {
        self.store.get(id).await.ok_or(HealthCheckError::NotFound(id))
    }

    pub async fn list_targets(&self) -> Vec<Target> {
        self.store.list().await
    }

    pub async fn update_target(
        &self,
        id: Uuid,
        update: UpdateTargetRequest,
    ) -> Result<Target, HealthCheckError> {
        let target = self.store.update(id, update).await?;
        info!(target_id = %id, "target updated");
        Ok(target)
    }

    /// Cached results and breaker state for the id are left in place.
    pub async fn delete_target(&self, id: Uuid) -> bool {
        let removed = self.store.delete(id).await;
        if removed {
            info!(target_id = %id, "target deleted");
        }
        removed
    }

    /// Cache first, then the circuit breaker, then the retry loop.
    pub async fn check_target(
        &self,
        id: Uuid,
        force: bool,
    ) -> Result<HealthCheckResult, HealthCheckError> {
        let target = self.get_target(id).await?;

        if let Some(cached) = self.cache.get(id, force) {
            debug!(target_id = %id, cached_at = ?cached.cached_at, "serving cached result");
            return Ok(cached);
        }

        if self.breakers.is_open(id) {
            debug!(target_id = %id, "circuit open, skipping probe");
            let result = HealthCheckResult::circuit_open(id);
            self.cache.store(result.clone());
            return Ok(result);
        }

        let result = self
            .retry
            .run(target.max_retries, |_| self.execute_once(&target))
            .await;
        self.cache.store(result.clone());

        if result.is_up() {
            self.breakers.record_success(id);
        } else {
            self.breakers.record_failure(id);
        }

        info!(
            target_id = %id,
            status = ?result.status,
            category = ?result.error_category,
            latency_ms = result.latency_ms,
            attempts = result.attempts,
            "health check completed"
        );
        Ok(result)
    }

    /// One scheduler cycle: checks every registered target without forcing.
    /// Targets deleted mid-cycle are skipped. Returns how many were checked.
    pub async fn monitor_all_targets(&self) -> usize {
        let mut checked = 0;
        for id in self.store.ids().await {
            match self.check_target(id, false).await {
                Ok(_) => checked += 1,
                Err(HealthCheckError::NotFound(_)) => {
                    debug!(target_id = %id, "target removed during cycle, skipping");
                }
                Err(e) => warn!(target_id = %id, error = %e, "scheduled check failed"),
            }
        }
        checked
    }

    pub fn get_last_results(&self) -> HashMap<Uuid, HealthCheckResult> {
        self.cache.snapshot()
    }

    pub fn get_summary(&self) -> HealthSummary {
        let results = self.cache.snapshot();
        HealthSummary::from_results(results.values())
    }

    pub fn circuit_state(&self, id: Uuid) -> Option<CircuitBreakerState> {
        self.breakers.state(id)
    }

    async fn execute_once(&self, target: &Target) -> HealthCheckResult {
        let started = Instant::now();
        let outcome = self.transport.execute(target).await;
        let verdict = classify(&outcome, target);

        let mut result = HealthCheckResult::new(target.id);
        match outcome {
            Ok(response) => {
                result.latency_ms = response.duration.as_millis() as u64;
                result.http_status = Some(response.status_code);
                result.response_headers = response.headers;
                result.response_body_preview = response
                    .body
                    .map(|body| truncate_body(&body, self.config.max_response_body_chars));
            }
            Err(error) => {
                result.latency_ms = started.elapsed().as_millis() as u64;
                debug!(target_id = %target.id, error = %error, "transport failure");
            }
        }

        result.status = verdict.status;
        result.error_category = verdict.category;
        result.error_message = verdict.message;
        result.timestamp = Utc::now();
        result
    }
}
