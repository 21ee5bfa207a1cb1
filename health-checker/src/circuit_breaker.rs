//! Per-target circuit breaker.
//!
//! There is no explicit half-open state. Expiry of the open window is noticed
//! lazily on the next query, and the consecutive-failure counter is cleared only
//! by a recorded success, never by the window lapsing.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CircuitBreakerState {
    consecutive_failures: u32,
    open_until: Option<DateTime<Utc>>,
}

impl CircuitBreakerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.is_open_at(Utc::now())
    }

    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.open_until.is_some_and(|until| now < until)
    }

    /// Returns true when this failure tripped the breaker.
    pub fn record_failure(&mut self, threshold: u32, open_duration: Duration) -> bool {
        self.record_failure_at(threshold, open_duration, Utc::now())
    }

    pub fn record_failure_at(
        &mut self,
        threshold: u32,
        open_duration: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.consecutive_failures < threshold {
            return false;
        }

        let window = chrono::Duration::from_std(open_duration).unwrap_or(chrono::Duration::MAX);
        self.open_until = Some(now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC));
        true
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.open_until = None;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn open_until(&self) -> Option<DateTime<Utc>> {
        self.open_until
    }
}

/// One breaker per target id, created on first use.
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    breakers: DashMap<Uuid, CircuitBreakerState>,
    failure_threshold: u32,
    open_duration: Duration,
}

impl CircuitBreakerRegistry {
    pub fn new(failure_threshold: u32, open_duration: Duration) -> Self {
        Self {
            breakers: DashMap::new(),
            failure_threshold,
            open_duration,
        }
    }

    pub fn is_open(&self, target_id: Uuid) -> bool {
        self.breakers
            .entry(target_id)
            .or_default()
            .is_open()
    }

    pub fn record_success(&self, target_id: Uuid) {
        self.breakers.entry(target_id).or_default().record_success();
    }

    pub fn record_failure(&self, target_id: Uuid) {
        let mut breaker = self.breakers.entry(target_id).or_default();
        if breaker.record_failure(self.failure_threshold, self.open_duration) {
            warn!(
                target_id = %target_id,
                consecutive_failures = breaker.consecutive_failures(),
                open_for = ?self.open_duration,
                "circuit breaker opened"
            );
        }
    }

    pub fn state(&self, target_id: Uuid) -> Option<CircuitBreakerState> {
        self.breakers.get(&target_id).map(|breaker| breaker.clone())
    }
}
