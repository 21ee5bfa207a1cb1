use crate::error::HealthCheckError;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct HealthCheckerConfig {
    pub cache_ttl: Duration,
    pub circuit_failure_threshold: u32,
    pub circuit_open_duration: Duration,
    pub retry_base_backoff: Duration,
    pub scheduler_interval: Duration,
    pub max_response_body_chars: usize,
}

impl Default for HealthCheckerConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(15),
            circuit_failure_threshold: 3,
            circuit_open_duration: Duration::from_secs(30),
            retry_base_backoff: Duration::from_millis(200),
            scheduler_interval: Duration::from_secs(30),
            max_response_body_chars: 2048,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, HealthCheckError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| HealthCheckError::InvalidConfig(format!("{key}={raw:?}: {e}"))),
        Err(_) => Ok(default),
    }
}

impl HealthCheckerConfig {
    pub fn from_env() -> Result<Self, HealthCheckError> {
        let defaults = Self::default();

        let config = Self {
            cache_ttl: Duration::from_millis(env_or(
                "CACHE_TTL_MILLIS",
                defaults.cache_ttl.as_millis() as u64,
            )?),

            circuit_failure_threshold: env_or(
                "CIRCUIT_FAILURE_THRESHOLD",
                defaults.circuit_failure_threshold,
            )?,

            circuit_open_duration: Duration::from_millis(env_or(
                "CIRCUIT_OPEN_MILLIS",
                defaults.circuit_open_duration.as_millis() as u64,
            )?),

            retry_base_backoff: Duration::from_millis(env_or(
                "RETRY_BASE_BACKOFF_MILLIS",
                defaults.retry_base_backoff.as_millis() as u64,
            )?),

            scheduler_interval: Duration::from_secs(env_or(
                "SCHEDULER_INTERVAL_SECS",
                defaults.scheduler_interval.as_secs(),
            )?),

            max_response_body_chars: env_or(
                "MAX_RESPONSE_BODY_CHARS",
                defaults.max_response_body_chars,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HealthCheckError> {
        if self.circuit_failure_threshold == 0 {
            return Err(HealthCheckError::InvalidConfig(
                "circuit failure threshold must be greater than 0".into(),
            ));
        }

        if self.scheduler_interval.is_zero() {
            return Err(HealthCheckError::InvalidConfig(
                "scheduler interval must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    pub fn log_configuration(&self) {
        info!(
            cache_ttl = ?self.cache_ttl,
            circuit_failure_threshold = self.circuit_failure_threshold,
            circuit_open_duration = ?self.circuit_open_duration,
            retry_base_backoff = ?self.retry_base_backoff,
            scheduler_interval = ?self.scheduler_interval,
            max_response_body_chars = self.max_response_body_chars,
            "health checker configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = HealthCheckerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl, Duration::from_secs(15));
        assert_eq!(config.circuit_failure_threshold, 3);
        assert_eq!(config.max_response_body_chars, 2048);
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let config = HealthCheckerConfig {
            circuit_failure_threshold: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HealthCheckError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_scheduler_interval_is_rejected() {
        let config = HealthCheckerConfig {
            scheduler_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_or_reports_bad_numbers() {
        std::env::set_var("HC_TEST_BAD_NUMBER", "twelve");
        let parsed: Result<u64, _> = env_or("HC_TEST_BAD_NUMBER", 1);
        std::env::remove_var("HC_TEST_BAD_NUMBER");

        assert!(matches!(parsed, Err(HealthCheckError::InvalidConfig(_))));
    }

    #[test]
    fn test_env_or_falls_back_to_default() {
        let parsed: u64 = env_or("HC_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(parsed, 42);
    }
}
