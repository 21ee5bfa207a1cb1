//! Maps one transport outcome plus the target's thresholds to a health verdict.
//!
//! Successful exchanges are checked in a fixed order and the first violated rule
//! wins: latency, auth, rate limiting, status range, body substring, JSON body.
//! Failed exchanges map one-to-one from [`TransportError`] to a category and are
//! always `DOWN`.

use crate::models::{ErrorCategory, HealthStatus, Target};
use crate::transport::{TransportError, TransportResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: HealthStatus,
    pub category: ErrorCategory,
    pub message: Option<String>,
}

impl Classification {
    fn up() -> Self {
        Self {
            status: HealthStatus::Up,
            category: ErrorCategory::None,
            message: None,
        }
    }

    fn down(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Down,
            category,
            message: Some(message.into()),
        }
    }
}

pub fn classify(
    outcome: &Result<TransportResponse, TransportError>,
    target: &Target,
) -> Classification {
    match outcome {
        Ok(response) => classify_response(response, target),
        Err(error) => classify_failure(error),
    }
}

pub fn classify_response(response: &TransportResponse, target: &Target) -> Classification {
    let status_code = response.status_code;

    if response.duration.as_millis() > u128::from(target.slow_threshold_ms) {
        return Classification {
            status: HealthStatus::Degraded,
            category: ErrorCategory::SlowResponse,
            message: Some("Response exceeded slow threshold".to_string()),
        };
    }

    if status_code == 401 || status_code == 403 {
        return Classification::down(ErrorCategory::AuthFailure, "Authentication failed");
    }

    if status_code == 429 {
        return Classification::down(ErrorCategory::RateLimit, "Rate limited");
    }

    if !(target.expected_status_min..=target.expected_status_max).contains(&status_code) {
        return Classification::down(
            ErrorCategory::HttpError,
            format!("Unexpected HTTP status {status_code}"),
        );
    }

    if let Some(needle) = &target.expected_body_contains {
        let found = response
            .body
            .as_deref()
            .is_some_and(|body| body.contains(needle.as_str()));
        if !found {
            return Classification::down(
                ErrorCategory::HttpError,
                "Response body missing expected content",
            );
        }
    }

    if target.expect_json {
        let parses = response
            .body
            .as_deref()
            .is_some_and(|body| serde_json::from_str::<serde_json::Value>(body).is_ok());
        if !parses {
            return Classification::down(ErrorCategory::InvalidJson, "Invalid JSON response");
        }
    }

    Classification::up()
}

pub fn classify_failure(error: &TransportError) -> Classification {
    match error {
        TransportError::Timeout => Classification::down(ErrorCategory::Timeout, "Request timed out"),
        TransportError::DnsFailure(_) => {
            Classification::down(ErrorCategory::DnsFailure, "DNS resolution failed")
        }
        TransportError::TlsFailure(_) => {
            Classification::down(ErrorCategory::TlsError, "TLS handshake failed")
        }
        TransportError::ConnectionFailure(_) => {
            Classification::down(ErrorCategory::ConnectionFailure, "Connection failed")
        }
        TransportError::Other { kind, message } => {
            Classification::down(ErrorCategory::Unknown, format!("{kind}: {message}"))
        }
    }
}

/// Keeps the first `max_chars` characters; never splits a UTF-8 sequence.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((end, _)) => body[..end].to_string(),
        None => body.to_string(),
    }
}
