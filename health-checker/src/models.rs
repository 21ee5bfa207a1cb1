use crate::error::HealthCheckError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Unknown` is only the pre-classification default; classified results never carry it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Up,
    Degraded,
    Down,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    None,
    Timeout,
    DnsFailure,
    TlsError,
    ConnectionFailure,
    HttpError,
    AuthFailure,
    RateLimit,
    InvalidJson,
    SlowResponse,
    CircuitOpen,
    #[default]
    Unknown,
}

/// A monitored endpoint. `id` is assigned on creation and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub timeout_ms: u64,
    pub expected_status_min: u16,
    pub expected_status_max: u16,
    pub expect_json: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_body_contains: Option<String>,
    pub slow_threshold_ms: u64,
    pub max_retries: u32,
}

impl Target {
    pub fn from_request(id: Uuid, request: CreateTargetRequest) -> Self {
        let content_type = match (request.content_type, &request.request_body) {
            (Some(content_type), _) => Some(content_type),
            (None, Some(_)) => Some(DEFAULT_CONTENT_TYPE.to_string()),
            (None, None) => None,
        };

        Self {
            id,
            name: request.name,
            url: request.url.trim().to_string(),
            method: request.method,
            headers: request.headers,
            request_body: request.request_body,
            content_type,
            timeout_ms: request.timeout_ms,
            expected_status_min: request.expected_status_min,
            expected_status_max: request.expected_status_max,
            expect_json: request.expect_json,
            expected_body_contains: request.expected_body_contains,
            slow_threshold_ms: request.slow_threshold_ms,
            max_retries: request.max_retries,
        }
    }

    /// Applies every supplied field, leaving the others untouched.
    pub fn apply_update(&mut self, update: UpdateTargetRequest) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(url) = update.url {
            self.url = url.trim().to_string();
        }
        if let Some(method) = update.method {
            self.method = method;
        }
        if let Some(headers) = update.headers {
            self.headers = Some(headers);
        }
        if let Some(body) = update.request_body {
            self.request_body = Some(body);
            if update.content_type.is_none() && self.content_type.is_none() {
                self.content_type = Some(DEFAULT_CONTENT_TYPE.to_string());
            }
        }
        if let Some(content_type) = update.content_type {
            self.content_type = Some(content_type);
        }
        if let Some(timeout_ms) = update.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(min) = update.expected_status_min {
            self.expected_status_min = min;
        }
        if let Some(max) = update.expected_status_max {
            self.expected_status_max = max;
        }
        if let Some(expect_json) = update.expect_json {
            self.expect_json = expect_json;
        }
        if let Some(needle) = update.expected_body_contains {
            self.expected_body_contains = Some(needle);
        }
        if let Some(slow_threshold_ms) = update.slow_threshold_ms {
            self.slow_threshold_ms = slow_threshold_ms;
        }
        if let Some(max_retries) = update.max_retries {
            self.max_retries = max_retries;
        }
    }

    pub fn validate(&self) -> Result<(), HealthCheckError> {
        if self.name.trim().is_empty() {
            return Err(HealthCheckError::Validation("name must not be blank".into()));
        }

        let url = self.url.trim();
        let has_host = |scheme: &str| url.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty());
        if !has_host("http://") && !has_host("https://") {
            return Err(HealthCheckError::Validation(
                "url must start with http:// or https://".into(),
            ));
        }

        if self.timeout_ms == 0 {
            return Err(HealthCheckError::Validation(
                "timeout must be greater than 0".into(),
            ));
        }

        for status in [self.expected_status_min, self.expected_status_max] {
            if !(100..=599).contains(&status) {
                return Err(HealthCheckError::Validation(format!(
                    "expected status {status} is not a valid HTTP status"
                )));
            }
        }

        if self.expected_status_min > self.expected_status_max {
            return Err(HealthCheckError::Validation(format!(
                "expected status range {}..={} is empty",
                self.expected_status_min, self.expected_status_max
            )));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_status_min() -> u16 {
    200
}

fn default_status_max() -> u16 {
    299
}

fn default_slow_threshold_ms() -> u64 {
    2000
}

fn default_max_retries() -> u32 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetRequest {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub request_body: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_status_min")]
    pub expected_status_min: u16,
    #[serde(default = "default_status_max")]
    pub expected_status_max: u16,
    #[serde(default)]
    pub expect_json: bool,
    #[serde(default)]
    pub expected_body_contains: Option<String>,
    #[serde(default = "default_slow_threshold_ms")]
    pub slow_threshold_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl CreateTargetRequest {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method: HttpMethod::default(),
            headers: None,
            request_body: None,
            content_type: None,
            timeout_ms: default_timeout_ms(),
            expected_status_min: default_status_min(),
            expected_status_max: default_status_max(),
            expect_json: false,
            expected_body_contains: None,
            slow_threshold_ms: default_slow_threshold_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// Partial update: `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTargetRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub headers: Option<HashMap<String, String>>,
    pub request_body: Option<String>,
    pub content_type: Option<String>,
    pub timeout_ms: Option<u64>,
    pub expected_status_min: Option<u16>,
    pub expected_status_max: Option<u16>,
    pub expect_json: Option<bool>,
    pub expected_body_contains: Option<String>,
    pub slow_threshold_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    pub target_id: Uuid,
    pub status: HealthStatus,
    pub http_status: Option<u16>,
    pub latency_ms: u64,
    pub response_body_preview: Option<String>,
    pub response_headers: BTreeMap<String, Vec<String>>,
    pub error_category: ErrorCategory,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub attempts: u32,
    pub from_cache: bool,
    pub cached_at: Option<DateTime<Utc>>,
}

impl HealthCheckResult {
    pub fn new(target_id: Uuid) -> Self {
        Self {
            target_id,
            status: HealthStatus::Unknown,
            http_status: None,
            latency_ms: 0,
            response_body_preview: None,
            response_headers: BTreeMap::new(),
            error_category: ErrorCategory::Unknown,
            error_message: None,
            timestamp: Utc::now(),
            attempts: 0,
            from_cache: false,
            cached_at: None,
        }
    }

    pub fn circuit_open(target_id: Uuid) -> Self {
        Self {
            status: HealthStatus::Down,
            error_category: ErrorCategory::CircuitOpen,
            error_message: Some("Circuit breaker open".to_string()),
            ..Self::new(target_id)
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == HealthStatus::Up
    }
}
