use crate::models::{HttpMethod, Target};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::error::Error as StdError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Performs exactly one HTTP exchange for a target.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, target: &Target) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status_code: u16,
    pub body: Option<String>,
    pub headers: BTreeMap<String, Vec<String>>,
    pub duration: Duration,
}

impl TransportResponse {
    pub fn new(status_code: u16, body: impl Into<String>, duration: Duration) -> Self {
        Self {
            status_code,
            body: Some(body.into()),
            headers: BTreeMap::new(),
            duration,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }
}

/// Why no response was obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("DNS resolution failed: {0}")]
    DnsFailure(String),

    #[error("TLS handshake failed: {0}")]
    TlsFailure(String),

    #[error("connection failed: {0}")]
    ConnectionFailure(String),

    #[error("{kind}: {message}")]
    Other { kind: String, message: String },
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Head => Method::HEAD,
    }
}

fn source_chain(err: &reqwest::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

fn reqwest_kind(err: &reqwest::Error) -> &'static str {
    if err.is_builder() {
        "BuilderError"
    } else if err.is_redirect() {
        "RedirectError"
    } else if err.is_body() {
        "BodyError"
    } else if err.is_decode() {
        "DecodeError"
    } else if err.is_request() {
        "RequestError"
    } else {
        "HttpClientError"
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout;
    }

    let chain = source_chain(&err);
    if err.is_connect() {
        let lowered = chain.to_lowercase();
        if lowered.contains("dns error") || lowered.contains("failed to lookup address") {
            return TransportError::DnsFailure(chain);
        }
        if ["tls", "ssl", "certificate", "handshake"]
            .iter()
            .any(|needle| lowered.contains(needle))
        {
            return TransportError::TlsFailure(chain);
        }
        return TransportError::ConnectionFailure(chain);
    }

    TransportError::Other {
        kind: reqwest_kind(&err).to_string(),
        message: chain,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, target: &Target) -> Result<TransportResponse, TransportError> {
        let method = to_reqwest_method(target.method);
        let mut request = self
            .client
            .request(method, &target.url)
            .timeout(target.timeout());

        if let Some(content_type) = target
            .content_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
        {
            request = request.header(CONTENT_TYPE, content_type);
        }

        if let Some(headers) = &target.headers {
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        if target.method != HttpMethod::Head {
            if let Some(body) = &target.request_body {
                request = request.body(body.clone());
            }
        }

        let start = Instant::now();
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status_code = response.status().as_u16();

        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(TransportResponse {
            status_code,
            body: Some(body),
            headers,
            duration: start.elapsed(),
        })
    }
}

/// Scripted transport: per-target queues of outcomes, falling back to a default response.
#[derive(Clone)]
pub struct MockTransport {
    outcomes: Arc<Mutex<HashMap<Uuid, VecDeque<Result<TransportResponse, TransportError>>>>>,
    default_response: TransportResponse,
    calls: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(HashMap::new())),
            default_response: TransportResponse::new(200, "{}", Duration::from_millis(50)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_default_response(mut self, response: TransportResponse) -> Self {
        self.default_response = response;
        self
    }

    pub fn enqueue(&self, target_id: Uuid, outcome: Result<TransportResponse, TransportError>) {
        let mut outcomes = self.outcomes.lock().unwrap();
        outcomes.entry(target_id).or_default().push_back(outcome);
    }

    pub fn enqueue_response(&self, target_id: Uuid, status_code: u16, body: &str, duration_ms: u64) {
        self.enqueue(
            target_id,
            Ok(TransportResponse::new(
                status_code,
                body,
                Duration::from_millis(duration_ms),
            )),
        );
    }

    pub fn enqueue_error(&self, target_id: Uuid, error: TransportError) {
        self.enqueue(target_id, Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, target: &Target) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = {
            let mut outcomes = self.outcomes.lock().unwrap();
            outcomes
                .get_mut(&target.id)
                .and_then(|queue| queue.pop_front())
        };

        next.unwrap_or_else(|| Ok(self.default_response.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateTargetRequest;

    fn target() -> Target {
        Target::from_request(
            Uuid::new_v4(),
            CreateTargetRequest::new("test", "http://example.com/health"),
        )
    }

    #[tokio::test]
    async fn test_mock_transport_replays_queue_then_default() {
        let target = target();
        let transport = MockTransport::new()
            .with_default_response(TransportResponse::new(204, "", Duration::from_millis(5)));

        transport.enqueue_error(target.id, TransportError::Timeout);
        transport.enqueue_response(target.id, 500, "boom", 10);

        assert_eq!(
            transport.execute(&target).await,
            Err(TransportError::Timeout)
        );
        assert_eq!(transport.execute(&target).await.unwrap().status_code, 500);
        assert_eq!(transport.execute(&target).await.unwrap().status_code, 204);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_transport_queues_are_per_target() {
        let first = target();
        let second = target();
        let transport = MockTransport::new();

        transport.enqueue_response(first.id, 503, "down", 10);

        assert_eq!(transport.execute(&second).await.unwrap().status_code, 200);
        assert_eq!(transport.execute(&first).await.unwrap().status_code, 503);
    }

    #[tokio::test]
    async fn test_mock_transport_clones_share_state() {
        let target = target();
        let transport = MockTransport::new();
        let handle = transport.clone();

        handle.enqueue_response(target.id, 418, "teapot", 1);

        assert_eq!(transport.execute(&target).await.unwrap().status_code, 418);
        assert_eq!(handle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_reqwest_transport_reports_connection_refused() {
        // Nothing listens on the discard port locally.
        let mut target = target();
        target.url = "http://127.0.0.1:9/".to_string();
        target.timeout_ms = 2000;

        let transport = ReqwestTransport::new().unwrap();
        let outcome = transport.execute(&target).await;

        assert!(matches!(
            outcome,
            Err(TransportError::ConnectionFailure(_)) | Err(TransportError::Timeout)
        ));
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Other {
            kind: "BodyError".to_string(),
            message: "stream closed".to_string(),
        };
        assert_eq!(err.to_string(), "BodyError: stream closed");
    }
}
