pub mod circuit_breaker;
pub mod classifier;
pub mod config;
pub mod error;
pub mod health_monitor;
pub mod models;
pub mod result_cache;
pub mod retry;
pub mod scheduler;
pub mod summary;
pub mod target_store;
pub mod transport;

pub use config::HealthCheckerConfig;
pub use error::HealthCheckError;
pub use health_monitor::HealthMonitor;
pub use models::{
    CreateTargetRequest, ErrorCategory, HealthCheckResult, HealthStatus, HttpMethod, Target,
    UpdateTargetRequest,
};
pub use scheduler::spawn_scheduler;
pub use summary::HealthSummary;
pub use target_store::{InMemoryTargetStore, TargetStore};
pub use transport::{MockTransport, ReqwestTransport, Transport, TransportError, TransportResponse};
