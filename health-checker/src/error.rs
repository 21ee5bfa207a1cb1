use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HealthCheckError {
    #[error("target {0} not found")]
    NotFound(Uuid),

    #[error("invalid target: {0}")]
    Validation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
