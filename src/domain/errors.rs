use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Operation not allowed: {0}")]
    Forbidden(String),
    #[error("Rate limit exceeded, retry after {}s", retry_after.map(|d| d.as_secs()).unwrap_or(0))]
    RateLimited { retry_after: Option<Duration> },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
