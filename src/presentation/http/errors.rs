use poem::{Error as PoemError, Response, http::StatusCode};

use crate::domain::errors::DomainError;

pub fn internal_error(err: anyhow::Error) -> PoemError {
    tracing::error!(error = ?err, "request failed");
    PoemError::from_string("internal server error", StatusCode::INTERNAL_SERVER_ERROR)
}

pub fn domain_error(err: DomainError) -> PoemError {
    match err {
        DomainError::Validation(_) => {
            PoemError::from_string(err.to_string(), StatusCode::BAD_REQUEST)
        }
        DomainError::Forbidden(_) => PoemError::from_string(err.to_string(), StatusCode::FORBIDDEN),
        DomainError::RateLimited { retry_after } => {
            too_many_requests(retry_after.map(|d| d.as_secs()))
        }
        DomainError::Other(err) => internal_error(err),
    }
}

pub fn too_many_requests(retry_after_secs: Option<u64>) -> PoemError {
    let mut builder = Response::builder().status(StatusCode::TOO_MANY_REQUESTS);
    if let Some(secs) = retry_after_secs {
        builder = builder.header("Retry-After", secs.max(1).to_string());
    }
    PoemError::from_response(builder.body("too many requests, try again later"))
}
