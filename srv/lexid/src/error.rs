use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::rate_limiter::RateLimitDecision;
use crate::services::word_source::GenerationError;

/// Errors surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed config or guess payload
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<String>,
    },

    #[error("{message}")]
    RateLimited {
        message: &'static str,
        decision: RateLimitDecision,
    },

    #[error("Game not found")]
    GameNotFound,

    /// Both word providers failed
    #[error("Failed to initialize game")]
    Generation(#[from] GenerationError),

    /// No word could be produced for the word list endpoint
    #[error("Failed to generate words")]
    WordList(GenerationError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>, details: Option<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            details,
        }
    }
}

/// Attach the `X-RateLimit-*` headers describing a limiter decision
pub fn with_rate_headers(
    mut builder: HttpResponseBuilder,
    decision: &RateLimitDecision,
) -> HttpResponseBuilder {
    builder
        .insert_header(("X-RateLimit-Limit", decision.limit.to_string()))
        .insert_header(("X-RateLimit-Remaining", decision.remaining.to_string()))
        .insert_header(("X-RateLimit-Reset", decision.reset_secs.to_string()));
    builder
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::GameNotFound => StatusCode::NOT_FOUND,
            ServiceError::Generation(_) | ServiceError::WordList(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let details = match self {
            ServiceError::Validation { details, .. } => details.clone(),
            ServiceError::Generation(source) | ServiceError::WordList(source) => {
                Some(source.to_string())
            }
            _ => None,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            details,
        };

        let mut builder = HttpResponse::build(self.status_code());
        if let ServiceError::RateLimited { decision, .. } = self {
            builder = with_rate_headers(builder, decision);
            builder.insert_header(("Retry-After", decision.reset_secs.to_string()));
        }
        builder.json(body)
    }
}
