use std::io::Error as IoError;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use checker::ValidationError;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

/// Errors a route hands back to the caller
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or mismatched secret")]
    Unauthorized,
    #[error("malformed body: {0}")]
    Body(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Body(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        warn!(error = %self, "rejecting check request");

        let message = match self {
            ApiError::Unauthorized => "unauthorized",
            ApiError::Body(_) | ApiError::Validation(_) => "invalid request",
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
