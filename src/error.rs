use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{
    dao::{storage::StorageError, user_store::StoreError},
    dto::reply::Reply,
    services::question_resolver::ResolverError,
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Player state could not be persisted.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// No question source could provide a question.
    #[error("no question available")]
    NoQuestion(#[from] ResolverError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidDifficulty(invalid) => ServiceError::InvalidInput(invalid.to_string()),
            StoreError::Storage(source) => ServiceError::Unavailable(source),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Failure inside the bot; details are logged, never shown to the player.
    #[error("internal error")]
    Internal(#[source] ServiceError),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            other => AppError::Internal(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { message })).into_response()
            }
            AppError::Internal(err) => {
                error!(error = %error_chain(&err), "action failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(Reply::internal_error())).into_response()
            }
        }
    }
}

/// Render an error with all of its sources, outermost first.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
