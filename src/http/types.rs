use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::error::TodoError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody { pub message: String }

/// Error response: a status code plus a `{"message": ...}` body.
#[derive(Debug)]
pub struct ApiError { pub status: StatusCode, pub message: String }

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
}

impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        let status = match &err {
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::Conflict(_) => StatusCode::CONFLICT,
            TodoError::Store(e) => {
                tracing::error!(error = %e, "store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self { status, message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response { (self.status, axum::Json(ErrorBody { message: self.message })).into_response() }
}
