//! Mapping of service errors and body rejections onto HTTP responses.

use crate::error::MovieError;
use crate::transport::http::types::MessageResponse;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

impl MovieError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MovieError::Validation(_) | MovieError::InvalidId(_) => StatusCode::BAD_REQUEST,
            MovieError::NotFound => StatusCode::NOT_FOUND,
            MovieError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            MovieError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MovieError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            MovieError::StorageUnavailable(msg) => warn!(error = %msg, "storage unavailable"),
            MovieError::Internal(msg) => error!(error = %msg, "internal error"),
            _ => {}
        }
        (status, Json(MessageResponse::new(self.to_string()))).into_response()
    }
}

/// Unwraps a JSON body or turns the rejection into a 422 with a `message` body.
pub fn json_body<T>(request: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match request {
        Ok(Json(body)) => Ok(body),
        Err(e) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(MessageResponse::new(format!(
                "Invalid JSON body: {} (expected an object with title, rating, description, releaseDate)",
                e.body_text()
            ))),
        )
            .into_response()),
    }
}

/// Unwraps query parameters; rejections keep their status but answer with a `message` body.
pub fn query_params<T>(request: Result<Query<T>, QueryRejection>) -> Result<T, Response> {
    match request {
        Ok(Query(params)) => Ok(params),
        Err(e) => Err(rejection_response(e.status(), e.body_text())),
    }
}

/// Unwraps a path parameter; rejections keep their status but answer with a `message` body.
pub fn path_param<T>(request: Result<Path<T>, PathRejection>) -> Result<T, Response> {
    match request {
        Ok(Path(value)) => Ok(value),
        Err(e) => Err(rejection_response(e.status(), e.body_text())),
    }
}

fn rejection_response(status: StatusCode, message: String) -> Response {
    (status, Json(MessageResponse::new(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_taxonomy_maps_to_distinct_statuses() {
        assert_eq!(
            MovieError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MovieError::InvalidId("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(MovieError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            MovieError::StorageUnavailable("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            MovieError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_is_stable() {
        assert_eq!(MovieError::NotFound.to_string(), "Movie not found");
    }
}
