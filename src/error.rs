//! Request error taxonomy.
//!
//! Errors carry a client-facing message and map onto a small set of HTTP
//! statuses; everything unexpected collapses to a generic 500 with the
//! detail kept in the logs.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mongodb::error::{ErrorKind, WriteFailure};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("invalid or expired token")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("invalid multipart payload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    JsonBody(#[from] JsonRejection),

    #[error("{0}")]
    QueryString(#[from] QueryRejection),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::Validation(_)
            | ApiError::Multipart(_)
            | ApiError::JsonBody(_)
            | ApiError::QueryString(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::Token(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(e) if is_duplicate_key(e) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Database(e) if is_duplicate_key(e) => {
                "Duplicate field value entered".to_string()
            }
            ApiError::Database(_) | ApiError::Internal(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match *error.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => write_error.code == 11000,
        ErrorKind::Command(ref command_error) => command_error.code == 11000,
        _ => false,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }
        let body = json!({
            "success": false,
            "message": self.public_message(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3))]
        name: String,
    }

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_errors_become_bad_requests() {
        let err = Probe { name: "ab".into() }.validate().unwrap_err();
        assert_eq!(ApiError::from(err).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn duplicate_key_errors_map_to_conflict() {
        let err = ApiError::Database(command_error(11000, "DuplicateKey"));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.public_message(), "Duplicate field value entered");

        let err = ApiError::Database(command_error(2, "BadValue"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal Server Error");
    }

    fn command_error(code: i32, code_name: &str) -> mongodb::error::Error {
        let command_error: mongodb::error::CommandError =
            mongodb::bson::from_document(mongodb::bson::doc! {
                "code": code,
                "codeName": code_name,
                "errmsg": "server rejected the write",
            })
            .unwrap();
        ErrorKind::Command(command_error).into()
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err = ApiError::Internal(anyhow::anyhow!("connection string leaked"));
        assert_eq!(err.public_message(), "Internal Server Error");
        let err = ApiError::NotFound("Product not found".into());
        assert_eq!(err.public_message(), "Product not found");
    }
}
