use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::cache::CacheError;

pub const DUPLICATE_NAME_ERR_MSG: &str =
    "An entry with the identical name already exists. Please select a different name.";
pub const INVALID_ID_ERR_MSG: &str =
    "The provided Id does not have associated User Information. Please provide a valid Id.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("An entry with the identical name already exists. Please select a different name.")]
    DuplicateName,
    #[error("The provided Id does not have associated User Information. Please provide a valid Id.")]
    NotFound,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

/// 统一的错误响应体
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorDetails {
    status_code: u16,
    message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateName | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(ErrorDetails {
            status_code: status.as_u16(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_maps_to_bad_request() {
        assert_eq!(AppError::DuplicateName.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_not_found() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unclassified_errors_map_to_internal_server_error() {
        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn user_facing_messages_match_published_constants() {
        assert_eq!(AppError::DuplicateName.to_string(), DUPLICATE_NAME_ERR_MSG);
        assert_eq!(AppError::NotFound.to_string(), INVALID_ID_ERR_MSG);
    }

    #[test]
    fn error_body_uses_pascal_case_fields() {
        let body = serde_json::to_value(ErrorDetails {
            status_code: 400,
            message: DUPLICATE_NAME_ERR_MSG.to_string(),
        })
        .unwrap();

        assert_eq!(body["StatusCode"], 400);
        assert_eq!(body["Message"], DUPLICATE_NAME_ERR_MSG);
    }
}
