use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

pub const EVENT_NOT_FOUND: &str = "The event doesn't exist!";

/// Per-field validation messages, keyed by request parameter name.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request parameters: {0:?}")]
    Validation(FieldErrors),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("The event doesn't exist!")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn field(name: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation(BTreeMap::from([(name, message.into())]))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(fields) => json!({ "message": fields }),
            ApiError::BadRequest(reason) => json!({ "message": reason }),
            ApiError::NotFound => json!({ "message": EVENT_NOT_FOUND }),
            ApiError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                json!({ "message": "Internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_uses_fixed_message() {
        let (status, body) = render(ApiError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "The event doesn't exist!" }));
    }

    #[tokio::test]
    async fn validation_errors_are_keyed_by_field() {
        let (status, body) = render(ApiError::field("date", "bad date")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": { "date": "bad date" } }));
    }

    #[tokio::test]
    async fn database_errors_do_not_leak_details() {
        let (status, body) = render(ApiError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Internal server error" }));
    }
}
