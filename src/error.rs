use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{
    checkout::Message,
    ingest::{OPTIONAL_FIELDS, REQUIRED_FIELDS, StructuralError, ValidationFailure},
};

pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing API key";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{}", UNAUTHORIZED_MESSAGE)]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("Validation failed with {} error(s)", .0.total)]
    Validation(ValidationFailure),

    #[error("{message}")]
    Checkout {
        message: String,
        messages: Vec<Message>,
    },

    #[error("Insert stopped after {inserted} of {total} products were committed")]
    PartialCommit {
        inserted: u64,
        total: usize,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn checkout(message: impl Into<String>, messages: Vec<Message>) -> Self {
        AppError::Checkout {
            message: message.into(),
            messages,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::Structural(_)
            | AppError::Validation(_)
            | AppError::Checkout { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::PartialCommit { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::DbError(_) | AppError::OrmError(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            AppError::Structural(StructuralError::MissingColumns { missing, found }) => json!({
                "error": self.to_string(),
                "missing": missing,
                "required": REQUIRED_FIELDS,
                "optional": OPTIONAL_FIELDS,
                "found": found,
            }),
            AppError::Structural(_) => json!({
                "error": self.to_string(),
                "required": REQUIRED_FIELDS,
                "optional": OPTIONAL_FIELDS,
            }),
            AppError::Validation(failure) => json!({
                "error": self.to_string(),
                "errors": failure.errors,
                "total_errors": failure.total,
                "rows": failure.rows,
            }),
            AppError::Checkout { messages, .. } => json!({
                "error": self.to_string(),
                "messages": messages,
            }),
            AppError::PartialCommit { inserted, total, .. } => json!({
                "error": self.to_string(),
                "inserted": inserted,
                "total": total,
            }),
            AppError::DbError(_) | AppError::OrmError(_) => json!({
                "error": "Storage unavailable",
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                AppError::PartialCommit { source, .. } => {
                    tracing::error!(error = %self, cause = %source, "request failed")
                }
                AppError::DbError(err) => tracing::error!(error = %err, "database error"),
                AppError::OrmError(err) => tracing::error!(error = %err, "database error"),
                AppError::Internal(err) => tracing::error!(error = %err, "internal error"),
                _ => tracing::error!(error = %self, "request failed"),
            }
        }

        (status, axum::Json(self.body())).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::BadRequest(err.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::Severity;
    use crate::ingest::RowError;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn missing_columns_echo_the_contract() {
        let (status, body) = render(AppError::Structural(StructuralError::MissingColumns {
            missing: vec!["url".into()],
            found: vec!["name".into(), "price".into()],
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["required"], json!(["name", "price", "url"]));
        assert_eq!(body["found"], json!(["name", "price"]));
        assert_eq!(body["optional"].as_array().map(Vec::len), Some(6));
        assert!(body["error"].as_str().unwrap().contains("url"));
    }

    #[tokio::test]
    async fn validation_reports_capped_list_and_true_total() {
        let (status, body) = render(AppError::Validation(ValidationFailure {
            errors: vec![RowError {
                row: 4,
                field: "price".into(),
                message: "price must be non-negative, got -3".into(),
            }],
            total: 25,
            rows: 30,
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["row"], 4);
        assert_eq!(body["total_errors"], 25);
    }

    #[tokio::test]
    async fn unauthorized_is_uniform() {
        let (status, body) = render(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": UNAUTHORIZED_MESSAGE }));
    }

    #[tokio::test]
    async fn storage_failures_are_503_without_details() {
        let (status, body) =
            render(AppError::OrmError(sea_orm::DbErr::Custom("connection refused".into()))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "error": "Storage unavailable" }));
    }

    #[tokio::test]
    async fn partial_commit_reports_progress() {
        let (status, body) = render(AppError::PartialCommit {
            inserted: 200,
            total: 250,
            source: sea_orm::DbErr::Custom("boom".into()),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["inserted"], 200);
        assert_eq!(body["total"], 250);
    }

    #[tokio::test]
    async fn checkout_errors_carry_messages() {
        let (status, body) = render(AppError::checkout(
            "Checkout session is not ready",
            vec![Message::error(
                "missing",
                "$.shipping_address",
                "Shipping address is required",
                Severity::RequiresBuyerInput,
            )],
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["messages"][0]["path"], "$.shipping_address");
        assert_eq!(body["messages"][0]["severity"], "requires_buyer_input");
        assert_eq!(body["messages"][0]["type"], "error");
    }

    #[tokio::test]
    async fn non_multipart_upload_is_a_bad_request() {
        use axum::{
            body::Body,
            extract::{FromRequest, Multipart},
            http::{Request, header},
        };

        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let rejection = Multipart::from_request(request, &()).await.unwrap_err();
        let (status, body) = render(rejection.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }
}
