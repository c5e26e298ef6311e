pub mod handlers;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Error body returned by every failing endpoint.
///
/// ```json
/// { "error": true, "message": "Unauthorized" }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `true`
    pub error: bool,
    /// Client-safe description of the failure
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

/// Transport-level errors raised by extractors and shared middleware.
///
/// Domain crates define their own error enums and render them with the
/// same [`ErrorResponse`] envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryRejection(#[from] QueryRejection),

    #[error("Path extraction error: {0}")]
    PathRejection(#[from] PathRejection),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonRejection(JsonRejection::JsonDataError(_)) => StatusCode::BAD_REQUEST,
            AppError::JsonRejection(e) => e.status(),
            AppError::QueryRejection(_)
            | AppError::PathRejection(_)
            | AppError::Validation(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::JsonRejection(e) => {
                tracing::info!("JSON extraction error: {}", e);
                e.body_text()
            }
            AppError::QueryRejection(e) => {
                tracing::info!("Query extraction error: {}", e);
                e.body_text()
            }
            AppError::PathRejection(e) => {
                tracing::info!("Path extraction error: {}", e);
                e.body_text()
            }
            AppError::Validation(e) => {
                tracing::info!("Validation error: {:?}", e);
                validation_message(&e)
            }
            AppError::BadRequest(msg) => msg,
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::NotFound(msg) | AppError::Conflict(msg) => msg,
            AppError::TooManyRequests => "Too many requests, please try again later.".to_string(),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                "An internal error occurred".to_string()
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Flatten validator errors into one client-facing message.
///
/// Each failing field contributes the `message` of its validators (falling
/// back to `"<field> is invalid"`); fields are ordered by name so the output
/// is stable.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages: Vec<String> = Vec::new();
    for (field, errs) in fields {
        for err in errs {
            let msg = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            if !messages.contains(&msg) {
                messages.push(msg);
            }
        }
    }

    if messages.is_empty() {
        "Request validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 5, message = "Username is too short"))]
        username: String,
        #[validate(length(min = 6))]
        password: String,
    }

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_message_uses_field_messages_in_order() {
        let errors = Signup {
            username: "abc".into(),
            password: "x".into(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(
            validation_message(&errors),
            "password is invalid; Username is too short"
        );
    }

    #[tokio::test]
    async fn test_unauthorized_envelope() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_of(response).await;
        assert!(body.error);
        assert_eq!(body.message, "Unauthorized");
    }

    #[tokio::test]
    async fn test_internal_error_is_redacted() {
        let response =
            AppError::InternalServerError("connection refused to 10.0.0.5".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body.message, "An internal error occurred");
    }

    #[tokio::test]
    async fn test_wrongly_typed_json_field_is_bad_request() {
        use axum::{Json, body::Body, extract::FromRequest, http::Request};

        #[derive(Debug, serde::Deserialize)]
        struct Input {
            #[allow(dead_code)]
            role: i16,
        }

        let request = Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"role":"x"}"#))
            .unwrap();
        let rejection = Json::<Input>::from_request(request, &()).await.unwrap_err();
        assert!(matches!(rejection, JsonRejection::JsonDataError(_)));

        let response = AppError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_of(response).await.error);
    }

    #[tokio::test]
    async fn test_bad_request_keeps_message() {
        let response = AppError::BadRequest("Invalid user id".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await.message, "Invalid user id");
    }
}
